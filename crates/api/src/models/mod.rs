//! Domain models for the OrderHub API.

pub mod catalog;
pub mod contact;
pub mod order;
pub mod user;

pub use catalog::{Category, Listing, ListingParameter, ListingView, Product, Shop};
pub use contact::Contact;
pub use order::{
    BasketItem, BasketView, Order, OrderItem, OrderView, PlacementLine, StockShortage,
    basket_total, collect_shortages,
};
pub use user::User;
