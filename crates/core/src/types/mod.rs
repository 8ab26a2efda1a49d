//! Core type definitions.

pub mod id;
pub mod order_state;
pub mod user_type;

pub use id::{
    CategoryId, ContactId, ListingId, OrderId, OrderItemId, ProductId, ShopId, UserId,
};
pub use order_state::OrderState;
pub use user_type::UserType;
