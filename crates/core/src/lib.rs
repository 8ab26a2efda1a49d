//! Shared types for OrderHub.
//!
//! This crate holds the domain vocabulary used by every other crate in the
//! workspace: newtype entity IDs, the order state machine, and the user
//! account type. Enable the `postgres` feature to get sqlx
//! `Type`/`Encode`/`Decode` implementations.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::{
    CategoryId, ContactId, ListingId, OrderId, OrderItemId, OrderState, ProductId, ShopId, UserId,
    UserType,
};
