//! External-facing services: price-list import and order notifications.

pub mod import;
pub mod notify;
