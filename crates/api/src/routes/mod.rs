//! HTTP route handlers for the order API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Catalog (public)
//! GET  /api/v1/shops           - Shops accepting orders
//! GET  /api/v1/categories      - Categories
//! GET  /api/v1/products        - Listing search (?shop_id=&category_id=)
//!
//! # Basket (requires auth)
//! GET    /api/v1/basket        - View basket
//! POST   /api/v1/basket        - Add items (all-or-nothing batch)
//! PUT    /api/v1/basket        - Update item quantities
//! DELETE /api/v1/basket        - Remove items
//!
//! # Orders (requires auth)
//! GET    /api/v1/orders        - Placed orders
//! POST   /api/v1/orders        - Place the basket as an order
//! PUT    /api/v1/orders/{id}   - Change delivery contact (state `new` only)
//! DELETE /api/v1/orders/{id}   - Cancel (state `new` only, restores stock)
//!
//! # Contacts (requires auth)
//! GET    /api/v1/contacts      - List delivery contacts
//! POST   /api/v1/contacts      - Create contact
//! PUT    /api/v1/contacts      - Partial update
//! DELETE /api/v1/contacts      - Delete contacts
//!
//! # Partner (requires shop account)
//! POST /api/v1/partner/update  - Import price list (inline YAML or URL)
//! GET  /api/v1/partner/state   - Shop state
//! POST /api/v1/partner/state   - Toggle accepting orders
//! GET  /api/v1/partner/orders  - Orders containing the shop's listings
//! ```

pub mod basket;
pub mod catalog;
pub mod contacts;
pub mod orders;
pub mod partner;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the public catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(catalog::shops))
        .route("/categories", get(catalog::categories))
        .route("/products", get(catalog::products))
}

/// Create the basket routes router.
pub fn basket_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(basket::show)
            .post(basket::add)
            .put(basket::update)
            .delete(basket::remove),
    )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::place))
        .route(
            "/{id}",
            axum::routing::put(orders::update_contact).delete(orders::cancel),
        )
}

/// Create the contact routes router.
pub fn contact_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(contacts::list)
            .post(contacts::create)
            .put(contacts::update)
            .delete(contacts::remove),
    )
}

/// Create the partner routes router.
pub fn partner_routes() -> Router<AppState> {
    Router::new()
        .route("/update", post(partner::update_catalog))
        .route("/state", get(partner::get_state).post(partner::set_state))
        .route("/orders", get(partner::orders))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .merge(catalog_routes())
        .nest("/basket", basket_routes())
        .nest("/orders", order_routes())
        .nest("/contacts", contact_routes())
        .nest("/partner", partner_routes());

    Router::new().nest("/api/v1", api)
}
