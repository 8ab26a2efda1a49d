//! Order repository: placement, cancellation, and order listings.
//!
//! Placement and cancellation are the only writers of listing stock besides
//! the importer. Both run the whole read-check-mutate sequence inside one
//! transaction with `SELECT ... FOR UPDATE` on every affected listing,
//! locked in listing-id order. Two concurrent placements therefore cannot
//! both observe sufficient stock and double-decrement below zero.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use orderhub_core::{ContactId, OrderId, OrderState, UserId};

use super::RepositoryError;
use crate::models::{
    BasketItem, Contact, Order, OrderView, PlacementLine, StockShortage, basket_total,
    collect_shortages,
};

/// Errors from order placement and lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The basket holds no items; nothing to place.
    #[error("empty basket")]
    EmptyBasket,

    /// The delivery contact does not exist or is not the caller's.
    #[error("contact not found")]
    ContactNotFound,

    /// One or more line items exceed live stock. Nothing was decremented;
    /// every offender is listed.
    #[error("insufficient stock")]
    InsufficientStock(Vec<StockShortage>),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// A successfully placed order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub total: Decimal,
}

/// Repository for order lifecycle operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Atomically convert a basket into a placed (`new`) order.
    ///
    /// With `basket_id` given, places exactly that basket; otherwise the
    /// caller's open basket. All preconditions are checked before any
    /// mutation, inside one transaction:
    ///
    /// 1. the basket exists and is the caller's,
    /// 2. it holds at least one item,
    /// 3. the contact exists and is the caller's,
    /// 4. every line item is covered by live stock, read under row locks.
    ///
    /// Only then is each listing decremented, the contact bound, and the
    /// state set to `new`. Placement is all-or-nothing: a single failing
    /// item leaves every listing untouched.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` (wrapped) when an explicit `basket_id`
    /// does not resolve, `OrderError::EmptyBasket`,
    /// `OrderError::ContactNotFound`, or `OrderError::InsufficientStock`
    /// listing every offending item.
    pub async fn place(
        &self,
        user_id: UserId,
        basket_id: Option<OrderId>,
        contact_id: ContactId,
    ) -> Result<PlacedOrder, OrderError> {
        let mut tx = self.pool.begin().await?;

        let basket = match basket_id {
            Some(id) => sqlx::query_as::<_, Order>(
                r"
                SELECT id, user_id, state, contact_id, total_price, created_at
                FROM orders
                WHERE id = $1 AND user_id = $2 AND state = 'basket'
                FOR UPDATE
                ",
            )
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?,
            None => sqlx::query_as::<_, Order>(
                r"
                SELECT id, user_id, state, contact_id, total_price, created_at
                FROM orders
                WHERE user_id = $1 AND state = 'basket'
                FOR UPDATE
                ",
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(OrderError::EmptyBasket)?,
        };

        // Lock every affected listing in id order. Stable ordering keeps
        // concurrent placements from deadlocking against each other.
        let lines = sqlx::query_as::<_, PlacementLine>(
            r"
            SELECT oi.listing_id, p.name AS product,
                   oi.quantity AS requested, l.quantity AS available
            FROM order_items oi
            JOIN listings l ON l.id = oi.listing_id
            JOIN products p ON p.id = l.product_id
            WHERE oi.order_id = $1
            ORDER BY l.id
            FOR UPDATE OF l
            ",
        )
        .bind(basket.id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(OrderError::EmptyBasket);
        }

        let contact_exists = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM contacts WHERE id = $1 AND user_id = $2",
        )
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if contact_exists.is_none() {
            return Err(OrderError::ContactNotFound);
        }

        let shortages = collect_shortages(&lines);
        if !shortages.is_empty() {
            return Err(OrderError::InsufficientStock(shortages));
        }

        for line in &lines {
            sqlx::query("UPDATE listings SET quantity = quantity - $2 WHERE id = $1")
                .bind(line.listing_id)
                .bind(line.requested)
                .execute(&mut *tx)
                .await?;
        }

        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            r"
            SELECT SUM(oi.quantity * l.price)
            FROM order_items oi
            JOIN listings l ON l.id = oi.listing_id
            WHERE oi.order_id = $1
            ",
        )
        .bind(basket.id)
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        sqlx::query(
            "UPDATE orders SET state = 'new', contact_id = $2, total_price = $3 WHERE id = $1",
        )
        .bind(basket.id)
        .bind(contact_id)
        .bind(total)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PlacedOrder {
            id: basket.id,
            total,
        })
    }

    /// Cancel a `new` order, restoring each line item's quantity to its
    /// listing. Exact inverse of the placement decrement.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` (wrapped) when no matching `new` order
    /// exists for the caller.
    pub async fn cancel(&self, user_id: UserId, order_id: OrderId) -> Result<(), OrderError> {
        #[derive(sqlx::FromRow)]
        struct RestoreLine {
            listing_id: i32,
            quantity: i32,
        }

        let mut tx = self.pool.begin().await?;

        let found = sqlx::query_scalar::<_, i32>(
            r"
            SELECT id FROM orders
            WHERE id = $1 AND user_id = $2 AND state = 'new'
            FOR UPDATE
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        if found.is_none() {
            return Err(RepositoryError::NotFound.into());
        }

        let lines = sqlx::query_as::<_, RestoreLine>(
            r"
            SELECT oi.listing_id, oi.quantity
            FROM order_items oi
            JOIN listings l ON l.id = oi.listing_id
            WHERE oi.order_id = $1
            ORDER BY l.id
            FOR UPDATE OF l
            ",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query("UPDATE listings SET quantity = quantity + $2 WHERE id = $1")
                .bind(line.listing_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE orders SET state = 'canceled' WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Change the delivery contact of a `new` order.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` (wrapped) when the contact is not the
    /// caller's or when no matching `new` order exists. Orders past `new`
    /// cannot be retargeted.
    pub async fn update_contact(
        &self,
        user_id: UserId,
        order_id: OrderId,
        contact_id: ContactId,
    ) -> Result<(), OrderError> {
        let contact_exists = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM contacts WHERE id = $1 AND user_id = $2",
        )
        .bind(contact_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        if contact_exists.is_none() {
            return Err(RepositoryError::NotFound.into());
        }

        let result = sqlx::query(
            r"
            UPDATE orders SET contact_id = $3
            WHERE id = $1 AND user_id = $2 AND state = 'new'
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .bind(contact_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound.into());
        }

        Ok(())
    }

    /// All placed (non-basket) orders of a user, newest first, with items
    /// and contact embedded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<OrderView>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, state, contact_id, total_price, created_at
            FROM orders
            WHERE user_id = $1 AND state <> 'basket'
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.hydrate(orders).await
    }

    /// All placed orders containing listings of the partner's shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_partner(
        &self,
        shop_user_id: UserId,
    ) -> Result<Vec<OrderView>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT DISTINCT o.id, o.user_id, o.state, o.contact_id,
                            o.total_price, o.created_at
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            JOIN listings l ON l.id = oi.listing_id
            JOIN shops s ON s.id = l.shop_id
            WHERE s.user_id = $1 AND o.state <> 'basket'
            ORDER BY o.created_at DESC, o.id DESC
            ",
        )
        .bind(shop_user_id)
        .fetch_all(self.pool)
        .await?;

        self.hydrate(orders).await
    }

    /// The state of a single order owned by the user, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_state(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<OrderState>, RepositoryError> {
        let state = sqlx::query_scalar::<_, OrderState>(
            "SELECT state FROM orders WHERE id = $1 AND user_id = $2",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(state)
    }

    /// Attach items and contact details to a page of order rows.
    async fn hydrate(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, RepositoryError> {
        let mut views = Vec::with_capacity(orders.len());

        for order in orders {
            let items = sqlx::query_as::<_, BasketItem>(
                r"
                SELECT oi.id, oi.listing_id, p.name AS product, s.name AS shop,
                       oi.quantity, l.price, l.quantity AS available
                FROM order_items oi
                JOIN listings l ON l.id = oi.listing_id
                JOIN products p ON p.id = l.product_id
                JOIN shops s ON s.id = l.shop_id
                WHERE oi.order_id = $1
                ORDER BY oi.id
                ",
            )
            .bind(order.id)
            .fetch_all(self.pool)
            .await?;

            let contact = match order.contact_id {
                Some(contact_id) => {
                    sqlx::query_as::<_, Contact>(
                        r"
                        SELECT id, user_id, city, street, house, apartment, phone
                        FROM contacts
                        WHERE id = $1
                        ",
                    )
                    .bind(contact_id)
                    .fetch_optional(self.pool)
                    .await?
                }
                None => None,
            };

            let total = basket_total(&items);

            views.push(OrderView {
                id: order.id,
                state: order.state,
                created_at: order.created_at,
                items,
                total,
                contact,
            });
        }

        Ok(views)
    }
}
