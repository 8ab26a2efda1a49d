//! Basket repository.
//!
//! Maintains the single open basket-order per user and its line items.
//! Stock checks here are optimistic: the basket is advisory and nothing is
//! reserved until placement, so two concurrent adds may together overcommit.
//! Placement re-validates under row locks.

use sqlx::PgPool;
use thiserror::Error;

use orderhub_core::{ListingId, OrderId, OrderItemId, UserId};

use super::RepositoryError;
use crate::models::{BasketItem, BasketView, Order, basket_total};

/// One requested line in a batch add.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct LineItemInput {
    #[serde(alias = "product_info")]
    pub listing_id: ListingId,
    pub quantity: i32,
}

/// Counters returned from a successful batch add.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct AddItemsOutcome {
    pub created: u32,
    pub updated: u32,
}

/// One requested quantity change in a batch update.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct QuantityInput {
    pub id: OrderItemId,
    pub quantity: i32,
}

/// Counters returned from a successful batch update.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct UpdateItemsOutcome {
    pub updated: u32,
    pub deleted: u32,
}

/// Errors from basket mutations.
#[derive(Debug, Error)]
pub enum BasketError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// One or more entries in the batch failed validation. The whole batch
    /// was rolled back; the list names every offender.
    #[error("basket update rejected")]
    Rejected(Vec<String>),
}

impl From<sqlx::Error> for BasketError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

const ITEMS_SQL: &str = r"
    SELECT oi.id, oi.listing_id, p.name AS product, s.name AS shop,
           oi.quantity, l.price, l.quantity AS available
    FROM order_items oi
    JOIN listings l ON l.id = oi.listing_id
    JOIN products p ON p.id = l.product_id
    JOIN shops s ON s.id = l.shop_id
    WHERE oi.order_id = $1
    ORDER BY oi.id
";

/// Repository for basket operations.
pub struct BasketRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BasketRepository<'a> {
    /// Create a new basket repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find or lazily create the user's open basket.
    ///
    /// The partial unique index on `(user_id) WHERE state = 'basket'` makes
    /// the insert race-safe: a concurrent create simply hits the conflict
    /// and both callers read the same row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_or_create(&self, user_id: UserId) -> Result<Order, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO orders (user_id, state)
            VALUES ($1, 'basket')
            ON CONFLICT (user_id) WHERE state = 'basket' DO NOTHING
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, state, contact_id, total_price, created_at
            FROM orders
            WHERE user_id = $1 AND state = 'basket'
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(order)
    }

    /// The user's basket with embedded items and computed total.
    ///
    /// Returns the explicit empty shape when no basket row exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_basket(&self, user_id: UserId) -> Result<BasketView, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(
            r"
            SELECT id, user_id, state, contact_id, total_price, created_at
            FROM orders
            WHERE user_id = $1 AND state = 'basket'
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(BasketView::empty());
        };

        let items = sqlx::query_as::<_, BasketItem>(ITEMS_SQL)
            .bind(order.id)
            .fetch_all(self.pool)
            .await?;

        let total = basket_total(&items);

        Ok(BasketView {
            id: Some(order.id),
            state: order.state,
            items,
            total,
        })
    }

    /// Add a batch of items to the user's basket.
    ///
    /// Each entry must resolve to a listing and the resulting quantity
    /// (existing + requested) must not exceed live stock. Adding a listing
    /// already in the basket increments its quantity. The batch runs in one
    /// transaction: any invalid entry rolls the whole batch back and the
    /// returned error lists every offender.
    ///
    /// # Errors
    ///
    /// Returns `BasketError::Rejected` with per-item messages on validation
    /// failure, `BasketError::Repository` on database failure.
    pub async fn add_items(
        &self,
        user_id: UserId,
        items: &[LineItemInput],
    ) -> Result<AddItemsOutcome, BasketError> {
        #[derive(sqlx::FromRow)]
        struct ListingStock {
            product: String,
            quantity: i32,
        }

        let basket = self.find_or_create(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut outcome = AddItemsOutcome::default();
        let mut errors = Vec::new();

        for item in items {
            if item.quantity < 1 {
                errors.push(format!(
                    "quantity must be positive (listing {})",
                    item.listing_id
                ));
                continue;
            }

            let listing = sqlx::query_as::<_, ListingStock>(
                r"
                SELECT p.name AS product, l.quantity
                FROM listings l
                JOIN products p ON p.id = l.product_id
                WHERE l.id = $1
                ",
            )
            .bind(item.listing_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(listing) = listing else {
                errors.push(format!("listing {} not found", item.listing_id));
                continue;
            };

            let existing = sqlx::query_scalar::<_, i32>(
                "SELECT quantity FROM order_items WHERE order_id = $1 AND listing_id = $2",
            )
            .bind(basket.id)
            .bind(item.listing_id)
            .fetch_optional(&mut *tx)
            .await?;

            let requested = existing.unwrap_or(0).saturating_add(item.quantity);
            if requested > listing.quantity {
                errors.push(format!(
                    "not enough stock for \"{}\": available {}, requested {}",
                    listing.product, listing.quantity, requested
                ));
                continue;
            }

            sqlx::query(
                r"
                INSERT INTO order_items (order_id, listing_id, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (order_id, listing_id)
                DO UPDATE SET quantity = order_items.quantity + EXCLUDED.quantity
                ",
            )
            .bind(basket.id)
            .bind(item.listing_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if existing.is_some() {
                outcome.updated += 1;
            } else {
                outcome.created += 1;
            }
        }

        if !errors.is_empty() {
            // Dropping the transaction rolls every write back.
            return Err(BasketError::Rejected(errors));
        }

        tx.commit().await?;
        self.refresh_cached_total(basket.id).await;

        Ok(outcome)
    }

    /// Set the quantity of each given basket item; zero or negative deletes
    /// the item.
    ///
    /// Same batch contract as [`add_items`](Self::add_items): one
    /// transaction, any invalid entry (unknown item, quantity over live
    /// stock) rolls every change in the batch back and the returned error
    /// lists every offender.
    ///
    /// # Errors
    ///
    /// Returns `BasketError::Rejected` with per-item messages on validation
    /// failure, `BasketError::Repository` on database failure.
    pub async fn update_items(
        &self,
        user_id: UserId,
        items: &[QuantityInput],
    ) -> Result<UpdateItemsOutcome, BasketError> {
        #[derive(sqlx::FromRow)]
        struct ItemStock {
            product: String,
            available: i32,
        }

        let basket = self.find_or_create(user_id).await?;

        let mut tx = self.pool.begin().await?;
        let mut outcome = UpdateItemsOutcome::default();
        let mut errors = Vec::new();

        for item in items {
            let stock = sqlx::query_as::<_, ItemStock>(
                r"
                SELECT p.name AS product, l.quantity AS available
                FROM order_items oi
                JOIN listings l ON l.id = oi.listing_id
                JOIN products p ON p.id = l.product_id
                WHERE oi.id = $1 AND oi.order_id = $2
                ",
            )
            .bind(item.id)
            .bind(basket.id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(stock) = stock else {
                errors.push(format!("item {} not found in basket", item.id));
                continue;
            };

            if item.quantity <= 0 {
                sqlx::query("DELETE FROM order_items WHERE id = $1 AND order_id = $2")
                    .bind(item.id)
                    .bind(basket.id)
                    .execute(&mut *tx)
                    .await?;
                outcome.deleted += 1;
                continue;
            }

            if item.quantity > stock.available {
                errors.push(format!(
                    "not enough stock for \"{}\": available {}, requested {}",
                    stock.product, stock.available, item.quantity
                ));
                continue;
            }

            sqlx::query("UPDATE order_items SET quantity = $3 WHERE id = $1 AND order_id = $2")
                .bind(item.id)
                .bind(basket.id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
            outcome.updated += 1;
        }

        if !errors.is_empty() {
            // Dropping the transaction rolls every write back.
            return Err(BasketError::Rejected(errors));
        }

        tx.commit().await?;
        self.refresh_cached_total(basket.id).await;

        Ok(outcome)
    }

    /// Delete the given items from the caller's basket.
    ///
    /// Ids that do not resolve to items in the basket are silently ignored.
    /// Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_items(
        &self,
        user_id: UserId,
        item_ids: &[OrderItemId],
    ) -> Result<u64, RepositoryError> {
        let basket = self.find_or_create(user_id).await?;
        let raw_ids: Vec<i32> = item_ids.iter().map(|id| id.as_i32()).collect();

        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND id = ANY($2)")
            .bind(basket.id)
            .bind(&raw_ids)
            .execute(self.pool)
            .await?;

        self.refresh_cached_total(basket.id).await;
        Ok(result.rows_affected())
    }

    /// Recompute and persist the basket's cached total price.
    ///
    /// Best-effort: a failure here is logged and never surfaced, the cached
    /// column is display-only.
    async fn refresh_cached_total(&self, order_id: OrderId) {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET total_price = COALESCE((
                SELECT SUM(oi.quantity * l.price)
                FROM order_items oi
                JOIN listings l ON l.id = oi.listing_id
                WHERE oi.order_id = $1
            ), 0)
            WHERE id = $1
            ",
        )
        .bind(order_id)
        .execute(self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(order_id = %order_id, error = %e, "failed to refresh cached basket total");
        }
    }
}
