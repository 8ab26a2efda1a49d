//! Catalog repository: shops, categories, listings, and price-list import.

use std::collections::HashMap;

use sqlx::PgPool;

use orderhub_core::{CategoryId, ListingId, ShopId, UserId};

use super::RepositoryError;
use crate::models::{Category, ListingParameter, ListingView, Shop};
use crate::services::import::PriceList;

/// Counters reported after a price-list import.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ImportStats {
    pub categories_processed: usize,
    pub products_imported: usize,
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List shops currently accepting orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_shops(&self) -> Result<Vec<Shop>, RepositoryError> {
        let shops = sqlx::query_as::<_, Shop>(
            r"
            SELECT id, name, url, user_id, accepting_orders
            FROM shops
            WHERE accepting_orders
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(shops)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        Ok(categories)
    }

    /// Get the shop owned by a partner user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_shop_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Shop>, RepositoryError> {
        let shop = sqlx::query_as::<_, Shop>(
            r"
            SELECT id, name, url, user_id, accepting_orders
            FROM shops
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(shop)
    }

    /// Toggle whether the partner's shop accepts orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user owns no shop.
    pub async fn set_accepting_orders(
        &self,
        user_id: UserId,
        accepting: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shops SET accepting_orders = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(accepting)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Search listings of accepting shops, optionally filtered by shop and
    /// category, with parameters embedded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search_listings(
        &self,
        shop_id: Option<ShopId>,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<ListingView>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct ListingRow {
            id: ListingId,
            product: String,
            category: String,
            shop: String,
            model: String,
            external_id: i32,
            price: rust_decimal::Decimal,
            price_rrc: rust_decimal::Decimal,
            quantity: i32,
        }

        let rows = sqlx::query_as::<_, ListingRow>(
            r"
            SELECT l.id, p.name AS product, c.name AS category, s.name AS shop,
                   l.model, l.external_id, l.price, l.price_rrc, l.quantity
            FROM listings l
            JOIN products p ON p.id = l.product_id
            JOIN categories c ON c.id = p.category_id
            JOIN shops s ON s.id = l.shop_id
            WHERE s.accepting_orders
              AND ($1::int IS NULL OR l.shop_id = $1)
              AND ($2::int IS NULL OR p.category_id = $2)
            ORDER BY l.id
            ",
        )
        .bind(shop_id.map(|id| id.as_i32()))
        .bind(category_id.map(|id| id.as_i32()))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let mut parameters = self.parameters_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| ListingView {
                id: row.id,
                product: row.product,
                category: row.category,
                shop: row.shop,
                model: row.model,
                external_id: row.external_id,
                price: row.price,
                price_rrc: row.price_rrc,
                quantity: row.quantity,
                parameters: parameters.remove(&row.id.as_i32()).unwrap_or_default(),
            })
            .collect())
    }

    async fn parameters_for(
        &self,
        listing_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ListingParameter>>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct ParameterRow {
            listing_id: i32,
            name: String,
            value: String,
        }

        let rows = sqlx::query_as::<_, ParameterRow>(
            r"
            SELECT listing_id, name, value
            FROM listing_parameters
            WHERE listing_id = ANY($1)
            ORDER BY listing_id, name
            ",
        )
        .bind(listing_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<i32, Vec<ListingParameter>> = HashMap::new();
        for row in rows {
            grouped.entry(row.listing_id).or_default().push(ListingParameter {
                name: row.name,
                value: row.value,
            });
        }

        Ok(grouped)
    }

    /// Replace the partner's catalog with the contents of a price list.
    ///
    /// One transaction: upsert the shop (binding it to the partner),
    /// upsert categories and their shop links, drop every listing the shop
    /// had, then insert the new listings with their parameters. Product
    /// rows are shared across shops and upserted by `(name, category)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction rolls back and the previous catalog stays in place.
    pub async fn replace_shop_listings(
        &self,
        user_id: UserId,
        list: &PriceList,
    ) -> Result<ImportStats, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let shop_id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO shops (name, user_id)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id
            ",
        )
        .bind(&list.shop)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        for category in &list.categories {
            sqlx::query(
                r"
                INSERT INTO categories (id, name)
                VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name
                ",
            )
            .bind(category.id)
            .bind(&category.name)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r"
                INSERT INTO shop_categories (shop_id, category_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                ",
            )
            .bind(shop_id)
            .bind(category.id)
            .execute(&mut *tx)
            .await?;
        }

        // Full replace: the price list is the source of truth for this shop.
        sqlx::query("DELETE FROM listings WHERE shop_id = $1")
            .bind(shop_id)
            .execute(&mut *tx)
            .await?;

        let mut products_imported = 0_usize;
        for good in &list.goods {
            let product_id = sqlx::query_scalar::<_, i32>(
                r"
                INSERT INTO products (name, category_id)
                VALUES ($1, $2)
                ON CONFLICT (name, category_id) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                ",
            )
            .bind(&good.name)
            .bind(good.category)
            .fetch_one(&mut *tx)
            .await?;

            let listing_id = sqlx::query_scalar::<_, i32>(
                r"
                INSERT INTO listings
                    (product_id, shop_id, external_id, model, price, price_rrc, quantity)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                ",
            )
            .bind(product_id)
            .bind(shop_id)
            .bind(good.id)
            .bind(&good.model)
            .bind(good.price)
            .bind(good.price_rrc)
            .bind(good.quantity)
            .fetch_one(&mut *tx)
            .await?;

            for (name, value) in &good.parameters {
                sqlx::query(
                    r"
                    INSERT INTO listing_parameters (listing_id, name, value)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(listing_id)
                .bind(name)
                .bind(value.to_string())
                .execute(&mut *tx)
                .await?;
            }

            products_imported += 1;
        }

        tx.commit().await?;

        Ok(ImportStats {
            categories_processed: list.categories.len(),
            products_imported,
        })
    }
}
