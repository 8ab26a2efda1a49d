//! Delivery contact repository.

use sqlx::PgPool;

use orderhub_core::{ContactId, UserId};

use super::RepositoryError;
use crate::models::Contact;

/// Fields accepted when updating a contact; `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct ContactUpdate {
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<String>,
    pub apartment: Option<String>,
    pub phone: Option<String>,
}

/// Repository for delivery contacts.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all contacts owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Contact>, RepositoryError> {
        let contacts = sqlx::query_as::<_, Contact>(
            r"
            SELECT id, user_id, city, street, house, apartment, phone
            FROM contacts
            WHERE user_id = $1
            ORDER BY id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(contacts)
    }

    /// Create a contact for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        city: &str,
        street: &str,
        house: &str,
        apartment: &str,
        phone: &str,
    ) -> Result<Contact, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            r"
            INSERT INTO contacts (user_id, city, street, house, apartment, phone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, city, street, house, apartment, phone
            ",
        )
        .bind(user_id)
        .bind(city)
        .bind(street)
        .bind(house)
        .bind(apartment)
        .bind(phone)
        .fetch_one(self.pool)
        .await?;

        Ok(contact)
    }

    /// Partially update a contact owned by the user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist or
    /// belongs to someone else.
    pub async fn update(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        update: &ContactUpdate,
    ) -> Result<Contact, RepositoryError> {
        let contact = sqlx::query_as::<_, Contact>(
            r"
            UPDATE contacts
            SET city      = COALESCE($3, city),
                street    = COALESCE($4, street),
                house     = COALESCE($5, house),
                apartment = COALESCE($6, apartment),
                phone     = COALESCE($7, phone)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, city, street, house, apartment, phone
            ",
        )
        .bind(contact_id)
        .bind(user_id)
        .bind(update.city.as_deref())
        .bind(update.street.as_deref())
        .bind(update.house.as_deref())
        .bind(update.apartment.as_deref())
        .bind(update.phone.as_deref())
        .fetch_optional(self.pool)
        .await?;

        contact.ok_or(RepositoryError::NotFound)
    }

    /// Delete the given contacts, scoped to the owner.
    ///
    /// Ids that do not resolve to the caller's contacts are silently
    /// ignored. Returns the number of rows deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_many(
        &self,
        user_id: UserId,
        ids: &[ContactId],
    ) -> Result<u64, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let result = sqlx::query("DELETE FROM contacts WHERE user_id = $1 AND id = ANY($2)")
            .bind(user_id)
            .bind(&raw_ids)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
