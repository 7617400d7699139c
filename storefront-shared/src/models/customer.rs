/// Customer model and database operations
///
/// A customer record is the per-vendor profile of a user who shops at that
/// storefront. The same user account has at most one customer record per
/// vendor, and the record is created lazily the first time the user places
/// an order (see [`Customer::get_or_create`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE customers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     full_name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     phone_number VARCHAR(20),
///     address TEXT,
///     city VARCHAR(100),
///     state VARCHAR(100),
///     postal_code VARCHAR(20),
///     country VARCHAR(100),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT customers_vendor_email_key UNIQUE (vendor_id, email),
///     CONSTRAINT customers_vendor_user_key UNIQUE (vendor_id, user_id)
/// );
/// ```
///
/// The two unique constraints encode the tenancy invariants: the same email
/// may exist at different vendors but not twice within one, and a user has
/// at most one profile per vendor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::user::User;
use crate::tenancy::TenantOwned;

/// Customer model: the per-vendor profile of a shopping user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer ID (UUID v4)
    pub id: Uuid,

    /// Vendor this customer belongs to
    pub vendor_id: Uuid,

    /// Backing user account
    pub user_id: Uuid,

    /// Display name (falls back to username at creation time)
    pub full_name: String,

    /// Contact email, unique within the vendor
    pub email: String,

    /// Optional phone number
    pub phone_number: Option<String>,

    /// Optional street address
    pub address: Option<String>,

    /// Optional city
    pub city: Option<String>,

    /// Optional state/region
    pub state: Option<String>,

    /// Optional postal code
    pub postal_code: Option<String>,

    /// Optional country
    pub country: Option<String>,

    /// When the customer record was created
    pub created_at: DateTime<Utc>,

    /// When the customer record was last updated
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Customer {
    fn owning_tenant(&self) -> Option<Uuid> {
        Some(self.vendor_id)
    }
}

impl Customer {
    /// Finds a customer by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, vendor_id, user_id, full_name, email, phone_number,
                   address, city, state, postal_code, country, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(customer)
    }

    /// Finds the customer record for a (vendor, user) pair
    pub async fn find_by_vendor_and_user<'e>(
        executor: impl PgExecutor<'e>,
        vendor_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, vendor_id, user_id, full_name, email, phone_number,
                   address, city, state, postal_code, country, created_at, updated_at
            FROM customers
            WHERE vendor_id = $1 AND user_id = $2
            "#,
        )
        .bind(vendor_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(customer)
    }

    /// Resolves the customer record for a user at a vendor, creating it
    /// lazily on first use
    ///
    /// Profile defaults are derived from the user: full name falls back to
    /// the account username when first and last name are both blank, and
    /// the email mirrors the account email.
    ///
    /// # Idempotency
    ///
    /// Concurrent calls for the same (vendor, user) pair cannot create
    /// duplicates: the `(vendor_id, user_id)` unique constraint rejects the
    /// loser of the race, which is treated as "another request won" and
    /// recovered by re-running the lookup. The conflict never surfaces to
    /// the caller.
    ///
    /// # Errors
    ///
    /// Returns the underlying database error for anything other than the
    /// duplicate-key race.
    pub async fn get_or_create(
        pool: &PgPool,
        vendor_id: Uuid,
        user: &User,
    ) -> Result<Self, sqlx::Error> {
        if let Some(existing) = Self::find_by_vendor_and_user(pool, vendor_id, user.id).await? {
            return Ok(existing);
        }

        let inserted = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (vendor_id, user_id, full_name, email, phone_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, vendor_id, user_id, full_name, email, phone_number,
                      address, city, state, postal_code, country, created_at, updated_at
            "#,
        )
        .bind(vendor_id)
        .bind(user.id)
        .bind(user.display_name())
        .bind(&user.email)
        .bind(&user.phone_number)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(customer) => Ok(customer),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Lost the creation race; the row exists now.
                debug!(vendor_id = %vendor_id, user_id = %user.id,
                       "customer already created concurrently, re-reading");
                let customer = Self::find_by_vendor_and_user(pool, vendor_id, user.id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok(customer)
            }
            Err(e) => Err(e),
        }
    }

    /// Lists customers of a vendor with pagination
    ///
    /// An optional case-insensitive search matches full name or email.
    pub async fn list_by_vendor(
        pool: &PgPool,
        vendor_id: Uuid,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let customers = if let Some(term) = search {
            let pattern = format!("%{}%", term);
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, vendor_id, user_id, full_name, email, phone_number,
                       address, city, state, postal_code, country, created_at, updated_at
                FROM customers
                WHERE vendor_id = $1
                  AND (full_name ILIKE $2 OR email ILIKE $2)
                ORDER BY created_at DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(vendor_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        } else {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT id, vendor_id, user_id, full_name, email, phone_number,
                       address, city, state, postal_code, country, created_at, updated_at
                FROM customers
                WHERE vendor_id = $1
                ORDER BY created_at DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(vendor_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        };

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owning_tenant_is_vendor() {
        let vendor_id = Uuid::new_v4();
        let customer = Customer {
            id: Uuid::new_v4(),
            vendor_id,
            user_id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: None,
            address: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(customer.owning_tenant(), Some(vendor_id));
    }

    // get_or_create race recovery is exercised in storefront-api/tests
}
