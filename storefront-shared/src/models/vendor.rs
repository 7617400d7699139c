/// Vendor (tenant) model and database operations
///
/// Each vendor is an isolated storefront: its users, products, customers,
/// and orders are invisible to every other vendor. The vendor row is the
/// root of the tenant hierarchy; deleting one cascades to all dependents.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vendors (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     store_name VARCHAR(255) NOT NULL,
///     contact_email VARCHAR(255) NOT NULL UNIQUE,
///     contact_phone VARCHAR(20),
///     domain VARCHAR(255) NOT NULL UNIQUE,
///     subdomain VARCHAR(255) UNIQUE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use storefront_shared::models::vendor::{Vendor, CreateVendor};
/// use storefront_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let vendor = Vendor::create(&pool, CreateVendor {
///     store_name: "Acme Outdoors".to_string(),
///     contact_email: "shop@acme.example".to_string(),
///     contact_phone: None,
///     domain: "acme.example".to_string(),
///     subdomain: None,
/// }).await?;
/// println!("Created vendor: {}", vendor.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::tenancy::TenantOwned;

/// Vendor model representing an isolated storefront (tenant)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vendor {
    /// Unique vendor ID (UUID v4)
    pub id: Uuid,

    /// Display name of the store
    pub store_name: String,

    /// Contact email, unique across all vendors
    pub contact_email: String,

    /// Optional contact phone number
    pub contact_phone: Option<String>,

    /// Unique domain used as the tenant key for storefront routing
    pub domain: String,

    /// Optional subdomain (unique when set)
    pub subdomain: Option<String>,

    /// Whether the storefront is active
    ///
    /// Deactivated vendors cannot serve requests; their data is retained.
    pub is_active: bool,

    /// When the vendor was created
    pub created_at: DateTime<Utc>,

    /// When the vendor was last updated
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Vendor {
    fn owning_tenant(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

/// Input for creating a new vendor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVendor {
    /// Display name of the store
    pub store_name: String,

    /// Contact email (must be unique)
    pub contact_email: String,

    /// Optional contact phone number
    pub contact_phone: Option<String>,

    /// Unique domain (tenant key)
    pub domain: String,

    /// Optional subdomain
    pub subdomain: Option<String>,
}

/// Input for updating an existing vendor
///
/// All fields are optional; only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVendor {
    /// New store name
    pub store_name: Option<String>,

    /// New contact email
    pub contact_email: Option<String>,

    /// New contact phone (use Some(None) to clear)
    pub contact_phone: Option<Option<String>>,

    /// New domain
    pub domain: Option<String>,

    /// New active flag
    pub is_active: Option<bool>,
}

impl Vendor {
    /// Creates a new vendor in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the contact email or domain already exists
    /// (unique constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateVendor) -> Result<Self, sqlx::Error> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (store_name, contact_email, contact_phone, domain, subdomain)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, store_name, contact_email, contact_phone, domain, subdomain,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(data.store_name)
        .bind(data.contact_email)
        .bind(data.contact_phone)
        .bind(data.domain)
        .bind(data.subdomain)
        .fetch_one(pool)
        .await?;

        Ok(vendor)
    }

    /// Finds a vendor by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, store_name, contact_email, contact_phone, domain, subdomain,
                   is_active, created_at, updated_at
            FROM vendors
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(vendor)
    }

    /// Finds a vendor by its domain (tenant key)
    pub async fn find_by_domain(pool: &PgPool, domain: &str) -> Result<Option<Self>, sqlx::Error> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, store_name, contact_email, contact_phone, domain, subdomain,
                   is_active, created_at, updated_at
            FROM vendors
            WHERE domain = $1
            "#,
        )
        .bind(domain)
        .fetch_optional(pool)
        .await?;

        Ok(vendor)
    }

    /// Updates an existing vendor
    ///
    /// Only non-None fields in `data` are updated; `updated_at` is bumped.
    ///
    /// # Returns
    ///
    /// The updated vendor if found, None if the vendor doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateVendor,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE vendors SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.store_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", store_name = ${}", bind_count));
        }
        if data.contact_email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", contact_email = ${}", bind_count));
        }
        if data.contact_phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", contact_phone = ${}", bind_count));
        }
        if data.domain.is_some() {
            bind_count += 1;
            query.push_str(&format!(", domain = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, store_name, contact_email, contact_phone, domain, \
             subdomain, is_active, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Vendor>(&query).bind(id);

        if let Some(store_name) = data.store_name {
            q = q.bind(store_name);
        }
        if let Some(contact_email) = data.contact_email {
            q = q.bind(contact_email);
        }
        if let Some(contact_phone) = data.contact_phone {
            q = q.bind(contact_phone);
        }
        if let Some(domain) = data.domain {
            q = q.bind(domain);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let vendor = q.fetch_optional(pool).await?;

        Ok(vendor)
    }

    /// Deletes a vendor by ID
    ///
    /// ⚠️  **WARNING**: This cascades to all of the vendor's users, products,
    /// customers, and orders. Use with extreme caution!
    ///
    /// # Returns
    ///
    /// True if the vendor was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all vendors with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let vendors = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, store_name, contact_email, contact_phone, domain, subdomain,
                   is_active, created_at, updated_at
            FROM vendors
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(vendors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_owns_itself() {
        let vendor = Vendor {
            id: Uuid::new_v4(),
            store_name: "Test Store".to_string(),
            contact_email: "test@example.com".to_string(),
            contact_phone: None,
            domain: "test.example".to_string(),
            subdomain: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(vendor.owning_tenant(), Some(vendor.id));
    }

    #[test]
    fn test_update_vendor_default() {
        let update = UpdateVendor::default();
        assert!(update.store_name.is_none());
        assert!(update.contact_email.is_none());
        assert!(update.is_active.is_none());
    }

    // Integration tests for database operations are in storefront-api/tests
}
