/// Database models for the storefront
///
/// This module contains all database models and their CRUD operations.
/// Every tenant-scoped model implements [`crate::tenancy::TenantOwned`]
/// so the access guard can resolve its owning vendor without introspection.
///
/// # Models
///
/// - `vendor`: Vendors (tenants); each vendor is an isolated storefront
/// - `user`: User accounts with a role and optional vendor association
/// - `customer`: Per-vendor customer records backed by a user account
/// - `product`: Catalog products with per-vendor stock counters
/// - `order`: Orders and their immutable line items
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
/// # Ok(())
/// # }
/// ```

pub mod customer;
pub mod order;
pub mod product;
pub mod user;
pub mod vendor;
