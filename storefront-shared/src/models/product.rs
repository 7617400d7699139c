/// Product model and database operations
///
/// Products are tenant-scoped catalog entries with a fixed-point price and
/// a stock counter. Prices are `NUMERIC(10,2)` mapped to
/// [`rust_decimal::Decimal`], never floating point, so currency arithmetic
/// is exact. The stock counter carries a `CHECK (stock_quantity >= 0)`
/// constraint; the only sanctioned way to take stock is the conditional
/// decrement in [`crate::catalog`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     price NUMERIC(10,2) NOT NULL,
///     stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
///     image VARCHAR(255),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::tenancy::TenantOwned;

/// Product model: a tenant-scoped catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID (UUID v4)
    pub id: Uuid,

    /// Vendor this product belongs to
    pub vendor_id: Uuid,

    /// Product name
    pub name: String,

    /// Optional long description
    pub description: Option<String>,

    /// Unit price (fixed-point decimal, NUMERIC(10,2))
    pub price: Decimal,

    /// Units in stock, never negative
    pub stock_quantity: i32,

    /// Optional image path
    pub image: Option<String>,

    /// Whether the product can be ordered
    pub is_active: bool,

    /// User who created the product (nullable if the user was deleted)
    pub created_by: Option<Uuid>,

    /// When the product was created
    pub created_at: DateTime<Utc>,

    /// When the product was last updated
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Product {
    fn owning_tenant(&self) -> Option<Uuid> {
        Some(self.vendor_id)
    }
}

/// Input for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProduct {
    /// Vendor the product belongs to
    pub vendor_id: Uuid,

    /// Product name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Unit price
    pub price: Decimal,

    /// Initial stock quantity
    #[serde(default)]
    pub stock_quantity: i32,

    /// Optional image path
    pub image: Option<String>,

    /// User creating the product
    pub created_by: Option<Uuid>,
}

/// Input for updating an existing product
///
/// All fields optional; only non-None fields are updated. Stock updates take
/// this path only for administrative corrections; order placement always
/// goes through the atomic decrement in [`crate::catalog`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    /// New name
    pub name: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New unit price
    pub price: Option<Decimal>,

    /// New stock quantity (absolute, must be >= 0)
    pub stock_quantity: Option<i32>,

    /// New image path (use Some(None) to clear)
    pub image: Option<Option<String>>,

    /// New active flag
    pub is_active: Option<bool>,
}

impl Product {
    /// Creates a new product in the database
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (vendor_id, name, description, price, stock_quantity,
                                  image, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, vendor_id, name, description, price, stock_quantity,
                      image, is_active, created_by, created_at, updated_at
            "#,
        )
        .bind(data.vendor_id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.price)
        .bind(data.stock_quantity)
        .bind(data.image)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(product)
    }

    /// Finds a product by ID
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, vendor_id, name, description, price, stock_quantity,
                   image, is_active, created_by, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    /// Lists products of a vendor with pagination, newest first
    ///
    /// Optional case-insensitive search on name/description and an optional
    /// active-flag filter.
    pub async fn list_by_vendor(
        pool: &PgPool,
        vendor_id: Uuid,
        search: Option<&str>,
        is_active: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT id, vendor_id, name, description, price, stock_quantity, \
             image, is_active, created_by, created_at, updated_at \
             FROM products WHERE vendor_id = $1",
        );
        let mut bind_count = 1;

        if search.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (name ILIKE ${n} OR description ILIKE ${n})",
                n = bind_count
            ));
        }
        if is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND is_active = ${}", bind_count));
        }

        query.push_str(&format!(
            " ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            bind_count + 1,
            bind_count + 2
        ));

        let mut q = sqlx::query_as::<_, Product>(&query).bind(vendor_id);
        if let Some(term) = search {
            q = q.bind(format!("%{}%", term));
        }
        if let Some(active) = is_active {
            q = q.bind(active);
        }
        let products = q.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(products)
    }

    /// Updates an existing product
    ///
    /// Only non-None fields in `data` are updated; `updated_at` is bumped.
    /// Note that price changes never touch existing order items: each item
    /// keeps the unit price snapshotted at order time.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE products SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.stock_quantity.is_some() {
            bind_count += 1;
            query.push_str(&format!(", stock_quantity = ${}", bind_count));
        }
        if data.image.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image = ${}", bind_count));
        }
        if data.is_active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", is_active = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, vendor_id, name, description, price, \
             stock_quantity, image, is_active, created_by, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Product>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(stock_quantity) = data.stock_quantity {
            q = q.bind(stock_quantity);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }
        if let Some(is_active) = data.is_active {
            q = q.bind(is_active);
        }

        let product = q.fetch_optional(pool).await?;

        Ok(product)
    }

    /// Sets the absolute stock quantity (administrative restock/correction)
    pub async fn set_stock(
        pool: &PgPool,
        id: Uuid,
        quantity: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock_quantity = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, vendor_id, name, description, price, stock_quantity,
                      image, is_active, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(pool)
        .await?;

        Ok(product)
    }

    /// Deletes a product by ID
    ///
    /// # Returns
    ///
    /// True if the product was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_owning_tenant_is_vendor() {
        let vendor_id = Uuid::new_v4();
        let product = Product {
            id: Uuid::new_v4(),
            vendor_id,
            name: "Widget".to_string(),
            description: None,
            price: dec!(9.99),
            stock_quantity: 5,
            image: None,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(product.owning_tenant(), Some(vendor_id));
    }

    #[test]
    fn test_price_is_exact_decimal() {
        // 9.99 * 3 must be exactly 29.97, not 29.970000000000002
        let price = dec!(9.99);
        assert_eq!(price * Decimal::from(3), dec!(29.97));
    }

    #[test]
    fn test_update_product_default() {
        let update = UpdateProduct::default();
        assert!(update.name.is_none());
        assert!(update.price.is_none());
        assert!(update.stock_quantity.is_none());
    }
}
