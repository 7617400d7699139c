/// Atomic stock operations on the product catalog
///
/// Stock decrement is the one hot shared-mutation path in the system: two
/// orders racing for the last unit must never both succeed. The decrement
/// here is a single conditional UPDATE ("subtract only if enough stock
/// remains") executed at the storage level, so concurrent decrements
/// against the same product serialize on the row and the counter can never
/// underflow. There is no read-modify-write window at the application layer.
///
/// # Example
///
/// ```no_run
/// use storefront_shared::catalog::{decrement_stock, CatalogError};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, product_id: Uuid, vendor_id: Uuid) -> Result<(), CatalogError> {
/// let mut conn = pool.acquire().await.map_err(sqlx::Error::from)?;
/// match decrement_stock(&mut conn, product_id, vendor_id, 3).await {
///     Ok(product) => println!("{} left", product.stock_quantity),
///     Err(CatalogError::InsufficientStock { available, requested, .. }) => {
///         println!("only {} of {} available", available, requested)
///     }
///     Err(e) => eprintln!("{}", e),
/// }
/// # Ok(())
/// # }
/// ```

use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

use crate::models::product::Product;

/// Error type for catalog stock operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No product with that id exists
    #[error("Product {0} not found")]
    NotFound(Uuid),

    /// The product belongs to a different vendor than the caller
    #[error("Product {product_id} does not belong to this vendor")]
    WrongTenant { product_id: Uuid },

    /// The product is deactivated and cannot be ordered
    #[error("Product '{name}' is not active")]
    Inactive { product_id: Uuid, name: String },

    /// Current stock is lower than the requested quantity
    #[error("Insufficient stock for '{name}': {available} available, {requested} requested")]
    InsufficientStock {
        product_id: Uuid,
        name: String,
        available: i32,
        requested: i32,
    },

    /// Requested quantity was zero or negative
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// Underlying database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Atomically takes `quantity` units of a product's stock
///
/// The caller's vendor must own the product, the product must be active,
/// and at least `quantity` units must remain. On success the stock is
/// reduced in one storage-level conditional update and the updated product
/// row is returned.
///
/// Takes a connection rather than the pool, so it runs equally against an
/// acquired connection or inside an open transaction; the order engine
/// calls it per item within its all-or-nothing unit of work, where a later
/// failure rolls the decrement back.
///
/// # Errors
///
/// - [`CatalogError::NotFound`]: no product with that id
/// - [`CatalogError::WrongTenant`]: product owned by another vendor
/// - [`CatalogError::Inactive`]: product deactivated
/// - [`CatalogError::InsufficientStock`]: fewer units available than requested
/// - [`CatalogError::InvalidQuantity`]: quantity <= 0
pub async fn decrement_stock(
    conn: &mut PgConnection,
    product_id: Uuid,
    vendor_id: Uuid,
    quantity: i32,
) -> Result<Product, CatalogError> {
    if quantity <= 0 {
        return Err(CatalogError::InvalidQuantity(quantity));
    }

    // Single conditional update: succeeds only when the tenant matches, the
    // product is active, and enough stock remains. Row locking in Postgres
    // serializes concurrent decrements, so the condition is race-free.
    let updated = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - $3, updated_at = NOW()
        WHERE id = $1
          AND vendor_id = $2
          AND is_active
          AND stock_quantity >= $3
        RETURNING id, vendor_id, name, description, price, stock_quantity,
                  image, is_active, created_by, created_at, updated_at
        "#,
    )
    .bind(product_id)
    .bind(vendor_id)
    .bind(quantity)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(product) = updated {
        debug!(product_id = %product_id, quantity, remaining = product.stock_quantity,
               "stock decremented");
        return Ok(product);
    }

    // The conditional update matched nothing; re-read the row to report
    // which precondition failed.
    let product = Product::find_by_id(&mut *conn, product_id)
        .await?
        .ok_or(CatalogError::NotFound(product_id))?;

    if product.vendor_id != vendor_id {
        return Err(CatalogError::WrongTenant { product_id });
    }
    if !product.is_active {
        return Err(CatalogError::Inactive {
            product_id,
            name: product.name,
        });
    }
    Err(CatalogError::InsufficientStock {
        product_id,
        name: product.name,
        available: product.stock_quantity,
        requested: quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_product() {
        let err = CatalogError::InsufficientStock {
            product_id: Uuid::new_v4(),
            name: "Widget".to_string(),
            available: 2,
            requested: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Widget"));
        assert!(msg.contains("2 available"));
        assert!(msg.contains("3 requested"));
    }

    #[test]
    fn test_wrong_tenant_does_not_leak_details() {
        let product_id = Uuid::new_v4();
        let err = CatalogError::WrongTenant { product_id };
        // Cross-tenant failures must not expose the other vendor's data
        assert_eq!(
            err.to_string(),
            format!("Product {} does not belong to this vendor", product_id)
        );
    }

    // Concurrency behavior (stock = 1, two decrements, exactly one success)
    // is exercised against Postgres in storefront-api/tests.
}
