/// Order and order-item models
///
/// Orders are created together with their items as one logical unit by the
/// engine in [`crate::orders`]; the row-level operations here are its
/// building blocks. After creation the order header is mutable (status,
/// shipping address, notes, staff assignment) but items are immutable:
/// there are no add/remove/update item operations, and each item keeps the
/// unit price snapshotted from the product at order time.
///
/// # State Machine
///
/// ```text
/// pending → confirmed → processing → shipped → delivered
/// any non-terminal state → cancelled
/// ```
///
/// Transition legality is *not* enforced when a status is set; any value
/// may be written by an authorized role. [`OrderStatus::can_transition_to`]
/// encodes the intended table for a future hardened mode.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE order_status AS ENUM (
///     'pending', 'confirmed', 'processing', 'shipped', 'delivered', 'cancelled'
/// );
///
/// CREATE TABLE orders (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
///     customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
///     order_number VARCHAR(50) NOT NULL UNIQUE,
///     status order_status NOT NULL DEFAULT 'pending',
///     total_amount NUMERIC(10,2) NOT NULL DEFAULT 0.00,
///     shipping_address TEXT NOT NULL,
///     notes TEXT,
///     assigned_staff_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE order_items (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
///     product_id UUID NOT NULL REFERENCES products(id),
///     quantity INTEGER NOT NULL CHECK (quantity > 0),
///     unit_price NUMERIC(10,2) NOT NULL,
///     subtotal NUMERIC(10,2) NOT NULL
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::PgPool;
use uuid::Uuid;

use crate::tenancy::TenantOwned;

/// Order fulfillment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, not yet confirmed
    Pending,

    /// Order confirmed by the store
    Confirmed,

    /// Order being prepared
    Processing,

    /// Order handed to the carrier
    Shipped,

    /// Order delivered (terminal)
    Delivered,

    /// Order cancelled (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses status from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Checks if the status is terminal (no further transitions intended)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Checks if a transition to `target` follows the intended state machine
    ///
    /// Not enforced anywhere yet; status writes accept any value. This is
    /// the hook for a stricter mode.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        match (self, target) {
            (OrderStatus::Pending, OrderStatus::Confirmed) => true,
            (OrderStatus::Confirmed, OrderStatus::Processing) => true,
            (OrderStatus::Processing, OrderStatus::Shipped) => true,
            (OrderStatus::Shipped, OrderStatus::Delivered) => true,

            // Cancellation is reachable from any non-terminal state
            (s, OrderStatus::Cancelled) if !s.is_terminal() => true,

            _ => false,
        }
    }
}

/// Order model: the header row of a placed order
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID (UUID v4)
    pub id: Uuid,

    /// Vendor this order belongs to
    pub vendor_id: Uuid,

    /// Customer who placed the order
    pub customer_id: Uuid,

    /// Human-readable order number, globally unique (e.g. "ORD-1A2B3C4D")
    pub order_number: String,

    /// Current fulfillment status
    pub status: OrderStatus,

    /// Total amount, always equal to the sum of the items' subtotals
    pub total_amount: Decimal,

    /// Shipping address captured at order time
    pub shipping_address: String,

    /// Optional free-form notes
    pub notes: Option<String>,

    /// Staff member working the order (same vendor, staff or owner role)
    pub assigned_staff_id: Option<Uuid>,

    /// When the order was placed
    pub created_at: DateTime<Utc>,

    /// When the order was last updated
    pub updated_at: DateTime<Utc>,
}

impl TenantOwned for Order {
    fn owning_tenant(&self) -> Option<Uuid> {
        Some(self.vendor_id)
    }
}

/// Order item: an immutable line of a placed order
///
/// `unit_price` is the product price snapshotted when the order was placed;
/// later product price changes never touch it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Unique item ID (UUID v4)
    pub id: Uuid,

    /// Order this item belongs to
    pub order_id: Uuid,

    /// Product ordered (same vendor as the order)
    pub product_id: Uuid,

    /// Units ordered (> 0)
    pub quantity: i32,

    /// Unit price snapshot at order time
    pub unit_price: Decimal,

    /// quantity × unit_price
    pub subtotal: Decimal,
}

/// Input for updating an order header
///
/// Items are immutable; only header fields can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOrder {
    /// New status (no transition legality check)
    pub status: Option<OrderStatus>,

    /// New shipping address
    pub shipping_address: Option<String>,

    /// New notes (use Some(None) to clear)
    pub notes: Option<Option<String>>,
}

impl Order {
    /// Inserts an order header inside an open transaction
    ///
    /// Used by the order engine; the header and all items commit or roll
    /// back together.
    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        vendor_id: Uuid,
        customer_id: Uuid,
        order_number: &str,
        status: OrderStatus,
        total_amount: Decimal,
        shipping_address: &str,
        notes: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (vendor_id, customer_id, order_number, status,
                                total_amount, shipping_address, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, vendor_id, customer_id, order_number, status, total_amount,
                      shipping_address, notes, assigned_staff_id, created_at, updated_at
            "#,
        )
        .bind(vendor_id)
        .bind(customer_id)
        .bind(order_number)
        .bind(status)
        .bind(total_amount)
        .bind(shipping_address)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    /// Finds an order by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, vendor_id, customer_id, order_number, status, total_amount,
                   shipping_address, notes, assigned_staff_id, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Fetches the items of an order
    pub async fn items(&self, pool: &PgPool) -> Result<Vec<OrderItem>, sqlx::Error> {
        OrderItem::list_by_order(pool, self.id).await
    }

    /// Updates header fields of an order
    ///
    /// Status transition legality is deliberately not checked here, see the
    /// module docs.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateOrder,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE orders SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.shipping_address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", shipping_address = ${}", bind_count));
        }
        if data.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, vendor_id, customer_id, order_number, status, \
             total_amount, shipping_address, notes, assigned_staff_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Order>(&query).bind(id);

        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(shipping_address) = data.shipping_address {
            q = q.bind(shipping_address);
        }
        if let Some(notes) = data.notes {
            q = q.bind(notes);
        }

        let order = q.fetch_optional(pool).await?;

        Ok(order)
    }

    /// Sets or clears the assigned staff member
    pub async fn set_assigned_staff(
        pool: &PgPool,
        id: Uuid,
        staff_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET assigned_staff_id = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, vendor_id, customer_id, order_number, status, total_amount,
                      shipping_address, notes, assigned_staff_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(staff_id)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    /// Deletes an order by ID
    ///
    /// Items are removed by the cascade. Decremented stock is *not*
    /// restored; see [`crate::orders::engine::delete_order`] for the
    /// rationale.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl OrderItem {
    /// Inserts an item inside an open transaction
    pub(crate) async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        subtotal: Decimal,
    ) -> Result<Self, sqlx::Error> {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, order_id, product_id, quantity, unit_price, subtotal
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(subtotal)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    /// Lists the items of an order
    pub async fn list_by_order(pool: &PgPool, order_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("returned"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));

        // No skipping ahead or going backwards
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancellation_from_non_terminal_only() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }
}
