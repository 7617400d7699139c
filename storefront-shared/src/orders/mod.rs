/// Order placement and management engine
///
/// This module orchestrates the multi-entity order workflow: resolving the
/// customer, validating and reserving stock, snapshotting prices, and
/// persisting the order with its items as one durable unit. It also owns
/// the role-sensitive read paths (listing, fetching) and the header
/// mutations (status, assignment, deletion).
///
/// # Modules
///
/// - [`engine`]: `place_order` and the rest of the order operations

pub mod engine;

pub use engine::{
    assign_staff, delete_order, get_order, list_orders, list_own_orders, place_order,
    update_order, update_order_status, OrderError, OrderFilter, OrderItemRequest, PlaceOrder,
    PlacedOrder,
};
