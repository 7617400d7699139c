/// Order endpoints
///
/// - `POST /v1/orders` - Place an order (all-or-nothing)
/// - `GET /v1/orders` - List orders visible to the caller
/// - `GET /v1/orders/mine` - The caller's own orders
/// - `GET /v1/orders/:id` - Get one order with its items
/// - `PUT /v1/orders/:id` - Update header fields (STAFF+, assignment rule)
/// - `DELETE /v1/orders/:id` - Delete an order (OWNER only)
/// - `PATCH /v1/orders/:id/status` - Set status (STAFF+, assignment rule)
/// - `PATCH /v1/orders/:id/assign` - Assign/clear staff (OWNER only)
///
/// These handlers are thin: scoping, assignment rules, and the
/// transactional placement path all live in the shared order engine, and
/// its typed errors map onto HTTP statuses in `crate::error`.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use storefront_shared::{
    auth::middleware::AuthContext,
    models::order::{Order, OrderItem, OrderStatus, UpdateOrder},
    orders::{self, OrderFilter, PlaceOrder, PlacedOrder},
};
use uuid::Uuid;

/// Order list query parameters
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    /// Filter by status
    pub status: Option<OrderStatus>,

    #[serde(default)]
    pub offset: i64,

    pub limit: Option<i64>,
}

/// Order with its line items
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Status update request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Staff assignment request; `staff_id: null` clears the assignment
#[derive(Debug, Deserialize)]
pub struct AssignStaffRequest {
    pub staff_id: Option<Uuid>,
}

/// Place an order
///
/// The whole placement is one unit of work: on any failure no order rows
/// persist and already-decremented stock is rolled back.
///
/// # Errors
///
/// - `400 Bad Request`: Empty item list or non-positive quantity
/// - `403 Forbidden`: No vendor binding, or cross-tenant product
/// - `404 Not Found`: Unknown product
/// - `409 Conflict`: Inactive product or insufficient stock
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<PlaceOrder>,
) -> ApiResult<(StatusCode, Json<PlacedOrder>)> {
    let placed = orders::place_order(&state.db, &auth, req).await?;

    Ok((StatusCode::CREATED, Json(placed)))
}

/// List orders visible to the caller
///
/// Owners see every order of the vendor, staff their assigned plus
/// unassigned orders, customers only their own.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        offset: query.offset.max(0),
        limit: query.limit,
    };

    let orders = orders::list_orders(&state.db, &auth, filter).await?;

    Ok(Json(orders))
}

/// List the caller's own orders
///
/// Same listing as a customer-role caller would get from `GET /orders`;
/// provided so staff and owners can also see their personal purchases.
pub async fn list_own_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let filter = OrderFilter {
        status: query.status,
        offset: query.offset.max(0),
        limit: query.limit,
    };
    let orders = orders::list_own_orders(&state.db, &auth, filter).await?;

    Ok(Json(orders))
}

/// Get one order with its items
pub async fn get_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderDetail>> {
    let (order, items) = orders::get_order(&state.db, &auth, id).await?;

    Ok(Json(OrderDetail { order, items }))
}

/// Update an order's header fields
pub async fn update_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateOrder>,
) -> ApiResult<Json<Order>> {
    let updated = orders::update_order(&state.db, &auth, id, data).await?;

    Ok(Json(updated))
}

/// Set an order's status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Order>> {
    let updated = orders::update_order_status(&state.db, &auth, id, req.status).await?;

    Ok(Json(updated))
}

/// Assign a staff member to an order, or clear the assignment
pub async fn assign_staff(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignStaffRequest>,
) -> ApiResult<Json<Order>> {
    let updated = orders::assign_staff(&state.db, &auth, id, req.staff_id).await?;

    Ok(Json(updated))
}

/// Delete an order
///
/// Decremented stock is not restored.
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    orders::delete_order(&state.db, &auth, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
