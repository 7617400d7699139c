/// Customer directory endpoints
///
/// - `GET /v1/customers` - List the vendor's customers (STAFF+)
/// - `GET /v1/customers/:id` - Get one customer
///
/// Customer records are created lazily by order placement (or eagerly at
/// registration), so there is no create endpoint. A customer-role caller
/// can fetch only their own profile.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use storefront_shared::{
    auth::{
        authorization::{require_permission, Operation},
        middleware::AuthContext,
    },
    models::{customer::Customer, user::UserRole},
    tenancy::can_access,
};
use uuid::Uuid;

/// Customer list query parameters
#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    /// Case-insensitive search over full name and email
    pub search: Option<String>,

    #[serde(default)]
    pub offset: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// List the caller's vendor customers (STAFF+)
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<CustomerListQuery>,
) -> ApiResult<Json<Vec<Customer>>> {
    require_permission(&auth, Operation::ViewCustomers)?;
    let vendor_id = auth
        .vendor_id
        .ok_or_else(|| ApiError::Forbidden("User must be associated with a vendor".to_string()))?;

    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    let customers =
        Customer::list_by_vendor(&state.db, vendor_id, query.search.as_deref(), limit, offset)
            .await?;

    Ok(Json(customers))
}

/// Get one customer
///
/// Staff-level callers can fetch any customer of their vendor; a
/// customer-role caller only their own record.
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Customer>> {
    let customer = Customer::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    if !can_access(&customer, &auth) {
        return Err(ApiError::Forbidden(
            "Not authorized to access this customer".to_string(),
        ));
    }

    if auth.role == UserRole::Customer && customer.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Customers can only view their own profile".to_string(),
        ));
    }

    Ok(Json(customer))
}
