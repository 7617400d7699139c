/// Vendor (tenant) management endpoints
///
/// - `POST /v1/vendors` - Create a vendor (platform accounts only)
/// - `GET /v1/vendors` - List active vendors
/// - `GET /v1/vendors/:id` - Get a vendor
/// - `PUT /v1/vendors/:id` - Update a vendor (its owner or platform)
/// - `DELETE /v1/vendors/:id` - Delete a vendor (platform accounts only)
///
/// Deleting a vendor cascades to its users, products, customers, and
/// orders.

use crate::{
    app::AppState,
    error::{validate_payload, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use storefront_shared::{
    auth::middleware::AuthContext,
    models::{
        user::UserRole,
        vendor::{CreateVendor, UpdateVendor, Vendor},
    },
};
use uuid::Uuid;
use validator::Validate;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl Pagination {
    /// Clamps limit to 1..=100 and offset to non-negative
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 100), self.offset.max(0))
    }
}

/// Create vendor request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 255, message = "Store name must be 1-255 characters"))]
    pub store_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub contact_email: String,

    pub contact_phone: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Domain must be 1-255 characters"))]
    pub domain: String,

    pub subdomain: Option<String>,
}

/// Only platform-level accounts (no vendor binding) may manage the
/// vendor registry itself
fn require_platform(auth: &AuthContext) -> Result<(), ApiError> {
    if auth.vendor_id.is_some() {
        return Err(ApiError::Forbidden(
            "Platform account required".to_string(),
        ));
    }
    Ok(())
}

/// Create a new vendor
///
/// # Errors
///
/// - `403 Forbidden`: Caller is bound to a vendor
/// - `409 Conflict`: Domain or contact email already registered
pub async fn create_vendor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateVendorRequest>,
) -> ApiResult<(StatusCode, Json<Vendor>)> {
    require_platform(&auth)?;
    validate_payload(&req)?;

    let vendor = Vendor::create(
        &state.db,
        CreateVendor {
            store_name: req.store_name,
            contact_email: req.contact_email,
            contact_phone: req.contact_phone,
            domain: req.domain,
            subdomain: req.subdomain,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(vendor)))
}

/// List active vendors
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<Vendor>>> {
    let (limit, offset) = pagination.clamped();
    let vendors = Vendor::list(&state.db, limit, offset).await?;

    Ok(Json(vendors))
}

/// Get a vendor by id
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vendor>> {
    let vendor = Vendor::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(vendor))
}

/// Update a vendor
///
/// Allowed for the vendor's owner or a platform account.
pub async fn update_vendor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateVendor>,
) -> ApiResult<Json<Vendor>> {
    // Not-found takes precedence over permission checks
    let vendor = Vendor::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    let is_own_vendor = auth.vendor_id == Some(vendor.id) && auth.role == UserRole::Owner;
    if !is_own_vendor && auth.vendor_id.is_some() {
        return Err(ApiError::Forbidden(
            "Not authorized to update this vendor".to_string(),
        ));
    }

    let updated = Vendor::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Vendor not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a vendor and everything it owns
pub async fn delete_vendor(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_platform(&auth)?;

    let deleted = Vendor::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Vendor not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
