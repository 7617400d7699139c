/// Product catalog endpoints
///
/// - `POST /v1/products` - Create a product (STAFF+)
/// - `GET /v1/products` - List the vendor's products (search, is_active filter)
/// - `GET /v1/products/:id` - Get one product
/// - `PUT /v1/products/:id` - Update a product (STAFF+)
/// - `DELETE /v1/products/:id` - Delete a product (OWNER only)
/// - `PATCH /v1/products/:id/stock` - Set absolute stock quantity (STAFF+)
///
/// Every operation is scoped to the caller's vendor. A product id from
/// another vendor yields 404 on reads and 403 on writes, depending on
/// whether the row is visible at all.

use crate::{
    app::AppState,
    error::{validate_payload, ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use storefront_shared::{
    auth::{
        authorization::{require_permission, Operation},
        middleware::AuthContext,
    },
    models::product::{CreateProduct, Product, UpdateProduct},
    tenancy::can_access,
};
use uuid::Uuid;
use validator::Validate;

/// Create product request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,

    /// Unit price; must be non-negative
    pub price: Decimal,

    /// Initial stock; must be non-negative
    #[serde(default)]
    pub stock_quantity: i32,

    pub image: Option<String>,
}

/// Product list query parameters
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Case-insensitive search over name and description
    pub search: Option<String>,

    /// Filter by active flag
    pub is_active: Option<bool>,

    #[serde(default)]
    pub offset: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Set-stock request
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    /// New absolute stock quantity
    pub stock_quantity: i32,
}

fn require_vendor(auth: &AuthContext) -> Result<Uuid, ApiError> {
    auth.vendor_id
        .ok_or_else(|| ApiError::Forbidden("User must be associated with a vendor".to_string()))
}

/// Loads a product and verifies it belongs to the caller's vendor
async fn load_own_product(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
) -> Result<Product, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if !can_access(&product, auth) {
        return Err(ApiError::Forbidden(
            "Not authorized to access this product".to_string(),
        ));
    }

    Ok(product)
}

/// Create a product in the caller's vendor
///
/// # Errors
///
/// - `400 Bad Request`: Negative price or stock
/// - `403 Forbidden`: Customer role, or no vendor binding
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    require_permission(&auth, Operation::CreateProduct)?;
    let vendor_id = require_vendor(&auth)?;
    validate_payload(&req)?;

    if req.price < Decimal::ZERO {
        return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
    }
    if req.stock_quantity < 0 {
        return Err(ApiError::BadRequest(
            "Stock quantity cannot be negative".to_string(),
        ));
    }

    let product = Product::create(
        &state.db,
        CreateProduct {
            vendor_id,
            name: req.name,
            description: req.description,
            price: req.price,
            stock_quantity: req.stock_quantity,
            image: req.image,
            created_by: Some(auth.user_id),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// List the caller's vendor products
pub async fn list_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let vendor_id = require_vendor(&auth)?;

    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    let products = Product::list_by_vendor(
        &state.db,
        vendor_id,
        query.search.as_deref(),
        query.is_active,
        limit,
        offset,
    )
    .await?;

    Ok(Json(products))
}

/// Get one product of the caller's vendor
pub async fn get_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Product>> {
    let product = load_own_product(&state, &auth, id).await?;

    Ok(Json(product))
}

/// Update a product
///
/// Price changes never touch existing order items; each item keeps its
/// snapshotted unit price.
pub async fn update_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateProduct>,
) -> ApiResult<Json<Product>> {
    // Not-found takes precedence over permission checks
    load_own_product(&state, &auth, id).await?;
    require_permission(&auth, Operation::UpdateProduct)?;

    if let Some(price) = data.price {
        if price < Decimal::ZERO {
            return Err(ApiError::BadRequest("Price cannot be negative".to_string()));
        }
    }
    if let Some(stock) = data.stock_quantity {
        if stock < 0 {
            return Err(ApiError::BadRequest(
                "Stock quantity cannot be negative".to_string(),
            ));
        }
    }

    let updated = Product::update(&state.db, id, data)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete a product (OWNER only)
pub async fn delete_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    // Not-found takes precedence over permission checks
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    require_permission(&auth, Operation::DeleteProduct)?;
    if !can_access(&product, &auth) {
        return Err(ApiError::Forbidden(
            "Not authorized to access this product".to_string(),
        ));
    }

    Product::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Set absolute stock quantity (administrative restock or correction)
pub async fn set_stock(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStockRequest>,
) -> ApiResult<Json<Product>> {
    // Not-found takes precedence over permission checks
    load_own_product(&state, &auth, id).await?;
    require_permission(&auth, Operation::UpdateProduct)?;

    if req.stock_quantity < 0 {
        return Err(ApiError::BadRequest(
            "Stock quantity cannot be negative".to_string(),
        ));
    }

    let updated = Product::set_stock(&state.db, id, req.stock_quantity)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(updated))
}
