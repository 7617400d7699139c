/// Vendor user management endpoints
///
/// - `POST /v1/users` - Create a user in the caller's vendor
/// - `GET /v1/users` - List the vendor's users
/// - `GET /v1/users/:id` - Get one user
/// - `PUT /v1/users/:id` - Update a user
/// - `DELETE /v1/users/:id` - Delete a user
///
/// All operations are OWNER only and scoped to the caller's vendor:
/// lookups go through the tenant-scoped query, so a user id from another
/// vendor resolves to 404, never to another tenant's row.

use crate::{
    app::AppState,
    error::{validate_payload, ApiError, ApiResult, ValidationErrorDetail},
    routes::vendors::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use storefront_shared::{
    auth::{
        authorization::{require_permission, Operation},
        middleware::AuthContext,
        password,
    },
    models::user::{CreateUser, UpdateUser, User, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub phone_number: Option<String>,

    pub role: UserRole,
}

fn require_vendor(auth: &AuthContext) -> Result<Uuid, ApiError> {
    auth.vendor_id
        .ok_or_else(|| ApiError::Forbidden("User must be associated with a vendor".to_string()))
}

fn require_vendor_owner(auth: &AuthContext) -> Result<Uuid, ApiError> {
    require_permission(auth, Operation::ManageUsers)?;
    require_vendor(auth)
}

/// Tenant-scoped lookup for the id-taking handlers
///
/// Runs before the role gate so a nonexistent id reports 404 regardless
/// of who asks; only an existing row gets as far as the permission check.
async fn load_vendor_user(state: &AppState, auth: &AuthContext, id: Uuid) -> Result<User, ApiError> {
    let vendor_id = require_vendor(auth)?;

    let user = User::find_by_id_and_vendor(&state.db, id, vendor_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    require_permission(auth, Operation::ManageUsers)?;
    Ok(user)
}

/// Create a user within the caller's vendor
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an owner with a vendor
/// - `409 Conflict`: Username or email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let vendor_id = require_vendor_owner(&auth)?;
    validate_payload(&req)?;

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            role: req.role,
            vendor_id: Some(vendor_id),
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// List the caller's vendor users, newest first
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    let vendor_id = require_vendor_owner(&auth)?;
    let (limit, offset) = pagination.clamped();

    let users = User::list_by_vendor(&state.db, vendor_id, limit, offset).await?;

    Ok(Json(users))
}

/// Get one user of the caller's vendor
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    let user = load_vendor_user(&state, &auth, id).await?;

    Ok(Json(user))
}

/// Update user request: plaintext password instead of a hash
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub phone_number: Option<Option<String>>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Update one user of the caller's vendor
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    load_vendor_user(&state, &auth, id).await?;

    let password_hash = match req.password.as_deref() {
        Some(pw) => {
            password::validate_password_strength(pw).map_err(|e| {
                ApiError::ValidationError(vec![ValidationErrorDetail {
                    field: "password".to_string(),
                    message: e,
                }])
            })?;
            Some(password::hash_password(pw)?)
        }
        None => None,
    };

    let updated = User::update(
        &state.db,
        id,
        UpdateUser {
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            role: req.role,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(updated))
}

/// Delete one user of the caller's vendor
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    load_vendor_user(&state, &auth, id).await?;

    if auth.user_id == id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    User::delete(&state.db, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
