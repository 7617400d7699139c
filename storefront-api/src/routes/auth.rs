/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Register a new user
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `GET /v1/auth/me` - Current user profile (authenticated)
///
/// Registration binds the new account to a vendor resolved either by id
/// or by storefront domain. Customer-role registrations eagerly create
/// the customer profile so the first order placement does not have to.

use crate::{
    app::AppState,
    error::{validate_payload, ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use storefront_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::{
        customer::Customer,
        user::{CreateUser, User, UserRole},
        vendor::Vendor,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login username
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Password confirmation, must match `password`
    pub password_confirm: String,

    /// Role for the new account (default: customer)
    #[serde(default = "default_role")]
    pub role: UserRole,

    /// Optional first name
    pub first_name: Option<String>,

    /// Optional last name
    pub last_name: Option<String>,

    /// Optional phone number
    pub phone_number: Option<String>,

    /// Vendor to register under, by id
    pub vendor_id: Option<Uuid>,

    /// Vendor to register under, by storefront domain (used when
    /// `vendor_id` is absent)
    pub domain: Option<String>,
}

fn default_role() -> UserRole {
    UserRole::Customer
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login username
    pub username: String,

    /// Password
    pub password: String,
}

/// Token response for login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Token type, always "bearer"
    pub token_type: String,

    /// The authenticated user
    pub user: User,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Register a new user
///
/// Resolves the target vendor by id, then by domain. Platform accounts
/// without a vendor binding are only possible when neither is given.
/// When the new account has the customer role and a vendor, the customer
/// profile is created up front.
///
/// # Errors
///
/// - `400 Bad Request`: Passwords don't match, or unknown vendor/domain
/// - `409 Conflict`: Username or email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_payload(&req)?;

    if req.password != req.password_confirm {
        return Err(ApiError::BadRequest("Passwords don't match".to_string()));
    }

    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Resolve vendor by id, then by domain
    let vendor = match (req.vendor_id, req.domain.as_deref()) {
        (Some(vendor_id), _) => Some(
            Vendor::find_by_id(&state.db, vendor_id)
                .await?
                .ok_or_else(|| ApiError::BadRequest("Invalid vendor ID".to_string()))?,
        ),
        (None, Some(domain)) => Some(
            Vendor::find_by_domain(&state.db, domain)
                .await?
                .ok_or_else(|| {
                    ApiError::BadRequest("Vendor not found for this domain".to_string())
                })?,
        ),
        (None, None) => None,
    };

    let password_hash = password::hash_password(&req.password)?;

    // Duplicate username/email surfaces as a unique violation, mapped to 409
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
            vendor_id: vendor.as_ref().map(|v| v.id),
        },
    )
    .await?;

    // Eagerly create the customer profile for customer-role registrations
    if user.role == UserRole::Customer {
        if let Some(vendor) = &vendor {
            Customer::get_or_create(&state.db, vendor.id, &user).await?;
        }
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// Login endpoint
///
/// Authenticates by username and password and returns JWT tokens carrying
/// the user's vendor binding and role.
///
/// # Errors
///
/// - `400 Bad Request`: Account is inactive
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    validate_payload(&req)?;

    // Same error for unknown user and wrong password
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Incorrect username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Incorrect username or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    // Generate tokens
    let access_claims = jwt::Claims::new(
        user.id,
        user.vendor_id,
        user.role,
        user.username.clone(),
        jwt::TokenType::Access,
    );
    let refresh_claims = jwt::Claims::new(
        user.id,
        user.vendor_id,
        user.role,
        user.username.clone(),
        jwt::TokenType::Refresh,
    );

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    // Update last login
    User::update_last_login(&state.db, user.id).await?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a valid refresh token for a new access token. Claims are
/// carried over from the refresh token, so a role change requires a
/// fresh login to take effect.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired, or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let access_claims = jwt::Claims::new(
        claims.sub,
        claims.vendor_id,
        claims.role,
        claims.username,
        jwt::TokenType::Access,
    );
    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Current user profile
///
/// # Errors
///
/// - `404 Not Found`: The account behind the token no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
