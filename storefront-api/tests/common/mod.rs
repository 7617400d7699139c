/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations run against DATABASE_URL)
/// - Test vendor/user/customer creation
/// - JWT token generation
/// - API request helpers
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use sqlx::PgPool;
use storefront_api::app::{build_router, AppState};
use storefront_api::config::Config;
use storefront_shared::auth::jwt::{create_token, Claims, TokenType};
use storefront_shared::models::customer::Customer;
use storefront_shared::models::product::{CreateProduct, Product};
use storefront_shared::models::user::{CreateUser, User, UserRole};
use storefront_shared::models::vendor::{CreateVendor, Vendor};
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
///
/// Each context gets its own vendor, so parallel tests never see each
/// other's rows even when they share a database.
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub vendor: Vendor,
    pub owner: User,
    pub customer_user: User,
    pub customer: Customer,
}

impl TestContext {
    /// Creates a new test context with a fresh vendor and two users
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../storefront-shared/migrations")
            .run(&db)
            .await?;

        let suffix = Uuid::new_v4().simple().to_string();

        let vendor = Vendor::create(
            &db,
            CreateVendor {
                store_name: format!("Test Store {suffix}"),
                contact_email: format!("store-{suffix}@example.com"),
                contact_phone: None,
                domain: format!("{suffix}.example.com"),
                subdomain: None,
            },
        )
        .await?;

        let owner = create_test_user(&db, vendor.id, UserRole::Owner, &suffix).await?;
        let customer_user = create_test_user(&db, vendor.id, UserRole::Customer, &suffix).await?;
        let customer = Customer::get_or_create(&db, vendor.id, &customer_user).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            vendor,
            owner,
            customer_user,
            customer,
        })
    }

    /// Returns a bearer token for the given user
    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims::new(
            user.id,
            user.vendor_id,
            user.role,
            user.username.clone(),
            TokenType::Access,
        );
        create_token(&claims, &self.config.jwt.secret).expect("token creation failed")
    }

    /// Returns an authorization header value for the vendor owner
    pub fn owner_auth(&self) -> String {
        format!("Bearer {}", self.token_for(&self.owner))
    }

    /// Returns an authorization header value for the customer user
    pub fn customer_auth(&self) -> String {
        format!("Bearer {}", self.token_for(&self.customer_user))
    }

    /// Sends a JSON request through the router and returns the response
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header("authorization", auth);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.app.clone().call(request).await.unwrap()
    }

    /// Cleans up test data
    ///
    /// Deleting the vendor cascades to users, customers, products,
    /// orders and order items.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        Vendor::delete(&self.db, self.vendor.id).await?;
        Ok(())
    }
}

/// Creates a test user with a unique username and email
pub async fn create_test_user(
    db: &PgPool,
    vendor_id: Uuid,
    role: UserRole,
    suffix: &str,
) -> anyhow::Result<User> {
    let tag = Uuid::new_v4().simple().to_string();
    let user = User::create(
        db,
        CreateUser {
            username: format!("user-{role:?}-{tag}").to_lowercase(),
            email: format!("user-{tag}-{suffix}@example.com"),
            password_hash: storefront_shared::auth::password::hash_password("Str0ng!pass")?,
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
            phone_number: None,
            role,
            vendor_id: Some(vendor_id),
        },
    )
    .await?;
    Ok(user)
}

/// Creates a test product with the given price and stock
pub async fn create_test_product(
    ctx: &TestContext,
    name: &str,
    price: rust_decimal::Decimal,
    stock: i32,
) -> anyhow::Result<Product> {
    let product = Product::create(
        &ctx.db,
        CreateProduct {
            vendor_id: ctx.vendor.id,
            name: name.to_string(),
            description: None,
            price,
            stock_quantity: stock,
            image: None,
            created_by: Some(ctx.owner.id),
        },
    )
    .await?;
    Ok(product)
}

/// Reads a response body as JSON, panicking with the body text on failure
pub async fn read_json(response: Response<Body>) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or_else(|_| {
        panic!(
            "non-JSON response ({}): {}",
            status,
            String::from_utf8_lossy(&body)
        )
    });
    (status, json)
}
