/// Integration tests for the storefront API
///
/// These tests verify the full system works end-to-end:
/// - Order placement with stock decrement and total computation
/// - All-or-nothing rollback on partial failures
/// - Concurrent placement against the last unit of stock
/// - Tenant isolation across vendors
/// - Customer and staff scoping rules
///
/// All tests require a running Postgres (DATABASE_URL) and are marked
/// `#[ignore]`; run them with `cargo test -- --ignored`.
mod common;

use axum::http::StatusCode;
use common::TestContext;
use rust_decimal_macros::dec;
use serde_json::json;
use storefront_shared::models::customer::Customer;
use storefront_shared::models::product::Product;
use storefront_shared::models::user::UserRole;
use tower::Service as _;

/// Placing an order computes line subtotals and the grand total from the
/// current product price, and decrements stock by the ordered quantity.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_place_order_totals_and_stock() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Widget", dec!(9.99), 5)
        .await
        .unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/orders",
            Some(&ctx.customer_auth()),
            Some(json!({
                "shipping_address": "1 Test Lane",
                "items": [{"product_id": product.id, "quantity": 3}]
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    assert_eq!(body["order"]["total_amount"], "29.97");
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["items"][0]["unit_price"], "9.99");
    assert_eq!(body["items"][0]["subtotal"], "29.97");
    assert!(body["order"]["order_number"]
        .as_str()
        .unwrap()
        .starts_with("ORD-"));

    let reloaded = Product::find_by_id(&ctx.db, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.stock_quantity, 2);

    ctx.cleanup().await.unwrap();
}

/// Ordering more units than are in stock is rejected and leaves the
/// stock untouched.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_insufficient_stock_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Scarce", dec!(4.50), 2)
        .await
        .unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/orders",
            Some(&ctx.customer_auth()),
            Some(json!({
                "shipping_address": "1 Test Lane",
                "items": [{"product_id": product.id, "quantity": 5}]
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let reloaded = Product::find_by_id(&ctx.db, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.stock_quantity, 2);

    ctx.cleanup().await.unwrap();
}

/// A failure on a later line item rolls back the whole order, including
/// stock already decremented for earlier items.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_partial_failure_rolls_back() {
    let ctx = TestContext::new().await.unwrap();
    let plenty = common::create_test_product(&ctx, "Plenty", dec!(2.00), 10)
        .await
        .unwrap();
    let scarce = common::create_test_product(&ctx, "Scarce", dec!(3.00), 1)
        .await
        .unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/orders",
            Some(&ctx.customer_auth()),
            Some(json!({
                "shipping_address": "1 Test Lane",
                "items": [
                    {"product_id": plenty.id, "quantity": 2},
                    {"product_id": scarce.id, "quantity": 5}
                ]
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // First item's decrement must have been rolled back
    let plenty = Product::find_by_id(&ctx.db, plenty.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plenty.stock_quantity, 10);

    // No order header persisted either
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE vendor_id = $1")
        .bind(ctx.vendor.id)
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count.0, 0);

    ctx.cleanup().await.unwrap();
}

/// Two concurrent orders for the last unit of stock: exactly one wins.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_concurrent_placement_single_success() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Last One", dec!(19.99), 1)
        .await
        .unwrap();

    let body = json!({
        "shipping_address": "1 Test Lane",
        "items": [{"product_id": product.id, "quantity": 1}]
    });

    let auth = ctx.customer_auth();
    let req = |body: serde_json::Value| {
        axum::http::Request::builder()
            .method("POST")
            .uri("/v1/orders")
            .header("authorization", &auth)
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    };

    let mut app_a = ctx.app.clone();
    let mut app_b = ctx.app.clone();
    let (res_a, res_b) = tokio::join!(app_a.call(req(body.clone())), app_b.call(req(body)));

    let statuses = [res_a.unwrap().status(), res_b.unwrap().status()];
    let created = statuses
        .iter()
        .filter(|s| **s == StatusCode::CREATED)
        .count();
    let conflicted = statuses
        .iter()
        .filter(|s| **s == StatusCode::CONFLICT)
        .count();
    assert_eq!(created, 1, "statuses: {statuses:?}");
    assert_eq!(conflicted, 1, "statuses: {statuses:?}");

    let reloaded = Product::find_by_id(&ctx.db, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.stock_quantity, 0);

    ctx.cleanup().await.unwrap();
}

/// Ordering a deactivated product is rejected and leaves its stock
/// untouched.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_inactive_product_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Retired", dec!(5.00), 10)
        .await
        .unwrap();

    let response = ctx
        .request(
            "PUT",
            &format!("/v1/products/{}", product.id),
            Some(&ctx.owner_auth()),
            Some(json!({"is_active": false})),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["is_active"], false);

    let response = ctx
        .request(
            "POST",
            "/v1/orders",
            Some(&ctx.customer_auth()),
            Some(json!({
                "shipping_address": "1 Test Lane",
                "items": [{"product_id": product.id, "quantity": 1}]
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    let reloaded = Product::find_by_id(&ctx.db, product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.stock_quantity, 10);

    ctx.cleanup().await.unwrap();
}

/// A nonexistent id reports 404 for any caller; only an existing row
/// gets as far as the role check, which then yields 403.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_not_found_takes_precedence_over_permission() {
    let ctx = TestContext::new().await.unwrap();
    let missing = uuid::Uuid::new_v4();

    // Customer role may not update products, but absence wins
    let response = ctx
        .request(
            "PUT",
            &format!("/v1/products/{missing}"),
            Some(&ctx.customer_auth()),
            Some(json!({"name": "renamed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/products/{missing}/stock"),
            Some(&ctx.customer_auth()),
            Some(json!({"stock_quantity": 5})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .request(
            "GET",
            &format!("/v1/users/{missing}"),
            Some(&ctx.customer_auth()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Existing rows still surface the role violation
    let product = common::create_test_product(&ctx, "Guarded", dec!(1.00), 1)
        .await
        .unwrap();
    let response = ctx
        .request(
            "PUT",
            &format!("/v1/products/{}", product.id),
            Some(&ctx.customer_auth()),
            Some(json!({"name": "renamed"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .request(
            "GET",
            &format!("/v1/users/{}", ctx.owner.id),
            Some(&ctx.customer_auth()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// A product belonging to another vendor cannot be ordered, even by
/// guessing its id.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_cross_tenant_product_rejected() {
    let ctx_a = TestContext::new().await.unwrap();
    let ctx_b = TestContext::new().await.unwrap();

    let foreign = common::create_test_product(&ctx_b, "Foreign", dec!(1.00), 10)
        .await
        .unwrap();

    let response = ctx_a
        .request(
            "POST",
            "/v1/orders",
            Some(&ctx_a.customer_auth()),
            Some(json!({
                "shipping_address": "1 Test Lane",
                "items": [{"product_id": foreign.id, "quantity": 1}]
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let reloaded = Product::find_by_id(&ctx_b.db, foreign.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.stock_quantity, 10);

    ctx_a.cleanup().await.unwrap();
    ctx_b.cleanup().await.unwrap();
}

/// Customers listing orders only ever see their own, never another
/// customer's in the same store.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_customer_sees_only_own_orders() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Shared", dec!(5.00), 100)
        .await
        .unwrap();

    let other_user =
        common::create_test_user(&ctx.db, ctx.vendor.id, UserRole::Customer, "other")
            .await
            .unwrap();
    Customer::get_or_create(&ctx.db, ctx.vendor.id, &other_user)
        .await
        .unwrap();

    let order_body = json!({
        "shipping_address": "1 Test Lane",
        "items": [{"product_id": product.id, "quantity": 1}]
    });
    for auth in [
        ctx.customer_auth(),
        format!("Bearer {}", ctx.token_for(&other_user)),
    ] {
        let response = ctx
            .request("POST", "/v1/orders", Some(&auth), Some(order_body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .request("GET", "/v1/orders", Some(&ctx.customer_auth()), None)
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["customer_id"], json!(ctx.customer.id));

    // The owner sees both
    let response = ctx
        .request("GET", "/v1/orders", Some(&ctx.owner_auth()), None)
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body.as_array().unwrap().len(), 2);

    ctx.cleanup().await.unwrap();
}

/// `/orders/mine` lists the caller's personal purchases for every role,
/// including owners who would otherwise see the whole store.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_own_orders_listing() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Mine", dec!(2.50), 10)
        .await
        .unwrap();

    let order_body = json!({
        "shipping_address": "1 Test Lane",
        "items": [{"product_id": product.id, "quantity": 1}]
    });
    for auth in [ctx.customer_auth(), ctx.owner_auth()] {
        let response = ctx
            .request("POST", "/v1/orders", Some(&auth), Some(order_body.clone()))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .request("GET", "/v1/orders/mine", Some(&ctx.customer_auth()), None)
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["customer_id"], json!(ctx.customer.id));

    // The owner's own listing holds only their purchase, not the store's
    let response = ctx
        .request("GET", "/v1/orders/mine", Some(&ctx.owner_auth()), None)
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_ne!(orders[0]["customer_id"], json!(ctx.customer.id));

    ctx.cleanup().await.unwrap();
}

/// Staff may only mutate orders that are unassigned or assigned to them;
/// owners assign staff and may touch anything in their store.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_staff_assignment_rules() {
    let ctx = TestContext::new().await.unwrap();
    let product = common::create_test_product(&ctx, "Handled", dec!(7.25), 10)
        .await
        .unwrap();

    let staff_a = common::create_test_user(&ctx.db, ctx.vendor.id, UserRole::Staff, "a")
        .await
        .unwrap();
    let staff_b = common::create_test_user(&ctx.db, ctx.vendor.id, UserRole::Staff, "b")
        .await
        .unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/orders",
            Some(&ctx.customer_auth()),
            Some(json!({
                "shipping_address": "1 Test Lane",
                "items": [{"product_id": product.id, "quantity": 1}]
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    // Unassigned: any staff may update the status
    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/orders/{order_id}/status"),
            Some(&format!("Bearer {}", ctx.token_for(&staff_a))),
            Some(json!({"status": "processing"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Owner assigns staff A
    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/orders/{order_id}/assign"),
            Some(&ctx.owner_auth()),
            Some(json!({"staff_id": staff_a.id})),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["assigned_staff_id"], json!(staff_a.id));

    // Staff B can no longer touch it
    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/orders/{order_id}/status"),
            Some(&format!("Bearer {}", ctx.token_for(&staff_b))),
            Some(json!({"status": "shipped"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff A still can
    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/orders/{order_id}/status"),
            Some(&format!("Bearer {}", ctx.token_for(&staff_a))),
            Some(json!({"status": "shipped"})),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "shipped");

    // Only owners assign staff
    let response = ctx
        .request(
            "PATCH",
            &format!("/v1/orders/{order_id}/assign"),
            Some(&format!("Bearer {}", ctx.token_for(&staff_a))),
            Some(json!({"staff_id": staff_b.id})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Registration creates the user (and customer profile), and the issued
/// login tokens authenticate against protected endpoints.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_register_login_roundtrip() {
    let ctx = TestContext::new().await.unwrap();
    let tag = uuid::Uuid::new_v4().simple().to_string();

    let response = ctx
        .request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "username": format!("shopper{tag}"),
                "email": format!("shopper-{tag}@example.com"),
                "password": "Str0ng!pass",
                "password_confirm": "Str0ng!pass",
                "vendor_id": ctx.vendor.id,
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["role"], "customer");
    assert!(body.get("password_hash").is_none(), "hash must not leak");

    let response = ctx
        .request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({
                "username": format!("shopper{tag}"),
                "password": "Str0ng!pass",
            })),
        )
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let access = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["token_type"], "bearer");

    let response = ctx
        .request("GET", "/v1/auth/me", Some(&format!("Bearer {access}")), None)
        .await;
    let (status, body) = common::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["username"], format!("shopper{tag}"));

    ctx.cleanup().await.unwrap();
}

/// Requests without credentials are rejected before reaching handlers.
#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_missing_token_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.request("GET", "/v1/orders", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = ctx
        .request("GET", "/v1/orders", Some("Bearer not-a-token"), None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}
