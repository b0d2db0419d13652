// Filtering wired into an Axum handler through Query<RequestParams>

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    routing::get,
};
use filterable::{FilterError, NoPreFilter, RequestParams, fetch_all};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::{
    OrderFilters, order_entity, order_filters, order_filters_with_search, seed_orders,
    setup_test_db,
};

#[derive(Clone)]
struct AppState {
    db: DatabaseConnection,
    filters: Arc<OrderFilters>,
}

async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<RequestParams>,
) -> Result<Json<Vec<order_entity::Model>>, FilterError> {
    let orders = fetch_all(&state.db, &*state.filters, &params, NoPreFilter).await?;
    Ok(Json(orders))
}

async fn setup_app(filters: OrderFilters) -> Router {
    let db = setup_test_db().await.expect("Failed to setup test database");
    seed_orders(&db).await.expect("Failed to seed orders");

    Router::new().route("/orders", get(list_orders)).with_state(AppState {
        db,
        filters: Arc::new(filters),
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn names(body: &serde_json::Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|order| order["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_query_string_drives_filters_and_sort() {
    let app = setup_app(order_filters()).await;

    let (status, body) = get_json(app, "/orders?status=active&order_by=name").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Bob", "Charlie"]);
}

#[tokio::test]
async fn test_shared_direction_applies_to_every_request() {
    let filters = order_filters();
    filters.set_direction("desc").unwrap();
    let app = setup_app(filters).await;

    let (status, body) = get_json(app.clone(), "/orders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Dave", "Bob", "Alice", "Charlie"]);

    let (_, body) = get_json(app, "/orders?order_by=name").await;
    assert_eq!(names(&body), vec!["Dave", "Charlie", "Bob", "Alice"]);
}

#[tokio::test]
async fn test_missing_default_sort_is_internal_error() {
    let app = setup_app(OrderFilters::new()).await;

    let (status, body) = get_json(app, "/orders").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to apply filters");
}

#[tokio::test]
async fn test_oversized_search_is_bad_request() {
    let app = setup_app(order_filters_with_search()).await;
    let uri = format!("/orders?q={}", "a".repeat(10_001));

    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("'q'"));
}
