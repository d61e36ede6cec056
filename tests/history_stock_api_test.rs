mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{item_payload, response_json, TestApp};

async fn history_page(app: &TestApp, page: usize) -> Value {
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/history?page={}", page),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await["data"].clone()
}

#[tokio::test]
async fn history_is_paginated_by_25() {
    let app = TestApp::new().await;
    let item = app.create_item(item_payload("Napkins", "Salon", 1)).await;
    let id = item["id"].as_str().expect("id").to_string();

    // 1 creation + 59 increases
    for quantity in 2..=60 {
        let response = app
            .request_authenticated(
                Method::PUT,
                &format!("/api/v1/items/{}", id),
                Some(json!({
                    "name": "Napkins",
                    "quantity": quantity,
                    "category": "Divers",
                    "location": "Salon"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let first = history_page(&app, 1).await;
    assert_eq!(first["total_items"], 60);
    assert_eq!(first["total_pages"], 3);
    assert_eq!(first["rows"].as_array().map(Vec::len), Some(25));
    assert_eq!(first["rows"][0]["transition"], "(59 → 60)");
    assert_eq!(
        first["pages"],
        json!([
            { "kind": "number", "page": 1 },
            { "kind": "number", "page": 2 },
            { "kind": "number", "page": 3 }
        ])
    );

    let last = history_page(&app, 3).await;
    assert_eq!(last["rows"].as_array().map(Vec::len), Some(10));
    assert_eq!(last["rows"][9]["label"], "Created");

    let beyond = history_page(&app, 4).await;
    assert_eq!(beyond["rows"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn stock_overview_and_dialog() {
    let app = TestApp::new().await;
    app.create_item(item_payload("Vase", "Salon", 1)).await;
    let soap = app
        .create_item(json!({
            "name": "Soap",
            "quantity": 1,
            "category": "Salle de bain",
            "location": "Salle de bain",
            "stock_management_enabled": true,
            "min_stock": 2,
            "optimal_stock": 5
        }))
        .await;
    let id = soap["id"].as_str().expect("id").to_string();

    let response = app.request(Method::GET, "/api/v1/stock", None, None).await;
    let body = response_json(response).await;
    let cards = body["data"].as_array().expect("cards");
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["label"], "Critical stock");
    assert_eq!(cards[0]["progress"], 20.0);

    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/stock/{}", id),
            Some(json!({ "min_stock": 2, "optimal_stock": 5, "quantity": 5 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "normal");
    assert_eq!(body["data"]["color"], "green");

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/stock/{}/remove", id),
            Some(json!({ "quantity": 6 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/stock/{}/remove", id),
            Some(json!({ "quantity": 2, "note": "guests" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["data"]["quantity"], 3);
}
