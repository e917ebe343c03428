//! HTTP router tests over the in-memory store

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bibliotheca_server::{api, repository::MemoryStore, AppConfig, AppState};

fn app() -> Router {
    let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()));
    api::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_loan_flow_over_http() {
    let app = app();

    let (status, book) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(json!({ "id": 1, "title": "X", "shelf": "A-1", "total_copies": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["available_copies"], 2);

    let (status, loan) = send(
        &app,
        Method::POST,
        "/api/v1/loans",
        Some(json!({
            "book_id": 1,
            "borrower": "Ana",
            "borrower_group": "7B",
            "loan_date": "03/01/2025",
            "due_date": "2025-01-10"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["status"], "OPEN");
    assert_eq!(loan["due_date"], "2025-01-10");
    assert_eq!(loan["display"]["due_date"], "10/01/2025");
    assert_eq!(loan["display"]["return_date"], "-");
    let loan_id = loan["id"].as_i64().unwrap();

    let (_, book) = send(&app, Method::GET, "/api/v1/books/1", None).await;
    assert_eq!(book["available_copies"], 1);

    let (status, overdue) =
        send(&app, Method::GET, "/api/v1/loans/overdue?as_of=11/01/2025", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overdue.as_array().unwrap().len(), 1);
    assert_eq!(overdue[0]["book_title"], "X");
    assert_eq!(overdue[0]["book_shelf"], "A-1");
    assert_eq!(overdue[0]["is_overdue"], true);

    let uri = format!("/api/v1/loans/{}/return", loan_id);
    let (status, returned) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "returned");
    assert_eq!(returned["loan"]["status"], "RETURNED");
    assert_ne!(returned["loan"]["display"]["return_date"], "-");

    let (status, err) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "LoanAlreadyReturned");

    let (_, open) = send(&app, Method::GET, "/api/v1/loans", None).await;
    assert!(open.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_domain_errors_over_http() {
    let app = app();

    let (status, err) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(json!({ "title": " ", "total_copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "Title is required");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/loans",
        Some(json!({ "book_id": 404, "borrower": "Ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(json!({ "id": 2, "title": "Solo", "total_copies": 1 })),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(json!({ "id": 2, "title": "Again", "total_copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let lend = json!({ "book_id": 2, "borrower": "Ana" });
    let (status, _) = send(&app, Method::POST, "/api/v1/loans", Some(lend.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, err) = send(&app, Method::POST, "/api/v1/loans", Some(lend)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"], "BookNotAvailable");

    let (status, _) = send(&app, Method::GET, "/api/v1/loans/overdue?as_of=someday", None).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_catalog_crud_over_http() {
    let app = app();

    for (title, author) in [("Dune", "Herbert"), ("Emma", "Austen"), ("Persuasion", "Austen")] {
        send(
            &app,
            Method::POST,
            "/api/v1/books",
            Some(json!({ "title": title, "author": author, "total_copies": 1 })),
        )
        .await;
    }

    let (_, found) = send(&app, Method::GET, "/api/v1/books?q=austen", None).await;
    let titles: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Emma", "Persuasion"]);

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/v1/books/1",
        Some(json!({ "total_copies": 4, "available_copies": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["total_copies"], 4);
    assert_eq!(updated["available_copies"], 4);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, "/api/v1/books/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/v1/books/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/v1/books/1/loans", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = send(&app, Method::GET, "/api/v1/stats", None).await;
    assert_eq!(stats["total_books"], 2);
}
