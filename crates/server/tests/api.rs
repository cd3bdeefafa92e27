use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();
    server::router(engine)
}

fn basic(username: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{username}:pw"));
    format!("Basic {token}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn signup(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({ "username": username, "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Group owned by alice with bob and carol. Returns the group id.
async fn setup_group(app: &Router) -> String {
    for name in ["alice", "bob", "carol"] {
        signup(app, name).await;
    }
    let (status, group) = send(
        app,
        "POST",
        "/groups",
        Some("alice"),
        Some(json!({ "name": "Trip" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = group["id"].as_str().unwrap().to_string();

    for name in ["bob", "carol"] {
        let (status, _) = send(
            app,
            "POST",
            &format!("/groups/{group_id}/members"),
            Some("alice"),
            Some(json!({ "username": name })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    group_id
}

#[tokio::test]
async fn health_is_public_and_the_rest_requires_auth() {
    let app = app().await;

    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/groups", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    signup(&app, "alice").await;
    let wrong = Request::builder()
        .uri("/groups")
        .header(
            header::AUTHORIZATION,
            format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode("alice:nope")
            ),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(wrong).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/groups", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"], json!([]));
}

#[tokio::test]
async fn expense_split_and_payment_settle_through_the_api() {
    let app = app().await;
    let group_id = setup_group(&app).await;

    let (status, expense) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some("alice"),
        Some(json!({ "description": "Dinner", "amount": "30.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["kind"], "expense");
    assert_eq!(expense["amount_minor"], 3000);
    let debts = expense["debts"].as_array().unwrap();
    assert_eq!(debts.len(), 2);
    assert!(debts.iter().all(|d| d["amount"] == "10.00"));

    let (status, balances) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/balances"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let owed_to_alice = &balances["balances"][0];
    assert_eq!(owed_to_alice["amount_minor"], 1000);
    let alice_id = owed_to_alice["other_user_id"].as_str().unwrap().to_string();

    let (status, payment) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/payments"),
        Some("bob"),
        Some(json!({ "paid_to": "alice", "amount": "10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["kind"], "payment");

    let (status, pair) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/balances/{alice_id}"),
        Some("bob"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pair["amount_minor"], 0);
    assert_eq!(pair["amount"], "0.00");

    let (status, list) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/transactions"),
        Some("carol"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = list["transactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tx| tx["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["payment", "expense"]);
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let app = app().await;
    let group_id = setup_group(&app).await;
    signup(&app, "mallory").await;

    let (status, expense) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some("alice"),
        Some(json!({ "description": "Dinner", "amount": "30.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_id = expense["id"].as_str().unwrap().to_string();

    // Not the creator.
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/groups/{group_id}/expenses/{tx_id}"),
        Some("bob"),
        Some(json!({ "amount": "1.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    // Not a member.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/transactions"),
        Some("mallory"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Payer outside the group.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/groups/{group_id}/expenses/{tx_id}"),
        Some("alice"),
        Some(json!({ "paid_by": "mallory" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Malformed amount.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/expenses"),
        Some("alice"),
        Some(json!({ "description": "Oops", "amount": "12.345" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Duplicate membership.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/groups/{group_id}/members"),
        Some("alice"),
        Some(json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unknown group.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{}/balances", uuid::Uuid::new_v4()),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Creator deletes; the transaction is gone afterwards.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/groups/{group_id}/transactions/{tx_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/transactions/{tx_id}"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn send_raw(
    app: &Router,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, basic("alice"));
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests_with_an_error_body() {
    let app = app().await;
    let group_id = setup_group(&app).await;
    let expenses = format!("/groups/{group_id}/expenses");

    let cases = [
        (Some("application/json"), "{\"description\": "),
        (Some("application/json"), "{\"description\": \"Dinner\"}"),
        (Some("application/json"), "{\"description\": \"Dinner\", \"amount\": 12}"),
        (Some("text/plain"), "{\"description\": \"Dinner\", \"amount\": \"12\"}"),
        (None, "{\"description\": \"Dinner\", \"amount\": \"12\"}"),
    ];
    for (content_type, body) in cases {
        let (status, error) = send_raw(&app, &expenses, content_type, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(error["error"].is_string(), "{body}");
    }

    // Nothing was recorded by the rejected requests.
    let (status, list) = send(
        &app,
        "GET",
        &format!("/groups/{group_id}/transactions"),
        Some("alice"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["transactions"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn spawned_server_answers_over_tcp() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db).build().await.unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = server::spawn_with_listener(engine, listener).unwrap();

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.ends_with("ok"), "{response}");
}
