use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use hearth::server::router;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::support::*;

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn app() -> (Router, Arc<Network<Backend>>) {
    let network = backend_network().await;
    (router(network.clone()), network)
}

#[tokio::test]
async fn health_and_users() {
    let (app, _) = app().await;
    assert_eq!(send(&app, "GET", "/health", None).await, (StatusCode::OK, json!("ok")));

    let (status, users) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[1]["name"], "Bob");
    assert_eq!(users[1]["friendRequests"], json!([]));
}

#[tokio::test]
async fn create_post_and_read_it_back() {
    let (app, _) = app().await;
    let (status, post) = send(
        &app,
        "POST",
        "/posts",
        Some(json!({"userId": ALICE, "text": "hello http", "privacy": "friends"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["author"], "Alice");
    assert_eq!(post["privacy"], "friends");
    assert_eq!(post["likes"], json!([]));

    let (_, own) = send(&app, "GET", "/posts?userId=1", None).await;
    assert_eq!(own.as_array().map(Vec::len), Some(1));
    let (_, stranger) = send(&app, "GET", "/posts?userId=3", None).await;
    assert_eq!(stranger, json!([]));
    let (status, garbage) = send(&app, "GET", "/posts?userId=abc", None).await;
    assert_eq!((status, garbage), (StatusCode::OK, json!([])));
    let (_, missing) = send(&app, "GET", "/posts", None).await;
    assert_eq!(missing, json!([]));
}

#[tokio::test]
async fn create_post_rejects_unknown_user_and_bad_input() {
    let (app, network) = app().await;

    let (status, body) = send(&app, "POST", "/posts", Some(json!({"userId": 99, "text": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "User not found"}));

    let (status, _) = send(&app, "POST", "/posts", Some(json!({"userId": ALICE, "text": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/posts",
        Some(json!({"userId": ALICE, "text": "hi", "privacy": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("privacy")));

    assert!(network.snapshot().await.posts.is_empty());
}

#[tokio::test]
async fn react_and_comment_status_codes() {
    let (app, network) = app().await;
    let post_id = post_id_of(network.as_ref(), ALICE, "react to me").await;

    let (status, body) = send(&app, "POST", "/posts/123/react", Some(json!({"userId": BOB, "type": "like"}))).await;
    assert_eq!((status, body), (StatusCode::NOT_FOUND, json!({"message": "Post not found"})));

    let uri = format!("/posts/{post_id}/react");
    let (status, _) = send(&app, "POST", &uri, Some(json!({"userId": 99, "type": "like"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "POST", &uri, Some(json!({"userId": BOB, "type": "meh"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, post) = send(&app, "POST", &uri, Some(json!({"userId": BOB, "type": "love"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["likes"], json!([{"userId": BOB, "type": "love"}]));

    let uri = format!("/posts/{post_id}/comment");
    let (status, comment) = send(&app, "POST", &uri, Some(json!({"userId": CHARLIE, "text": "wow"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["author"], "Charlie");
    let (status, _) = send(&app, "POST", &uri, Some(json!({"userId": CHARLIE, "text": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "POST", &uri, Some(json!({"userId": 99, "text": "hi"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "POST", "/posts/5/comment", Some(json!({"userId": BOB, "text": "hi"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, notifications) = send(&app, "GET", "/notifications/1", None).await;
    let kinds: Vec<_> = notifications
        .as_array()
        .expect("array")
        .iter()
        .map(|n| n["type"].clone())
        .collect();
    assert_eq!(kinds, vec![json!("reaction"), json!("comment")]);
}

#[tokio::test]
async fn malformed_requests_get_json_bad_request() {
    let (app, network) = app().await;

    let (status, body) = send(&app, "POST", "/posts", Some(json!({"userId": ALICE}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("text")), "{body}");

    let (status, body) = send(&app, "POST", "/users/2/friend-request", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("fromUserId")), "{body}");

    let (status, body) = send(&app, "POST", "/posts/abc/react", Some(json!({"userId": BOB, "type": "like"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");

    let (status, body) = send(&app, "POST", "/users/1/remove-friend", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");

    assert!(network.snapshot().await.posts.is_empty());
    assert!(network.user(BOB).await.expect("bob").friend_requests.is_empty());
}

#[tokio::test]
async fn crossing_requests_over_http_stay_pending() {
    let (app, network) = app().await;
    send(&app, "POST", "/users/2/friend-request", Some(json!({"fromUserId": ALICE}))).await;
    let (_, body) = send(&app, "POST", "/users/1/friend-request", Some(json!({"fromUserId": BOB}))).await;
    assert_eq!(body, json!({"message": "Request sent"}));
    assert_ne!(network.relationship(ALICE, BOB).await.expect("rel"), Relationship::Friends);
}

#[tokio::test]
async fn friend_routes_walk_the_whole_lifecycle() {
    let (app, network) = app().await;

    let (status, body) = send(&app, "POST", "/users/2/friend-request", Some(json!({"fromUserId": ALICE}))).await;
    assert_eq!((status, body), (StatusCode::OK, json!({"message": "Request sent"})));

    let (_, body) = send(&app, "POST", "/users/2/accept-friend", Some(json!({"fromUserId": ALICE}))).await;
    assert_eq!(body, json!({"message": "Friend added"}));
    assert_eq!(network.relationship(ALICE, BOB).await.expect("rel"), Relationship::Friends);

    let (_, body) = send(&app, "POST", "/users/2/remove-friend", Some(json!({"friendId": ALICE}))).await;
    assert_eq!(body, json!({"message": "Friend removed"}));

    send(&app, "POST", "/users/3/friend-request", Some(json!({"fromUserId": ALICE}))).await;
    let (_, body) = send(&app, "POST", "/users/3/cancel-request", Some(json!({"fromUserId": ALICE}))).await;
    assert_eq!(body, json!({"message": "Request canceled"}));

    send(&app, "POST", "/users/1/friend-request", Some(json!({"fromUserId": CHARLIE}))).await;
    let (_, body) = send(&app, "POST", "/users/1/delete-request", Some(json!({"fromUserId": CHARLIE}))).await;
    assert_eq!(body, json!({"message": "Request deleted"}));

    let (_, users) = send(&app, "GET", "/users", None).await;
    for user in users.as_array().expect("array") {
        assert_eq!(user["friends"], json!([]));
        assert_eq!(user["friendRequests"], json!([]));
    }
}

#[tokio::test]
async fn friend_routes_report_unknown_users() {
    let (app, _) = app().await;
    for (route, body) in [
        ("/users/42/friend-request", json!({"fromUserId": ALICE})),
        ("/users/42/accept-friend", json!({"fromUserId": ALICE})),
        ("/users/42/cancel-request", json!({"fromUserId": ALICE})),
        ("/users/42/remove-friend", json!({"friendId": ALICE})),
        ("/users/42/delete-request", json!({"fromUserId": ALICE})),
        ("/users/1/accept-friend", json!({"fromUserId": 42})),
    ] {
        let (status, body) = send(&app, "POST", route, Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{route}");
        assert_eq!(body, json!({"message": "User not found"}));
    }
}

#[tokio::test]
async fn routes_publish_to_observers() {
    let (app, network) = app().await;
    let mut observer = network.subscribe();

    send(&app, "POST", "/users/3/friend-request", Some(json!({"fromUserId": BOB}))).await;
    send(&app, "POST", "/users/3/delete-request", Some(json!({"fromUserId": BOB}))).await;

    assert_eq!(drain(&mut observer), vec![Event::FriendRequest { to: CHARLIE }]);
}
