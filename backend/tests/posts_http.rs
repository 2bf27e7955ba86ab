//! End-to-end behaviour of the `/posts` endpoints over the in-memory store.

use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use rstest::rstest;
use serde_json::{Value, json};
use userpost_api::domain::ports::RepositoryError;
use userpost_api::outbound::memory::InMemoryStrategy;
use userpost_api::test_support::test_app;

#[path = "support/http.rs"]
mod http;

use http::{memory_store, send, store_with};

fn create_user_request() -> actix_http::Request {
    TestRequest::post()
        .uri("/users")
        .set_json(json!({"name": "A", "email": "a@x.com"}))
        .to_request()
}

fn create_post_request(user_id: Value) -> actix_http::Request {
    TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "content": "First post", "user_id": user_id}))
        .to_request()
}

#[actix_web::test]
async fn create_then_fetch_returns_the_same_post() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    send(&app, create_user_request()).await;

    let created = send(&app, create_post_request(json!(1))).await;
    let fetched = send(&app, TestRequest::get().uri("/posts/1").to_request()).await;

    assert_eq!(created.status, StatusCode::CREATED);
    insta::assert_json_snapshot!("created_post", created.body);
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
}

#[actix_web::test]
async fn post_for_missing_owner_conflicts() {
    let app = actix_test::init_service(test_app(memory_store())).await;

    let reply = send(&app, create_post_request(json!(7))).await;
    let listed = send(&app, TestRequest::get().uri("/posts").to_request()).await;

    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body, json!({"error": "userID doesn't exist"}));
    assert_eq!(listed.body, json!([]));
}

#[actix_web::test]
async fn list_preserves_creation_order() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    send(&app, create_user_request()).await;
    for title in ["one", "two", "three"] {
        send(
            &app,
            TestRequest::post()
                .uri("/posts")
                .set_json(json!({"title": title, "content": "c", "user_id": 1}))
                .to_request(),
        )
        .await;
    }

    let listed = send(&app, TestRequest::get().uri("/posts").to_request()).await;

    let titles: Vec<&str> = listed
        .body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|post| post["title"].as_str())
        .collect();
    assert_eq!(titles, ["one", "two", "three"]);
}

#[actix_web::test]
async fn update_keeps_owner_and_replaces_text() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    send(&app, create_user_request()).await;
    send(&app, create_post_request(json!(1))).await;

    let updated = send(
        &app,
        TestRequest::put()
            .uri("/posts/1")
            .set_json(json!({"title": "Edited", "content": "Second draft", "user_id": 99}))
            .to_request(),
    )
    .await;

    assert_eq!(updated.status, StatusCode::OK);
    insta::assert_json_snapshot!("updated_post", updated.body);
}

#[rstest]
#[case(TestRequest::get())]
#[case(TestRequest::delete())]
#[case(TestRequest::put().set_json(json!({"title": "t", "content": "c"})))]
#[actix_web::test]
async fn unknown_post_is_not_found(#[case] request: TestRequest) {
    let app = actix_test::init_service(test_app(memory_store())).await;

    let reply = send(&app, request.uri("/posts/9").to_request()).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({"error": "post not found"}));
}

#[rstest]
#[case("/posts/-1")]
#[case("/posts/one")]
#[case("/posts/18446744073709551616")]
#[actix_web::test]
async fn malformed_ids_are_bad_requests(#[case] uri: &str) {
    let store = store_with(
        InMemoryStrategy::default().on_post_get_by_id(|_| panic!("storage reached")),
    );
    let app = actix_test::init_service(test_app(store)).await;

    let reply = send(&app, TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({"error": "invalid id"}));
}

#[actix_web::test]
async fn delete_then_fetch_is_not_found() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    send(&app, create_user_request()).await;
    send(&app, create_post_request(json!(1))).await;

    let deleted = send(&app, TestRequest::delete().uri("/posts/1").to_request()).await;
    let fetched = send(&app, TestRequest::get().uri("/posts/1").to_request()).await;

    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unavailable_store_is_503() {
    let store = store_with(
        InMemoryStrategy::default()
            .on_post_create(|_| Err(RepositoryError::unavailable("pool exhausted"))),
    );
    let app = actix_test::init_service(test_app(store)).await;

    let reply = send(&app, create_post_request(json!(1))).await;

    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.body, json!({"error": "service unavailable"}));
}
