//! End-to-end behaviour of the `/users` endpoints over the in-memory store.

use actix_web::http::StatusCode;
use actix_web::test::{self as actix_test, TestRequest};
use rstest::rstest;
use serde_json::json;
use userpost_api::domain::ports::RepositoryError;
use userpost_api::outbound::memory::InMemoryStrategy;
use userpost_api::test_support::test_app;

#[path = "support/http.rs"]
mod http;

use http::{memory_store, send, store_with};

#[actix_web::test]
async fn create_then_fetch_returns_the_same_user() {
    let app = actix_test::init_service(test_app(memory_store())).await;

    let created = send(
        &app,
        TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "A", "email": "a@x.com"}))
            .to_request(),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    insta::assert_json_snapshot!("created_user", created.body);

    let fetched = send(&app, TestRequest::get().uri("/users/1").to_request()).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, created.body);
}

#[actix_web::test]
async fn duplicate_email_conflicts_and_leaves_store_unchanged() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    let payload = json!({"name": "A", "email": "a@x.com"});

    let first = send(
        &app,
        TestRequest::post().uri("/users").set_json(&payload).to_request(),
    )
    .await;
    let second = send(
        &app,
        TestRequest::post().uri("/users").set_json(&payload).to_request(),
    )
    .await;
    let listed = send(&app, TestRequest::get().uri("/users").to_request()).await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(second.status, StatusCode::CONFLICT);
    insta::assert_json_snapshot!("duplicate_email", second.body);
    assert_eq!(listed.body.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn empty_store_lists_no_users() {
    let app = actix_test::init_service(test_app(memory_store())).await;

    let listed = send(&app, TestRequest::get().uri("/users").to_request()).await;

    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body, json!([]));
}

#[rstest]
#[case(TestRequest::get())]
#[case(TestRequest::delete())]
#[case(TestRequest::put().set_json(json!({"name": "B", "email": "b@x.com"})))]
#[actix_web::test]
async fn unknown_id_is_not_found(#[case] request: TestRequest) {
    let app = actix_test::init_service(test_app(memory_store())).await;

    let reply = send(&app, request.uri("/users/42").to_request()).await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, json!({"error": "user not found"}));
}

#[rstest]
#[case(TestRequest::get())]
#[case(TestRequest::delete())]
#[case(TestRequest::put().set_json(json!({"name": "B", "email": "b@x.com"})))]
#[actix_web::test]
async fn non_numeric_id_is_rejected_before_storage(#[case] request: TestRequest) {
    let store = store_with(
        InMemoryStrategy::default()
            .on_user_get_by_id(|_| panic!("storage reached"))
            .on_user_delete_by_id(|_| panic!("storage reached"))
            .on_user_update(|_| panic!("storage reached")),
    );
    let app = actix_test::init_service(test_app(store)).await;

    let reply = send(&app, request.uri("/users/abc").to_request()).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body, json!({"error": "invalid id"}));
}

#[actix_web::test]
async fn update_replaces_fields_and_rejects_taken_email() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    for (name, email) in [("A", "a@x.com"), ("B", "b@x.com")] {
        send(
            &app,
            TestRequest::post()
                .uri("/users")
                .set_json(json!({"name": name, "email": email}))
                .to_request(),
        )
        .await;
    }

    let renamed = send(
        &app,
        TestRequest::put()
            .uri("/users/1")
            .set_json(json!({"name": "Ada", "email": "a@x.com"}))
            .to_request(),
    )
    .await;
    let clash = send(
        &app,
        TestRequest::put()
            .uri("/users/1")
            .set_json(json!({"name": "Ada", "email": "b@x.com"}))
            .to_request(),
    )
    .await;

    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body, json!({"id": 1, "name": "Ada", "email": "a@x.com"}));
    assert_eq!(clash.status, StatusCode::CONFLICT);
    assert_eq!(clash.body, json!({"error": "email already in use"}));
}

#[actix_web::test]
async fn delete_removes_user_and_owned_posts() {
    let app = actix_test::init_service(test_app(memory_store())).await;
    send(
        &app,
        TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "A", "email": "a@x.com"}))
            .to_request(),
    )
    .await;
    send(
        &app,
        TestRequest::post()
            .uri("/posts")
            .set_json(json!({"title": "t", "content": "c", "user_id": 1}))
            .to_request(),
    )
    .await;

    let deleted = send(&app, TestRequest::delete().uri("/users/1").to_request()).await;
    let posts = send(&app, TestRequest::get().uri("/posts").to_request()).await;

    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(deleted.body, serde_json::Value::Null);
    assert_eq!(posts.body, json!([]));
}

#[actix_web::test]
async fn unavailable_store_is_503() {
    let store = store_with(
        InMemoryStrategy::default()
            .on_user_get_all(|()| Err(RepositoryError::unavailable("connection refused"))),
    );
    let app = actix_test::init_service(test_app(store)).await;

    let reply = send(&app, TestRequest::get().uri("/users").to_request()).await;

    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(reply.body, json!({"error": "service unavailable"}));
}

#[rstest]
#[case(json!({"name": "A"}))]
#[case(json!({"name": "", "email": "a@x.com"}))]
#[case(json!({"name": "A", "email": "not-an-email"}))]
#[actix_web::test]
async fn invalid_bodies_are_unprocessable(#[case] payload: serde_json::Value) {
    let app = actix_test::init_service(test_app(memory_store())).await;

    let reply = send(
        &app,
        TestRequest::post().uri("/users").set_json(payload).to_request(),
    )
    .await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(reply.body, json!({"error": "bad entity"}));
}
