//! Posts API handlers.
//!
//! A post's owner is fixed when it is created; `PUT /posts/{id}` replaces
//! only the title and content and ignores any `user_id` in the body.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info};
use utoipa::ToSchema;

use crate::domain::{Error, NewPost, Post, PostFields};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{ErrorBody, POSTS, map_store_error};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{bad_entity, decode_body, parse_id};
use crate::middleware::RequestContext;

/// Request body for creating a post.
///
/// Example JSON: `{"title":"Hello","content":"First post","user_id":1}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PostPayload {
    #[schema(example = "Hello")]
    pub title: String,
    #[schema(example = "First post")]
    pub content: String,
    #[schema(example = 1)]
    pub user_id: u64,
}

/// Request body for replacing a post's text.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PostUpdatePayload {
    #[schema(example = "Hello again")]
    pub title: String,
    #[schema(example = "Edited")]
    pub content: String,
}

impl TryFrom<PostPayload> for NewPost {
    type Error = Error;

    fn try_from(value: PostPayload) -> Result<Self, Self::Error> {
        NewPost::try_new(value.title, value.content, value.user_id).map_err(bad_entity)
    }
}

impl TryFrom<PostUpdatePayload> for PostFields {
    type Error = Error;

    fn try_from(value: PostUpdatePayload) -> Result<Self, Self::Error> {
        PostFields::try_new(value.title, value.content).map_err(bad_entity)
    }
}

/// Create a post for an existing user.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostPayload,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 409, description = "Owner does not exist", body = ErrorBody),
        (status = 422, description = "Malformed body", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let span = ctx.handler_span("PostCreate");
    async move {
        let new_post = NewPost::try_from(decode_body::<PostPayload>(&body)?)?;
        let post = ctx
            .run_store(state.repository.post_create(&new_post))
            .await
            .map_err(|err| map_store_error(err, POSTS))?;
        info!(post_id = post.id, user_id = post.user_id, "post created");
        Ok::<_, Error>(HttpResponse::Created().json(post))
    }
    .instrument(span)
    .await
}

/// List every post in creation order.
#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "All posts", body = [Post]),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    ctx: RequestContext,
) -> ApiResult<web::Json<Vec<Post>>> {
    let span = ctx.handler_span("PostGetAll");
    async move {
        let posts = ctx
            .run_store(state.repository.post_get_all())
            .await
            .map_err(|err| map_store_error(err, POSTS))?;
        Ok::<_, Error>(web::Json(posts))
    }
    .instrument(span)
    .await
}

/// Fetch one post.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = u64, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/posts/{id}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Post>> {
    let span = ctx.handler_span("PostGetByID");
    async move {
        let id = parse_id(&path)?;
        let post = ctx
            .run_store(state.repository.post_get_by_id(id))
            .await
            .map_err(|err| map_store_error(err, POSTS))?;
        Ok::<_, Error>(web::Json(post))
    }
    .instrument(span)
    .await
}

/// Replace a post's title and content.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = u64, Path, description = "Post identifier")),
    request_body = PostUpdatePayload,
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
        (status = 409, description = "Owner no longer exists", body = ErrorBody),
        (status = 422, description = "Malformed body", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[put("/posts/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Post>> {
    let span = ctx.handler_span("PostUpdateByID");
    async move {
        let fields = PostFields::try_from(decode_body::<PostUpdatePayload>(&body)?)?;
        let id = parse_id(&path)?;
        let post = ctx
            .run_store(state.repository.post_update(&fields.into_update(id)))
            .await
            .map_err(|err| map_store_error(err, POSTS))?;
        info!(post_id = post.id, "post updated");
        Ok::<_, Error>(web::Json(post))
    }
    .instrument(span)
    .await
}

/// Delete a post.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = u64, Path, description = "Post identifier")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let span = ctx.handler_span("PostDeleteByID");
    async move {
        let id = parse_id(&path)?;
        ctx.run_store(state.repository.post_delete_by_id(id))
            .await
            .map_err(|err| map_store_error(err, POSTS))?;
        info!(post_id = id, "post deleted");
        Ok::<_, Error>(HttpResponse::NoContent().finish())
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::ports::MockDbRepository;
    use crate::test_support::test_app;

    #[rstest]
    #[case(json!({"title": "t", "content": "c"}))]
    #[case(json!({"title": "t", "content": "c", "user_id": 0}))]
    #[case(json!({"title": "t", "content": "c", "user_id": -4}))]
    #[case(json!({"title": "", "content": "c", "user_id": 1}))]
    #[actix_web::test]
    async fn create_rejects_invalid_bodies_without_storage(#[case] payload: Value) {
        let mut repo = MockDbRepository::new();
        repo.expect_post_create().never();
        let app = actix_test::init_service(test_app(Arc::new(repo))).await;
        let request = actix_test::TestRequest::post()
            .uri("/posts")
            .set_json(payload)
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body, json!({"error": "bad entity"}));
    }

    #[actix_web::test]
    async fn update_ignores_owner_in_body() {
        let mut repo = MockDbRepository::new();
        repo.expect_post_update()
            .withf(|update| update.id() == 3 && update.title() == "new")
            .times(1)
            .returning(|update| {
                Ok(crate::domain::Post {
                    id: update.id(),
                    title: update.title().to_owned(),
                    content: update.content().to_owned(),
                    user_id: 1,
                })
            });
        let app = actix_test::init_service(test_app(Arc::new(repo))).await;
        let request = actix_test::TestRequest::put()
            .uri("/posts/3")
            .set_json(json!({"title": "new", "content": "body", "user_id": 99}))
            .to_request();

        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["user_id"], json!(1));
    }

    #[actix_web::test]
    async fn malformed_post_id_is_400() {
        let mut repo = MockDbRepository::new();
        repo.expect_post_get_by_id().never();
        let app = actix_test::init_service(test_app(Arc::new(repo))).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/posts/1e3").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
