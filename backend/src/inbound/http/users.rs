//! Users API handlers.
//!
//! ```text
//! POST   /users       {"name":"Ada","email":"ada@example.com"}
//! GET    /users
//! GET    /users/{id}
//! PUT    /users/{id}  {"name":"Ada","email":"ada@example.com"}
//! DELETE /users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info};
use utoipa::ToSchema;

use crate::domain::{Error, NewUser, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::{ErrorBody, USERS, USER_UPDATE, map_store_error};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{bad_entity, decode_body, parse_id};
use crate::middleware::RequestContext;

/// Request body for creating or replacing a user.
///
/// Example JSON: `{"name":"Ada","email":"ada@example.com"}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UserPayload {
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
}

impl TryFrom<UserPayload> for NewUser {
    type Error = Error;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        NewUser::try_new(value.name, value.email).map_err(bad_entity)
    }
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Email already registered", body = ErrorBody),
        (status = 422, description = "Malformed body", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let span = ctx.handler_span("UserCreate");
    async move {
        let new_user = NewUser::try_from(decode_body::<UserPayload>(&body)?)?;
        let user = ctx
            .run_store(state.repository.user_create(&new_user))
            .await
            .map_err(|err| map_store_error(err, USERS))?;
        info!(user_id = user.id, "user created");
        Ok::<_, Error>(HttpResponse::Created().json(user))
    }
    .instrument(span)
    .await
}

/// List every user in creation order.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use userpost_api::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    ctx: RequestContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let span = ctx.handler_span("UserGetAll");
    async move {
        let users = ctx
            .run_store(state.repository.user_get_all())
            .await
            .map_err(|err| map_store_error(err, USERS))?;
        Ok::<_, Error>(web::Json(users))
    }
    .instrument(span)
    .await
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = u64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let span = ctx.handler_span("UserGetByID");
    async move {
        let id = parse_id(&path)?;
        let user = ctx
            .run_store(state.repository.user_get_by_id(id))
            .await
            .map_err(|err| map_store_error(err, USERS))?;
        Ok::<_, Error>(web::Json(user))
    }
    .instrument(span)
    .await
}

/// Replace a user's name and email. The path id wins over any id in the body.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = u64, Path, description = "User identifier")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 409, description = "Email used by another user", body = ErrorBody),
        (status = 422, description = "Malformed body", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<User>> {
    let span = ctx.handler_span("UserUpdateByID");
    async move {
        let fields = NewUser::try_from(decode_body::<UserPayload>(&body)?)?;
        let id = parse_id(&path)?;
        let user = ctx
            .run_store(state.repository.user_update(&fields.into_update(id)))
            .await
            .map_err(|err| map_store_error(err, USER_UPDATE))?;
        info!(user_id = user.id, "user updated");
        Ok::<_, Error>(web::Json(user))
    }
    .instrument(span)
    .await
}

/// Delete a user and the posts it owns.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = u64, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 503, description = "Store unavailable", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let span = ctx.handler_span("UserDeleteByID");
    async move {
        let id = parse_id(&path)?;
        ctx.run_store(state.repository.user_delete_by_id(id))
            .await
            .map_err(|err| map_store_error(err, USERS))?;
        info!(user_id = id, "user deleted");
        Ok::<_, Error>(HttpResponse::NoContent().finish())
    }
    .instrument(span)
    .await
}
