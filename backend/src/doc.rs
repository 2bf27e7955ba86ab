//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint together with the payload and
//! response schemas. Swagger UI serves it in development mode only.

use utoipa::OpenApi;

use crate::domain::{Post, User};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::posts::{PostPayload, PostUpdatePayload};
use crate::inbound::http::users::UserPayload;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users and posts API",
        description = "CRUD over users and their posts, with correlated request logging."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::health_check,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
    ),
    components(schemas(
        User,
        Post,
        UserPayload,
        PostPayload,
        PostUpdatePayload,
        ErrorBody,
        HealthStatus
    )),
    tags(
        (name = "users", description = "Operations on users"),
        (name = "posts", description = "Operations on posts"),
        (name = "health", description = "Liveness of the service and its store")
    )
)]
pub struct ApiDoc;
