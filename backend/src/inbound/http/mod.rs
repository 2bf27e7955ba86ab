//! HTTP inbound adapter exposing the REST endpoints.

use actix_web::web;

use crate::middleware::request_logging::DEFAULT_BODY_LIMIT;

pub mod error;
pub mod health;
pub mod posts;
pub mod state;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;

/// Register every endpoint on `cfg`, with the body size limit the logging
/// middleware enforces.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use userpost_api::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(DEFAULT_BODY_LIMIT))
        .service(health::health_check)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(posts::create_post)
        .service(posts::list_posts)
        .service(posts::get_post)
        .service(posts::update_post)
        .service(posts::delete_post);
}
