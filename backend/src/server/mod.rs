//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::time::Duration;

use actix_web::body::BoxBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use userpost_api::RequestLogging;
use userpost_api::doc::ApiDoc;
use userpost_api::inbound::http::configure;
use userpost_api::inbound::http::state::HttpState;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    dev_mode: bool,
    store_timeout: Duration,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        dev_mode,
        store_timeout,
    } = deps;

    let mut app = App::new()
        .app_data(http_state)
        .wrap(RequestLogging::default().with_store_timeout(store_timeout))
        .configure(configure);

    if dev_mode {
        app = app.service(
            SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    app
}

/// Construct an Actix HTTP server from `config`.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        repository,
        dev_mode,
        store_timeout,
    } = config;
    let http_state = web::Data::new(HttpState::new(repository));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            dev_mode,
            store_timeout,
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, dev_mode, "listening");
    Ok(server)
}
