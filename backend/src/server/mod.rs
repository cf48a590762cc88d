//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use rest_auth::Trace;
#[cfg(debug_assertions)]
use rest_auth::doc::ApiDoc;
use rest_auth::inbound::http::health::{HealthState, live, ready};
use rest_auth::inbound::http::pages::AuthViews;
use rest_auth::inbound::http::session_config::SessionSettings;
use rest_auth::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    views: web::Data<AuthViews>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        views,
        session,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(views)
        .wrap(session.middleware())
        .wrap(Trace)
        .configure(rest_auth::inbound::http::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The administrator account is ensured and the page templates are checked
/// before the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when bootstrapping the stores, binding the
/// socket or starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(
        build_http_state(&config)
            .await
            .map_err(|err| std::io::Error::other(format!("state setup failed: {err}")))?,
    );
    let ServerConfig {
        session,
        bind_addr,
        views,
        ..
    } = config;
    let views = web::Data::new(
        AuthViews::html(views)
            .map_err(|err| std::io::Error::other(format!("template setup failed: {err}")))?,
    );

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            views: views.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Fail the liveness probe once an interrupt arrives, so orchestrators stop
/// routing to the process while actix drains in-flight requests.
pub fn drain_on_interrupt(health_state: web::Data<HealthState>) {
    actix_web::rt::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                health_state.mark_unhealthy();
                info!("interrupt received; liveness now failing");
            }
            Err(err) => warn!(error = %err, "interrupt listener unavailable"),
        }
    });
}
