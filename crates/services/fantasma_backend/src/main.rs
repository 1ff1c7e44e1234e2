// File: crates/services/fantasma_backend/src/main.rs
mod service_factory;

use axum::{routing::get, Router};
use fantasma_common::logging;
use fantasma_common::services::ServiceFactory;
use fantasma_config::load_config;
use fantasma_gcal::routes as gcal_routes;
use service_factory::FantasmaServiceFactory;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let factory = FantasmaServiceFactory::new(config.clone()).await;

    let mut api_router = Router::new().route(
        "/",
        get(|| async { "Welcome to the Fantasma booking API!" }),
    );

    match factory.calendar_service() {
        Some(calendar) => {
            match gcal_routes::routes(config.clone(), calendar, factory.notification_service()) {
                Ok(router) => {
                    api_router = api_router.merge(router);
                }
                Err(e) => error!("Failed to set up booking routes: {}", e),
            }
        }
        None => warn!("Calendar service unavailable; booking routes not mounted."),
    }

    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use fantasma_gcal::doc::GcalApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        info!("Adding Swagger UI at /api/docs");
        let swagger_ui =
            SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", GcalApiDoc::openapi());
        app = app.merge(swagger_ui);
    }

    // Serve the built marketing site next to the API in dev mode
    if cfg!(debug_assertions) {
        info!("Running in development mode, serving static files from ../dist");
        app = app.fallback_service(ServeDir::new("../dist"));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind address");
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
