use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::api::balloon as balloon_handlers;
use super::api::health as health_handlers;
use super::api::history as history_handlers;
use super::api::weather as weather_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(health_handlers::health))
        .route("/api/balloon", get(balloon_handlers::get_balloon))
        .route("/api/history", get(history_handlers::get_history))
        .route("/api/trajectories", get(history_handlers::get_trajectories))
        .route("/api/weather", get(weather_handlers::get_weather))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Front end
    if let Some(dir) = &state.config.web.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    let state = AppState::from_config(config).map_err(std::io::Error::other)?;
    let app = build_router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}
