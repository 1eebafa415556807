pub mod handlers;
pub mod routes;
pub mod state;

use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebConfig;
use state::AppState;

/// Binds the listener and serves the API plus the generated chart
/// artifacts until shutdown.
pub async fn run_server(
    web_config: WebConfig,
    app_state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifacts = ServeDir::new(&app_state.config.reports.output_dir);

    let app = routes::api_routes()
        .nest_service("/static", artifacts)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("{}:{}", web_config.host, web_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
