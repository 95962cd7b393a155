use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use log::*;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use domain::{PendingStateCache, Provider};
use service::config::Config;

pub use self::error::{Error, Result};

mod controller;
mod error;
mod extractors;
mod params;
mod response;
pub mod router;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub state_cache: PendingStateCache,
    pub provider: Arc<dyn Provider>,
}

impl AppState {
    pub fn new(config: Config, state_cache: PendingStateCache, provider: Arc<dyn Provider>) -> Self {
        Self {
            config,
            state_cache,
            provider,
        }
    }
}

/// Bind the configured interface and serve until `shutdown` resolves.
pub async fn init_server<F>(app_state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let server_url = format!("{}:{}", app_state.config.interface, app_state.config.port);
    let cors_layer = cors_layer(&app_state.config.allowed_origins);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(
        listener,
        router::define_routes(app_state)
            .layer(cors_layer)
            .into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    debug!("CORS allowed origins: {origins:?}");

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(origins)
}
