//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Collaborative session hub server
///
/// # Example
///
/// ```ignore
/// let state = AppState::assemble(store, resolver, Arc::new(SystemClock));
/// Server::new(state)
///     .with_allowed_origin(HeaderValue::from_static("http://localhost:5173"))
///     .run("127.0.0.1".to_string(), 3001)
///     .await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    /// CORS で許可するフロントエンドのオリジン
    allowed_origin: Option<HeaderValue>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
            allowed_origin: None,
        }
    }

    pub fn with_allowed_origin(mut self, origin: HeaderValue) -> Self {
        self.allowed_origin = Some(origin);
        self
    }

    pub fn router(&self) -> Router {
        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        match &self.allowed_origin {
            Some(origin) => app.layer(
                CorsLayer::new()
                    .allow_origin(origin.clone())
                    .allow_methods([Method::GET])
                    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
                    .allow_credentials(true),
            ),
            None => app,
        }
    }

    /// Run the server until Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Session hub listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves, then
    /// flush pending document saves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.state.persistence.shutdown().await;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
