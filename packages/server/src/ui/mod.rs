//! Network surface: axum router, WebSocket endpoint and HTTP API.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use signal::shutdown_signal;
pub use state::AppState;
