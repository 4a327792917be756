//! Tsudoi session hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tsudoi-server
//! cargo run --bin tsudoi-server -- --host 0.0.0.0 --port 3001 --storage-dir ./data
//! ```

use std::{path::PathBuf, sync::Arc};

use axum::http::HeaderValue;
use clap::Parser;
use tsudoi_server::{
    domain::{DocumentStore, IdentityResolver},
    infrastructure::{
        identity::{InMemoryUserDirectory, JwtIdentityResolver},
        store::{InMemoryDocumentStore, JsonFileDocumentStore},
    },
    ui::{AppState, Server},
};
use tsudoi_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "tsudoi-server")]
#[command(about = "Real-time collaborative room hub", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TSUDOI_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TSUDOI_PORT", default_value = "3001")]
    port: u16,

    /// Secret for verifying HS256 access tokens. Without it every connection is a guest.
    #[arg(long, env = "TSUDOI_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// JSON file with the user profiles tokens are resolved against
    #[arg(long, env = "TSUDOI_USERS_FILE")]
    users_file: Option<PathBuf>,

    /// Directory for saved documents. Documents are kept in memory when omitted.
    #[arg(long, env = "TSUDOI_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Origin allowed to call the HTTP API from a browser
    #[arg(long, env = "TSUDOI_FRONTEND_URL", default_value = "http://localhost:5173")]
    frontend_url: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // 1. Document store
    let store: Arc<dyn DocumentStore> = match &args.storage_dir {
        Some(dir) => {
            tracing::info!("Saving documents under {}", dir.display());
            Arc::new(JsonFileDocumentStore::open(dir).await?)
        }
        None => {
            tracing::warn!("No storage directory configured, documents are kept in memory only");
            Arc::new(InMemoryDocumentStore::new())
        }
    };

    // 2. Identity resolver
    let resolver: Option<Arc<dyn IdentityResolver>> = match &args.jwt_secret {
        Some(secret) => {
            let directory = match &args.users_file {
                Some(path) => InMemoryUserDirectory::from_json_file(path).await?,
                None => {
                    tracing::warn!("No users file configured, every token subject is unknown");
                    InMemoryUserDirectory::default()
                }
            };
            let resolver: Arc<dyn IdentityResolver> =
                Arc::new(JwtIdentityResolver::new(secret, Arc::new(directory)));
            Some(resolver)
        }
        None => {
            tracing::info!("Authentication disabled, all connections join as guests");
            None
        }
    };

    // 3. UseCases and server
    let state = AppState::assemble(store, resolver, Arc::new(SystemClock));
    let origin = HeaderValue::from_str(&args.frontend_url)?;
    Server::new(state)
        .with_allowed_origin(origin)
        .run(args.host, args.port)
        .await
}
