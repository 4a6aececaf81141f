//! Deadline propagation demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ TraceLayer ──▶ RequestTimeoutLayer ──▶ handler
//!                                      (opens scope)            │
//!                                                               ▼
//!                                                    Intercepted<Store>
//!                                                    exec_query: check
//!                                                    commit: clear
//!     ◀──────────────  200 / 504 Gateway Timeout  ◀─────────────┘
//! ```
//!
//! `GET /rows?delay_ms=N` waits N milliseconds before querying, so any delay
//! past the configured budget answers 504. `POST /rows` inserts, commits, and
//! reads back; the read after the commit is never cut short.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use request_deadline::config::{load_config, DeadlineConfig};
use request_deadline::hooks::database::{self, COMMIT, QUERY};
use request_deadline::middleware::RequestTimeoutLayer;
use request_deadline::observability::init_logging;
use request_deadline::{time_remaining, Intercepted, Interceptable, InterceptionRegistry, TimeoutExceeded, Validation};

#[derive(Parser)]
#[command(name = "deadline-demo")]
#[command(about = "Serve a small app behind per-request deadlines", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// In-memory table standing in for a database connection.
#[derive(Debug, Default)]
struct Store {
    rows: Mutex<Vec<String>>,
    pending: Mutex<Vec<String>>,
}

impl Store {
    fn exec_query(&self) -> Vec<String> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn insert(&self, row: String) {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).push(row);
    }

    fn commit_db_transaction(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).append(&mut pending);
    }
}

impl Interceptable for Store {
    const OPERATIONS: &'static [&'static str] = &[QUERY, COMMIT, "insert"];
}

type AppState = Arc<Intercepted<Store>>;

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    delay_ms: u64,
}

async fn list_rows(
    State(store): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<String>>, TimeoutExceeded> {
    tokio::time::sleep(Duration::from_millis(params.delay_ms)).await;
    tracing::debug!(remaining = ?time_remaining(), "Querying rows");
    Ok(Json(store.invoke_ref(QUERY, Store::exec_query)?))
}

async fn add_row(State(store): State<AppState>, row: String) -> Result<Json<Vec<String>>, TimeoutExceeded> {
    store.inner().insert(row);
    store.invoke_ref(COMMIT, Store::commit_db_transaction)?;
    Ok(Json(store.invoke_ref(QUERY, Store::exec_query)?))
}

fn install_hooks(config: &DeadlineConfig, registry: &InterceptionRegistry) -> Result<(), Box<dyn std::error::Error>> {
    if !config.hooks.database {
        tracing::info!("Database adapter disabled");
        return Ok(());
    }

    let validation = if config.hooks.strict {
        Validation::Strict
    } else {
        Validation::Lenient
    };
    database::DATABASE.install::<Store>(registry, validation)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DeadlineConfig::default(),
    };

    init_logging(&config.logging)?;

    tracing::info!(
        bind_address = %config.server.bind_address,
        http_timeout_secs = ?config.http.timeout_secs,
        "deadline-demo v0.1.0 starting"
    );

    let registry = InterceptionRegistry::global();
    install_hooks(&config, registry)?;

    let store: AppState = Arc::new(Intercepted::with_registry(Store::default(), Arc::clone(registry)));

    let app = Router::new()
        .route("/rows", get(list_rows).post(add_row))
        .with_state(store)
        .layer(RequestTimeoutLayer::from(&config.http))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server.bind_address.parse()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
