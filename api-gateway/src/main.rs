//! API Gateway for the Trion backend

use std::sync::Arc;

use account_service::{AccountService, AccountServiceConfig};
use api_gateway::config::AppConfig;
use api_gateway::{router, AppState};
use clap::Parser;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, FmtSubscriber};

/// Trion API server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Listening address, overrides HOST and PORT
    #[clap(short, long)]
    addr: Option<String>,

    /// Keep accounts in memory instead of PostgreSQL
    #[clap(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();
    let config = AppConfig::from_env()?;

    // Initialize logging with debug level when DEBUG=1 env var is set
    let log_level = if config.debug { Level::DEBUG } else { Level::INFO };

    let env_filter = match std::env::var("RUST_LOG") {
        Ok(directives) => EnvFilter::builder()
            .with_default_directive(log_level.into())
            .parse(directives)?,
        Err(_) => EnvFilter::builder()
            .with_default_directive(log_level.into())
            .parse(format!(
                "tower_http={0},api_gateway={0},account_service={0}",
                log_level
            ))?,
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Debug logging enabled");

    // Initialize services
    let mut service_config = AccountServiceConfig::from_env()?;
    if args.in_memory {
        service_config = service_config.into_in_memory();
    }
    let account_service = Arc::new(AccountService::with_config(&service_config).await?);

    // Create app state
    let state = Arc::new(AppState::new(account_service));
    let app = router(state);

    // Start the server
    let addr: std::net::SocketAddr = match args.addr {
        Some(addr) => addr.parse()?,
        None => config.socket_addr()?,
    };
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    // Run until interrupt signal
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
