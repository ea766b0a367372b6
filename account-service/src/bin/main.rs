use account_service::{AccountService, AccountServiceConfig, StoreKind};
use clap::{Parser, Subcommand};
use common::db::{init_db_pool, run_migrations};
use common::model::user::ProfileUpdate;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Account Service admin CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Set the log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Database URL, overrides DATABASE_URL
    #[arg(short, long, global = true)]
    database_url: Option<String>,

    /// Database pool size
    #[arg(short, long, global = true)]
    pool_size: Option<u32>,

    /// Commands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the SQL migrations
    Migrate,
    /// Print an account as JSON
    Show {
        /// External platform identity
        identity: String,
    },
    /// Create an account or refresh its profile
    Init {
        /// External platform identity
        identity: String,

        /// Display name
        #[arg(long)]
        display_name: Option<String>,

        /// Platform handle
        #[arg(long)]
        handle: Option<String>,

        /// Avatar URL
        #[arg(long)]
        avatar_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("account_service={}", cli.log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Create config using provided values or env vars
    let mut config = AccountServiceConfig::from_env()?;
    if let Some(url) = cli.database_url {
        config.store = StoreKind::Postgres;
        config.database_url = url;
    }
    if let Some(pool_size) = cli.pool_size {
        config.db_pool_size = pool_size;
    }

    match cli.command {
        Commands::Migrate => {
            let pool = init_db_pool(&config.database_url, config.db_pool_size).await?;
            run_migrations(&pool, &config.migrations_dir).await?;
            info!("Migrations applied");
        }
        Commands::Show { identity } => {
            let service = AccountService::with_config(&config).await?;
            let user = service.get_user(&identity).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Commands::Init { identity, display_name, handle, avatar_url } => {
            let service = AccountService::with_config(&config).await?;
            let profile = ProfileUpdate::new(display_name, handle, avatar_url);
            let user = service.init_user(&identity, profile).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
    }

    Ok(())
}
