use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;

use crate::app::{app, AppState};
use crate::config::{self, AppConfig, StorageBackend};
use crate::database::{DatabaseManager, PgStore, Stores};
use crate::services::workload::max_periods;

#[derive(Parser)]
#[command(name = "staffing-api")]
#[command(about = "School staffing backend - teaching-load capacity and overload reporting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP API (default)")]
    Serve {
        #[arg(long, env = "STAFFING_API_PORT", help = "Port to listen on")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Print the teaching-period budget for a weekly hour allotment")]
    MaxPeriods {
        #[arg(allow_negative_numbers = true)]
        rt_hours: i32,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::config();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => serve(config, port).await,
        Commands::Migrate => {
            let pool = DatabaseManager::main_pool(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            DatabaseManager::close().await;
            Ok(())
        }
        Commands::MaxPeriods { rt_hours } => {
            println!("{}", max_periods(rt_hours));
            Ok(())
        }
    }
}

async fn build_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    match config.database.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            Ok(Stores::memory())
        }
        StorageBackend::Postgres => {
            let pool = DatabaseManager::main_pool(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Stores::postgres(PgStore::new(pool)))
        }
    }
}

async fn serve(config: &AppConfig, port: Option<u16>) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }
    if crate::is_development!() {
        info!("Development mode: registration open, permissive defaults");
    }

    let stores = build_stores(config).await?;
    let state = AppState::new(stores, config.security.clone());
    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Staffing API listening on http://{}", bind_addr);

    axum::serve(listener, router).await?;
    DatabaseManager::close().await;
    Ok(())
}
