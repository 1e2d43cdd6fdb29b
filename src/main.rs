use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use measurehub::server::{migrate_database, start_server, MigrateDirection};

#[derive(Parser)]
#[command(name = "measurehub", about = "Labeled time-series and measurement server")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        #[arg(short, long, default_value = "measurehub.db")]
        database: String,
        #[arg(long)]
        cors_origin: Option<String>,
        /// Bootstrap admin key; generated and logged when omitted
        #[arg(long)]
        admin_key: Option<String>,
    },
    /// Run database migrations
    Migrate {
        #[arg(short, long, default_value = "measurehub.db")]
        database: String,
        #[command(subcommand)]
        direction: MigrateDirection,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            database,
            cors_origin,
            admin_key,
        } => {
            let admin_key = admin_key.unwrap_or_else(|| {
                let generated = format!("admin_{}", Uuid::new_v4().simple());
                info!("No admin key supplied; generated one for this run: {}", generated);
                generated
            });
            start_server(port, &database, cors_origin.as_deref(), &admin_key).await?;
        }
        Command::Migrate {
            database,
            direction,
        } => {
            migrate_database(&database, direction).await?;
        }
    }

    Ok(())
}
