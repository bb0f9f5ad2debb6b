mod fetch;
mod user;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::fetch::FetchArgs;
use crate::user::UserCommands;

#[derive(Debug, Parser)]
#[command(name = "ytdash-cli")]
#[command(about = "YouTube channel analytics command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch channel statistics and print a summary
    Fetch(FetchArgs),
    /// Manage dashboard accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("ytdash-cli: use --help to list commands");
        return Ok(());
    };

    let config = ytdash_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match command {
        Commands::Fetch(args) => fetch::run_fetch(&config, &args).await,
        Commands::User { command } => {
            let pool = connect(&config).await?;
            user::run_user(&pool, &config, &command).await
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Ping => {
                    ytdash_db::health_check(&pool).await?;
                    println!("database: ok");
                }
                DbCommands::Migrate => {
                    let applied = ytdash_db::run_migrations(&pool).await?;
                    println!("migrations applied: {applied}");
                }
            }
            Ok(())
        }
    }
}

async fn connect(config: &ytdash_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = ytdash_db::PoolConfig::from_app_config(config);
    Ok(ytdash_db::connect_pool(&config.database_url, pool_config).await?)
}
