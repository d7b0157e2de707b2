use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::migrate::MigrateDatabase;

mod cli;

/// allersafe - Allergen-safe meal planning
#[derive(Parser)]
#[command(name = "allersafe")]
#[command(about = "Allergen-safe meal plan generation", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Load a JSON catalog into the database
    Seed {
        /// Path to the JSON dataset
        #[arg(long)]
        file: String,
    },
    /// Generate a meal plan and print it as JSON
    Generate(cli::generate::GenerateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = allersafe::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    allersafe::observability::init_observability(
        "allersafe",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::Seed { file } => cli::seed::run(config, file).await,
        Commands::Generate(args) => cli::generate::run(config, args).await,
    }
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: allersafe::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    let pool = allersafe::create_pool(&config.database.url, 1).await?;
    allersafe::migrate(&pool).await?;
    pool.close().await;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: allersafe::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}
