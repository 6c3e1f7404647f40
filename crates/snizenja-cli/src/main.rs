use clap::{Parser, Subcommand};

mod run;

#[derive(Debug, Parser)]
#[command(name = "snizenja")]
#[command(about = "Harvests discounted-product listings from Serbian retailers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run every store's list pass, then every detail pass.
    Run,
    /// Run one store's list pass (e.g. `list planeta`).
    List { store: String },
    /// Run one store's detail enrichment pass.
    Enrich {
        store: String,
        /// Re-scrape every deal instead of only pending ones.
        #[arg(long)]
        force: bool,
    },
    /// Show the most recent scrape runs.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Apply pending database migrations and exit.
    Migrate,
}

fn parse_store(s: &str) -> anyhow::Result<snizenja_core::Store> {
    s.parse()
        .map_err(|e| anyhow::anyhow!("{e}; known stores: {}", known_stores()))
}

fn known_stores() -> String {
    snizenja_core::Store::ALL
        .iter()
        .map(|s| s.key())
        .collect::<Vec<_>>()
        .join(", ")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = snizenja_core::AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();

    let pool = snizenja_db::connect_pool(
        &config.database_url,
        snizenja_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    snizenja_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Run => {
            let summary = run::run_all(&pool, &config).await;
            println!("{summary}");
        }
        Commands::List { store } => {
            let store = parse_store(&store)?;
            let outcome = run::run_list_pass(&pool, &config, store).await?;
            println!(
                "{store}: {} seen, {} persisted, {} stale removed, {} errors",
                outcome.total_scraped, outcome.persisted, outcome.deleted, outcome.error_count
            );
        }
        Commands::Enrich { store, force } => {
            let store = parse_store(&store)?;
            let enriched = run::run_enrich_pass(&pool, &config, store, force).await?;
            println!("{store}: enriched {enriched} deals");
        }
        Commands::Runs { limit } => {
            let runs = snizenja_db::list_recent_runs(&pool, limit).await?;
            for run in runs {
                println!(
                    "{}  {:<13} seen {:>5}  kept {:>5}  errors {:>3}  {}",
                    run.started_at.format("%Y-%m-%d %H:%M:%S"),
                    run.store,
                    run.total_scraped,
                    run.filtered_count,
                    run.errors.len(),
                    run.public_id
                );
            }
        }
        Commands::Migrate => {
            println!("migrations up to date");
        }
    }

    Ok(())
}
