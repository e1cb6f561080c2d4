use anyhow::Context;
use api_client::{AlphaVantageClient, SymbolSearch};
use clap::{Parser, Subcommand};
use configuration::{load_config, ConfigArgs, Settings};
use core_types::Holding;
use database::{connect, run_migrations, DbRepository, HoldingDetails, HoldingsStore};
use engine::PortfolioValuationEngine;
use indicatif::ProgressStyle;
use std::future::Future;
use std::io;
use std::sync::Arc;
use tracing::Instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

mod render;
mod telemetry;

/// The main entry point for the portfolio visualizer.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load ALPHA_VANTAGE_API_KEY and friends from .env if one is present.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = load_config(&cli.config_args.config)
        .with_context(|| format!("Failed to load {}", cli.config_args.config.display()))?;
    let _log_guard = telemetry::init(&settings.logging)?;

    // Initialize the database connection and run migrations
    let db_pool = connect(&settings.database.url)
        .await
        .context("Failed to connect to the holdings database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    let repo = DbRepository::new(db_pool);

    let result = match cli.command {
        Commands::Holdings { command } => handle_holdings(command, &repo, &settings).await,
        Commands::Search { keywords } => handle_search(&keywords.join(" "), &settings).await,
        Commands::Value { json } => handle_value(json, &repo, &settings).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = ?e, "Command failed");
    }
    result
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Values a stock portfolio from daily closing prices and reports trailing performance.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config_args: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored holdings.
    Holdings {
        #[command(subcommand)]
        command: HoldingsCommand,
    },
    /// Look up ticker symbols by name or keyword.
    Search {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// Value the stored holdings and report trailing performance.
    Value {
        /// Print the full report as JSON instead of tables.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum HoldingsCommand {
    /// List every stored holding.
    List,
    /// Add a holding, or replace it if the symbol is already held.
    Add {
        symbol: String,
        quantity: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        asset_type: Option<String>,
        #[arg(long)]
        region: Option<String>,
        /// Fill missing details from the symbol search.
        #[arg(long)]
        lookup: bool,
    },
    /// Change the quantity of a held symbol.
    Set { symbol: String, quantity: u64 },
    /// Stop holding a symbol.
    Remove { symbol: String },
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_holdings(
    command: HoldingsCommand,
    repo: &DbRepository,
    settings: &Settings,
) -> anyhow::Result<()> {
    match command {
        HoldingsCommand::List => {
            let rows = repo.list_holdings().await?;
            if rows.is_empty() {
                println!("No holdings yet. Add one with `holdings add <SYMBOL> <QUANTITY>`.");
            } else {
                println!("{}", render::holdings_table(&rows));
            }
        }
        HoldingsCommand::Add {
            symbol,
            quantity,
            name,
            asset_type,
            region,
            lookup,
        } => {
            let holding = Holding::new(&symbol, quantity)?;
            let mut details = HoldingDetails {
                name,
                asset_type,
                region,
            };
            if lookup {
                fill_details(&holding.symbol, &mut details, settings).await?;
            }
            let row = repo.upsert_holding(&holding, &details).await?;
            println!("Holding {} x {} saved.", row.symbol, row.quantity);
        }
        HoldingsCommand::Set { symbol, quantity } => {
            let row = repo.update_quantity(&symbol, quantity).await?;
            println!("Holding {} is now {}.", row.symbol, row.quantity);
        }
        HoldingsCommand::Remove { symbol } => {
            repo.delete_holding(&symbol).await?;
            println!("Holding {} removed.", symbol.trim().to_uppercase());
        }
    }
    Ok(())
}

/// Completes `details` from the search result whose symbol matches exactly.
/// Values given on the command line win.
async fn fill_details(
    symbol: &str,
    details: &mut HoldingDetails,
    settings: &Settings,
) -> anyhow::Result<()> {
    let client = AlphaVantageClient::new(&settings.api)?;
    let matches = client.search_symbols(symbol).await?;

    match matches.into_iter().find(|m| m.symbol.eq_ignore_ascii_case(symbol)) {
        Some(found) => {
            details.name = details.name.take().or(found.name);
            details.asset_type = details.asset_type.take().or(found.asset_type);
            details.region = details.region.take().or(found.region);
        }
        None => {
            tracing::warn!(symbol, "Symbol search returned no exact match");
            println!("No exact match for {} found; saving without details.", symbol);
        }
    }
    Ok(())
}

async fn handle_search(keywords: &str, settings: &Settings) -> anyhow::Result<()> {
    let client = AlphaVantageClient::new(&settings.api)?;
    let matches = client.search_symbols(keywords).await?;

    if matches.is_empty() {
        println!("No symbols match \"{}\".", keywords);
    } else {
        println!("{}", render::search_table(&matches));
    }
    Ok(())
}

async fn handle_value(json: bool, repo: &DbRepository, settings: &Settings) -> anyhow::Result<()> {
    let provider = Arc::new(AlphaVantageClient::new(&settings.api)?);
    let engine = PortfolioValuationEngine::new(provider, settings.valuation.clone());

    // The spinner lives on the span so that warnings logged mid-run are printed above it.
    let span = tracing::info_span!("valuation");
    span.pb_set_style(&ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    span.pb_set_message("Fetching price history...");

    let report = engine
        .run_from_store_until(repo, shutdown_on(tokio::signal::ctrl_c()))
        .instrument(span)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", render::valuation_table(&report));
    println!("{}", render::performance_table(&report));
    Ok(())
}

/// Resolves when `signal` fires. If the signal handler could not be installed the
/// run is left to finish on its own.
async fn shutdown_on<S>(signal: S)
where
    S: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Could not listen for Ctrl-C; cancellation is disabled");
        std::future::pending::<()>().await;
    }
}
