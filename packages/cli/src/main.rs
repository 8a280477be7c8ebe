//! Command-line host for the property price estimator.
//!
//! Loads and cleans the sales dataset once per invocation, selects a
//! geography, and estimates from a free-text description using Gemini for
//! extraction and Zillow for address lookups.

mod config;
mod format;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use gemini_client::GeminiClient;
use prophecy::ai::GeminiExtractor;
use prophecy::lookups::ZillowLookup;
use prophecy::{
    clean, CleanedDataset, Estimate, Estimator, ExtractionCapability, Feature, FeatureMap,
    GeographyKey, PredictionResult, PropertyLookup, ProphecyError, RawDataset, ZipCode,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zillow_client::ZillowClient;

use crate::config::Config;
use crate::format::format_usd;

#[derive(Parser)]
#[command(name = "prophecy")]
#[command(about = "Estimate a home's sale price from a description")]
struct Cli {
    /// Sales CSV (overrides PROPHECY_DATA)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List geographies with enough sales to estimate in
    Cities,

    /// Price summary for one geography
    Summary {
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: Option<String>,
        /// Restrict to these zip codes
        #[arg(long = "zip")]
        zips: Vec<u32>,
    },

    /// Estimate a price from a free-text description or an address
    Predict {
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: Option<String>,
        /// Print the estimate as JSON
        #[arg(long)]
        json: bool,
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,prophecy=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    let raw = RawDataset::from_path(&config.data_path)
        .with_context(|| format!("Failed to load {}", config.data_path.display()))?;
    let cleaned = Arc::new(clean(&raw, &config.cleaner).context("Failed to clean dataset")?);
    tracing::info!(
        rows = cleaned.len(),
        geographies = cleaned.geographies().len(),
        "Dataset ready"
    );

    match cli.command {
        Commands::Cities => list_cities(&cleaned),
        Commands::Summary { city, state, zips } => summarize(&cleaned, &city, state.as_deref(), &zips),
        Commands::Predict {
            city,
            state,
            json,
            description,
        } => predict(&config, cleaned, &city, state.as_deref(), &description, json).await,
    }
}

fn resolve_geography(cleaned: &CleanedDataset, city: &str, state: Option<&str>) -> Result<GeographyKey> {
    cleaned
        .find_geography(city, state)
        .cloned()
        .with_context(|| {
            format!(
                "{} has too few sales (or none); run `prophecy cities` for the list",
                GeographyKey {
                    city: city.to_string(),
                    state: state.map(str::to_string),
                }
            )
        })
}

fn list_cities(cleaned: &CleanedDataset) -> Result<()> {
    let mut counts: HashMap<GeographyKey, usize> = HashMap::new();
    for record in cleaned.records() {
        if let Some(key) =
            GeographyKey::for_record(cleaned.group_by(), Some(record.city.as_str()), record.state.as_deref())
        {
            *counts.entry(key).or_default() += 1;
        }
    }

    let mut geographies = cleaned.geographies().to_vec();
    geographies.sort();
    for key in geographies {
        let count = counts.get(&key).copied().unwrap_or_default();
        println!("{}  {}", key.to_string().bold(), format!("{} sales", count).dimmed());
    }
    Ok(())
}

fn summarize(cleaned: &CleanedDataset, city: &str, state: Option<&str>, zips: &[u32]) -> Result<()> {
    let key = resolve_geography(cleaned, city, state)?;
    let partition = prophecy::partition(cleaned, Some(&key), &Default::default());

    let zip_filter: Vec<ZipCode> = zips.iter().copied().map(ZipCode::new).collect();
    let summary = partition
        .price_summary(&zip_filter)
        .with_context(|| format!("No priced sales in {} for the given zip codes", key))?;

    println!("{}", key.to_string().bold());
    println!("  sales   {}", summary.count);
    println!("  min     {}", format_usd(summary.min));
    println!("  median  {}", format_usd(summary.median));
    println!("  max     {}", format_usd(summary.max));

    let available: Vec<String> = partition.zip_codes().iter().map(|z| z.to_string()).collect();
    println!("  zips    {}", available.join(", ").dimmed());
    Ok(())
}

async fn predict(
    config: &Config,
    cleaned: Arc<CleanedDataset>,
    city: &str,
    state: Option<&str>,
    description: &str,
    json: bool,
) -> Result<()> {
    if description.trim().is_empty() {
        bail!("Description is empty");
    }

    let key = resolve_geography(&cleaned, city, state)?;
    let (gemini_key, rapidapi_key) = config.api_keys()?;

    let gemini = GeminiClient::new(gemini_key)
        .with_model(&config.gemini_model)
        .with_timeout(config.lookup_timeout)
        .context("Failed to build Gemini client")?;
    let zillow = ZillowClient::new(rapidapi_key.to_string())
        .with_timeout(config.lookup_timeout)
        .context("Failed to build Zillow client")?
        .with_max_retries(config.lookup_max_retries);

    let mut estimator = Estimator::new(
        cleaned,
        GeminiExtractor::new(gemini),
        ZillowLookup::new(zillow),
    );
    estimator.select(Some(key));

    let estimate = estimate_with_fallback(&estimator, description).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
        return Ok(());
    }

    match estimate {
        Estimate::NotEnoughData { vocabulary } => {
            let labels: Vec<String> = vocabulary.iter().map(|name| Feature::label(name)).collect();
            println!("{}", "Not enough data to estimate.".yellow());
            println!("Try describing: {}", labels.join(", "));
        }
        Estimate::Predicted { result, features } => print_prediction(&result, &features),
    }
    Ok(())
}

/// Estimate, dropping an unrecognized zip code once rather than failing.
async fn estimate_with_fallback<E, L>(estimator: &Estimator<E, L>, description: &str) -> Result<Estimate>
where
    E: ExtractionCapability,
    L: PropertyLookup,
{
    let features = estimator.extract(description).await?;
    if features.is_empty() {
        return Ok(Estimate::NotEnoughData {
            vocabulary: Feature::vocabulary(),
        });
    }

    let (result, features) = match estimator.predict(&features) {
        Ok(result) => (result, features),
        Err(ProphecyError::UnknownCategory { zip_code, available }) => {
            let known: Vec<String> = available.iter().map(|z| z.to_string()).collect();
            eprintln!(
                "{} zip code {} has no sales here (known: {}); estimating without it",
                "warning:".yellow().bold(),
                zip_code,
                known.join(", ")
            );
            let features = features.without_zip_code();
            (estimator.predict(&features)?, features)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Estimate::Predicted { result, features })
}

fn print_prediction(result: &PredictionResult, features: &FeatureMap) {
    println!(
        "{} {}",
        "Estimated price:".bold(),
        format_usd(result.predicted_price).green().bold()
    );
    println!(
        "  range {} to {}  {}",
        format_usd(result.lower_bound()),
        format_usd(result.upper_bound()),
        format!("(±{:.1}% held-out error)", result.confidence_mape).dimmed()
    );

    let used: Vec<String> = features
        .numeric()
        .map(|(feature, value)| format!("{}={}", feature, value))
        .chain(features.zip_code().map(|z| format!("zip_code={}", z)))
        .collect();
    println!("  from  {}", used.join(", ").dimmed());

    match features.reference_valuation() {
        Some(valuation) => println!("  Zillow estimate {}", format_usd(valuation).cyan()),
        None => println!(
            "  {}",
            "Tip: give a street address to compare against a Zillow estimate".dimmed()
        ),
    }
}
