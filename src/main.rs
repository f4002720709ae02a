mod config;
mod error;
mod extract;
mod models;
mod output;
mod pipeline;
mod scrapers;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, SourceKind};
use extract::IdentitySet;
use output::{write_table, Notification, RunOutcome};
use scrapers::{BrowserPageSource, FilePageSource, PageSource, StaticPageSource};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "apartment-scout")]
#[command(about = "Scrape floor-plan listings and report units matching your filters", long_about = None)]
struct Args {
    /// Path to the JSON config (falls back to $APT_CONFIG, then config/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only scrape this configured property
    #[arg(long)]
    property: Option<String>,

    /// Parse a saved page snapshot instead of fetching the live page
    #[arg(long, requires = "property")]
    html_file: Option<PathBuf>,

    /// Override the CSV output path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config_path = Config::resolve_path(args.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.scraper.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🏠 Apartment Scout");
    info!("==================");

    let keys: Vec<String> = match &args.property {
        Some(key) => {
            config.property(key)?;
            vec![key.clone()]
        }
        None => config.apartments.keys().cloned().collect(),
    };

    let identities = IdentitySet::new(config.scraper.known_identities.iter().cloned());
    let mut records = Vec::new();
    let mut targets = Vec::new();

    for key in &keys {
        let property = config.property(key)?;
        let source = page_source(&config, property, args.html_file.as_ref())?;

        info!("Scraping {} ({})", key, property.url);
        let (mut found, _stats) = pipeline::run_property(source.as_ref(), property, &identities)
            .await
            .map_err(|e| {
                error!("Run failed for {}: {}", key, e);
                e
            })
            .with_context(|| format!("Scrape of {key} failed; no table written"))?;

        info!("✅ {} matching units for {}", found.len(), key);
        records.append(&mut found);
        if !targets.contains(&property.filters.bed_bath) {
            targets.push(property.filters.bed_bath.clone());
        }
    }

    let output_path = args.output.unwrap_or_else(|| config.scraper.output_path.clone());
    let written = write_table(&output_path, &records)?;

    let notification = Notification::build(&records, &targets.join(" / "), chrono::Local::now());
    match &notification.outcome {
        RunOutcome::Matches {
            count,
            min_price,
            max_price,
        } => info!(
            "{} matching units ({} rows written), {} to {}",
            count,
            written,
            models::format_usd(*min_price),
            models::format_usd(*max_price)
        ),
        RunOutcome::NoMatches => warn!(
            "No matching apartments found this run; {} has headers only",
            output_path.display()
        ),
    }

    let summary_path = &config.scraper.summary_path;
    tokio::fs::write(summary_path, &notification.html_body)
        .await
        .with_context(|| format!("Failed to write summary to {}", summary_path.display()))?;
    info!(
        "💾 Saved summary to {} (subject: {}, attachment: {})",
        summary_path.display(),
        notification.subject,
        notification.attachment_name
    );

    Ok(())
}

fn page_source(
    config: &Config,
    property: &config::PropertyConfig,
    html_file: Option<&PathBuf>,
) -> Result<Box<dyn PageSource>> {
    if let Some(path) = html_file {
        return Ok(Box::new(FilePageSource::new(path)));
    }

    Ok(match property.source {
        SourceKind::Browser => Box::new(BrowserPageSource::new(
            property.selectors.clone(),
            config.scraper.timeouts.clone(),
            config.scraper.user_agent.clone(),
            config.scraper.debug_dir.clone(),
        )),
        SourceKind::Static => Box::new(StaticPageSource::new(&config.scraper.user_agent)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_file_requires_property() {
        let err = Args::try_parse_from(["apartment-scout", "--html-file", "debug/page.html"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_html_file_with_property_parses() {
        let args = Args::try_parse_from([
            "apartment-scout",
            "--html-file",
            "debug/page.html",
            "--property",
            "crescent_village",
        ])
        .unwrap();
        assert_eq!(args.property.as_deref(), Some("crescent_village"));
        assert_eq!(args.html_file, Some(PathBuf::from("debug/page.html")));
    }
}
