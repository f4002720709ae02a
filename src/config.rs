use crate::error::ScrapeError;
use crate::extract::{locator, UnitSelectors};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that points at the config document.
pub const CONFIG_PATH_ENV: &str = "APT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperSettings,
    pub apartments: BTreeMap<String, PropertyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// Checked in order against plan names; the first contained name wins.
    #[serde(default = "default_known_identities")]
    pub known_identities: Vec<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_summary_path")]
    pub summary_path: PathBuf,
    /// Where page snapshots go. No snapshots are taken when unset.
    #[serde(default)]
    pub debug_dir: Option<PathBuf>,
    #[serde(default)]
    pub timeouts: Timeouts,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            known_identities: default_known_identities(),
            user_agent: default_user_agent(),
            log_level: default_log_level(),
            output_path: default_output_path(),
            summary_path: default_summary_path(),
            debug_dir: None,
            timeouts: Timeouts::default(),
        }
    }
}

/// Bounded waits used by the browser page source, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub consent_ms: u64,
    pub listing_ms: u64,
    pub expansion_settle_ms: u64,
    pub final_settle_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            consent_ms: 5_000,
            listing_ms: 60_000,
            expansion_settle_ms: 1_000,
            final_settle_ms: 3_000,
            poll_interval_ms: 250,
        }
    }
}

impl Timeouts {
    pub fn consent(&self) -> Duration {
        Duration::from_millis(self.consent_ms)
    }

    pub fn listing(&self) -> Duration {
        Duration::from_millis(self.listing_ms)
    }

    pub fn expansion_settle(&self) -> Duration {
        Duration::from_millis(self.expansion_settle_ms)
    }

    pub fn final_settle(&self) -> Duration {
        Duration::from_millis(self.final_settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(10))
    }
}

/// How a property's page is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Rendered in headless Chrome with floor plans expanded.
    #[default]
    Browser,
    /// Fetched with a plain GET; for server-rendered markup.
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub url: String,
    #[serde(default)]
    pub source: SourceKind,
    pub filters: Filters,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filters {
    /// Inclusive `[low, high]` monthly rent band.
    pub price_range: [f64; 2],
    #[serde(default = "default_bed_bath")]
    pub bed_bath: String,
}

/// CSS selectors for every element the scraper touches.
///
/// The defaults match the accordion floor-plan widget; any of them can be
/// replaced per property without code changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub consent_button: String,
    pub availability_link_text: String,
    pub floor_plan_item: String,
    pub expand_trigger: String,
    pub unit_row: String,
    pub plan_name: String,
    pub beds_baths: String,
    pub unit_name: String,
    pub term: String,
    pub price: String,
    pub availability: String,
    pub features: String,
    pub feature_item: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            consent_button: "#onetrust-accept-btn-handler".to_string(),
            availability_link_text: "Availability".to_string(),
            floor_plan_item: ".fapt-fp-list-item".to_string(),
            expand_trigger: ".fapt-fp-list-item__acc-trigger-cta".to_string(),
            unit_row: ".fapt-fp-unit__table-row:not(.fapt-fp-unit__table-row--header)"
                .to_string(),
            plan_name: ".fapt-fp-list-item__column--plan-name span".to_string(),
            beds_baths: ".fapt-fp-list-item__column--beds-baths".to_string(),
            unit_name: ".fapt-fp-unit__unit-name-text".to_string(),
            term: ".fapt-fp-unit__column-inner--term span".to_string(),
            price: ".fapt-fp-unit__column-inner--price span".to_string(),
            availability: ".fapt-fp-unit__column-inner--available span".to_string(),
            features: ".fapt-fp-unit__column-inner--amenities div".to_string(),
            feature_item: "span".to_string(),
        }
    }
}

fn default_known_identities() -> Vec<String> {
    ["Cadiz", "Milano", "Mirada", "Tesoro", "Toscana", "Verona"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("apartments.csv")
}

fn default_summary_path() -> PathBuf {
    PathBuf::from("summary.html")
}

fn default_bed_bath() -> String {
    "2 Bed / 2 Bath".to_string()
}

impl Config {
    /// Resolve the config path: explicit argument, then `APT_CONFIG`, then the default.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScrapeError> {
        let config: Config =
            serde_json::from_str(raw).map_err(|e| ScrapeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ScrapeError> {
        if self.apartments.is_empty() {
            return Err(ScrapeError::Config("no apartments configured".to_string()));
        }

        // An empty name is a substring of every plan name.
        if let Some(idx) = self
            .scraper
            .known_identities
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ScrapeError::Config(format!(
                "scraper.known_identities[{idx}] is empty"
            )));
        }

        for (key, property) in &self.apartments {
            if property.url.trim().is_empty() {
                return Err(ScrapeError::Config(format!("apartments.{key}.url is empty")));
            }
            let [low, high] = property.filters.price_range;
            if !(low.is_finite() && high.is_finite()) || low < 0.0 || low > high {
                return Err(ScrapeError::Config(format!(
                    "apartments.{key}.filters.price_range [{low}, {high}] is not a valid band"
                )));
            }
            if property.filters.bed_bath.trim().is_empty() {
                return Err(ScrapeError::Config(format!(
                    "apartments.{key}.filters.bed_bath is empty"
                )));
            }

            UnitSelectors::compile(&property.selectors)?;
            locator::parse(&property.selectors.consent_button)?;
            locator::parse(&property.selectors.expand_trigger)?;
        }

        Ok(())
    }

    pub fn property(&self, key: &str) -> Result<&PropertyConfig, ScrapeError> {
        self.apartments.get(key).ok_or_else(|| {
            ScrapeError::Config(format!(
                "unknown property `{key}` (configured: {})",
                self.apartments.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}
