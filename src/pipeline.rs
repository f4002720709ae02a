use crate::config::PropertyConfig;
use crate::error::{ScrapeError, SkipReason};
use crate::extract::{locate_units, IdentitySet, Normalizer, PriceBand, UnitSelectors};
use crate::models::ApartmentRecord;
use crate::scrapers::PageSource;
use scraper::Html;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Counters for one property run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub rows_seen: usize,
    pub skipped: BTreeMap<&'static str, usize>,
    pub outside_price_band: usize,
    pub accepted: usize,
}

impl RunStats {
    fn skip(&mut self, reason: &SkipReason) {
        *self.skipped.entry(reason.kind()).or_default() += 1;
    }
}

/// Fetch one property's page and return its eligible units in page order.
pub async fn run_property(
    source: &dyn PageSource,
    property: &PropertyConfig,
    identities: &IdentitySet,
) -> Result<(Vec<ApartmentRecord>, RunStats), ScrapeError> {
    let selectors = UnitSelectors::compile(&property.selectors)?;
    info!("Loading {} via {}", property.url, source.source_name());
    let html = source.fetch_html(&property.url).await?;

    let normalizer = Normalizer::new(identities.clone(), property.filters.bed_bath.clone());
    let band = PriceBand::from(property.filters.price_range);
    Ok(extract_records(&html, &selectors, &normalizer, band))
}

/// Everything after the page is in hand: locate, normalize, filter.
pub fn extract_records(
    html: &str,
    selectors: &UnitSelectors,
    normalizer: &Normalizer,
    band: PriceBand,
) -> (Vec<ApartmentRecord>, RunStats) {
    let document = Html::parse_document(html);
    let mut stats = RunStats::default();
    let mut records = Vec::new();

    for located in locate_units(&document, selectors) {
        stats.rows_seen += 1;

        let record = match located.and_then(|fragment| normalizer.normalize(&fragment)) {
            Ok(record) => record,
            Err(reason) => {
                debug!("Skipping unit row: {}", reason);
                stats.skip(&reason);
                continue;
            }
        };

        if !band.accepts(&record) {
            debug!(
                "Skipping {} at {}: outside price band",
                record.unit_label,
                record.price_display()
            );
            stats.outside_price_band += 1;
            continue;
        }

        info!(
            "Found matching unit: {} at {} in {}",
            record.unit_label,
            record.price_display(),
            record.apartment_identity
        );
        records.push(record);
    }

    stats.accepted = records.len();
    info!(
        "Found {} unit rows, accepted {}, skipped {:?}, {} outside price band",
        stats.rows_seen, stats.accepted, stats.skipped, stats.outside_price_band
    );
    (records, stats)
}
