//! Summary payload handed to whatever delivers the alert.
//!
//! Delivery itself (SMTP, chat, ...) lives outside this crate; this module
//! only decides what the message says and which attachment name it carries.

use crate::models::{format_usd, ApartmentRecord};
use crate::output::table::HEADERS;
use chrono::{DateTime, Local};
use maud::{html, Markup, PreEscaped, DOCTYPE};

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Matches {
        count: usize,
        min_price: f64,
        max_price: f64,
    },
    /// The run finished but nothing passed the filters.
    NoMatches,
}

impl RunOutcome {
    pub fn from_records(records: &[ApartmentRecord]) -> Self {
        let mut prices = records.iter().map(|r| r.price);
        let Some(first) = prices.next() else {
            return RunOutcome::NoMatches;
        };
        let (min_price, max_price) =
            prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        RunOutcome::Matches {
            count: records.len(),
            min_price,
            max_price,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
    pub attachment_name: String,
    pub outcome: RunOutcome,
}

impl Notification {
    pub fn build(records: &[ApartmentRecord], target: &str, at: DateTime<Local>) -> Self {
        let outcome = RunOutcome::from_records(records);
        let stamp = at.format("%b-%d-%Y %I:%M %p");

        let subject = match &outcome {
            RunOutcome::Matches { count, .. } => {
                format!("🏠 Apartment update: {count} matching units ({stamp})")
            }
            RunOutcome::NoMatches => format!("🏠 Apartment update: no matching units ({stamp})"),
        };

        Self {
            subject,
            html_body: page(body(&outcome, records, target)).into_string(),
            attachment_name: format!("apartments_{}.csv", at.format("%Y%m%d_%H%M")),
            outcome,
        }
    }
}

const STYLE: &str = "\
.apartment-table { border-collapse: collapse; width: 100%; font-family: Arial, sans-serif; font-size: 14px; }\
.apartment-table th { background-color: #4CAF50; color: white; padding: 12px; text-align: left; }\
.apartment-table td { padding: 12px 8px; border-bottom: 1px solid #ddd; }\
.apartment-table tr:nth-child(even) { background-color: #f2f2f2; }";

fn page(content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                style { (PreEscaped(STYLE)) }
            }
            body { (content) }
        }
    }
}

fn body(outcome: &RunOutcome, records: &[ApartmentRecord], target: &str) -> Markup {
    match outcome {
        RunOutcome::Matches {
            min_price,
            max_price,
            ..
        } => html! {
            p { "All units are " (target) " and sorted by price." }
            p { "Prices range from " (format_usd(*min_price)) " to " (format_usd(*max_price)) "." }
            (table(records))
        },
        RunOutcome::NoMatches => html! {
            p {
                "The listing page was scanned successfully, but no " (target)
                " units matched the price filter this run."
            }
        },
    }
}

/// Records as an HTML table, cheapest first.
fn table(records: &[ApartmentRecord]) -> Markup {
    let mut sorted: Vec<&ApartmentRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

    html! {
        table class="apartment-table" {
            tr {
                @for header in HEADERS {
                    th { (header) }
                }
            }
            @for record in sorted {
                tr {
                    td { (record.apartment_identity.to_string()) }
                    td { (record.unit_label) }
                    td { (record.term) }
                    td { (record.price_display()) }
                    td { (record.availability) }
                    td { (record.floor.to_string()) }
                    td { (record.features.join(", ")) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApartmentIdentity, FloorLabel};
    use chrono::TimeZone;

    fn record(unit: &str, price: f64) -> ApartmentRecord {
        ApartmentRecord {
            apartment_identity: ApartmentIdentity::Known("Verona".into()),
            unit_label: unit.to_string(),
            term: "12 Months".to_string(),
            price,
            availability: "Now".to_string(),
            floor: FloorLabel::NotAvailable,
            features: vec!["Patio & Garden".to_string()],
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 11, 5, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_outcome_min_max() {
        let records = vec![record("A", 2600.0), record("B", 2150.0), record("C", 2900.0)];
        assert_eq!(
            RunOutcome::from_records(&records),
            RunOutcome::Matches {
                count: 3,
                min_price: 2150.0,
                max_price: 2900.0
            }
        );
        assert_eq!(RunOutcome::from_records(&[]), RunOutcome::NoMatches);
    }

    #[test]
    fn test_matches_body_sorted_by_price() {
        let records = vec![record("Pricey", 2900.0), record("Cheap", 2150.0)];
        let note = Notification::build(&records, "2 Bed / 2 Bath", noon());

        assert!(note.subject.contains("2 matching units"));
        assert!(note.html_body.contains("Prices range from $2,150 to $2,900"));
        let cheap = note.html_body.find("Cheap").unwrap();
        let pricey = note.html_body.find("Pricey").unwrap();
        assert!(cheap < pricey);
        assert!(note.html_body.contains("Patio &amp; Garden"));
        assert!(!note.html_body.contains("Patio & Garden"));
        assert_eq!(note.attachment_name, "apartments_20241105_1230.csv");
    }

    #[test]
    fn test_no_matches_is_distinct() {
        let note = Notification::build(&[], "2 Bed / 2 Bath", noon());
        assert_eq!(note.outcome, RunOutcome::NoMatches);
        assert!(note.subject.contains("no matching units"));
        assert!(!note.html_body.contains("<table"));
        assert!(note.html_body.contains("no 2 Bed / 2 Bath units matched"));
    }
}
