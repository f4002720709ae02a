use crate::error::ScrapeError;
use crate::models::ApartmentRecord;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const HEADERS: [&str; 7] = [
    "Apartment",
    "BLDG NO. / APT NO.",
    "TERM",
    "PRICE",
    "AVAILABLE",
    "Floor",
    "FEATURES",
];

/// Write `records` as a header-plus-rows CSV to `path`, replacing any earlier file.
///
/// An empty batch still produces the header row.
pub fn write_table(path: &Path, records: &[ApartmentRecord]) -> Result<usize, ScrapeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let written = write_records(file, records)?;
    info!("💾 Saved {} units to {}", written, path.display());
    Ok(written)
}

/// Write the table to any sink, rows in the order given.
pub fn write_records<W: Write>(sink: W, records: &[ApartmentRecord]) -> Result<usize, ScrapeError> {
    let mut wtr = csv::Writer::from_writer(sink);
    wtr.write_record(HEADERS)?;

    for record in records {
        wtr.write_record([
            record.apartment_identity.to_string(),
            record.unit_label.clone(),
            record.term.clone(),
            record.price_display(),
            record.availability.clone(),
            record.floor.to_string(),
            record.features.join(", "),
        ])?;
    }

    wtr.flush()?;
    Ok(records.len())
}
