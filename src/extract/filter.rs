use crate::models::ApartmentRecord;

/// Inclusive price band a record must fall in to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub low: f64,
    pub high: f64,
}

impl PriceBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn accepts(&self, record: &ApartmentRecord) -> bool {
        self.low <= record.price && record.price <= self.high
    }
}

impl From<[f64; 2]> for PriceBand {
    fn from([low, high]: [f64; 2]) -> Self {
        Self::new(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApartmentIdentity, FloorLabel};

    fn priced(price: f64) -> ApartmentRecord {
        ApartmentRecord {
            apartment_identity: ApartmentIdentity::Unknown,
            unit_label: "A1".to_string(),
            term: "12 Months".to_string(),
            price,
            availability: "Now".to_string(),
            floor: FloorLabel::NotAvailable,
            features: vec![],
        }
    }

    #[test]
    fn test_band_is_inclusive() {
        let band = PriceBand::from([2000.0, 3000.0]);
        assert!(band.accepts(&priced(2000.0)));
        assert!(band.accepts(&priced(2500.0)));
        assert!(band.accepts(&priced(3000.0)));
        assert!(!band.accepts(&priced(1999.99)));
        assert!(!band.accepts(&priced(3000.01)));
    }

    #[test]
    fn test_degenerate_band() {
        let band = PriceBand::new(2450.0, 2450.0);
        assert!(band.accepts(&priced(2450.0)));
        assert!(!band.accepts(&priced(2451.0)));
    }
}
