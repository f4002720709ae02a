use crate::error::SkipReason;
use crate::models::{ApartmentIdentity, ApartmentRecord, FloorLabel, RawUnitFragment};
use regex::Regex;
use std::sync::OnceLock;

/// Ordered set of property names that plan names are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySet {
    names: Vec<String>,
}

impl IdentitySet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// First known name contained in `plan_name` (case-sensitive).
    pub fn resolve(&self, plan_name: Option<&str>) -> ApartmentIdentity {
        let Some(plan_name) = plan_name else {
            return ApartmentIdentity::Unknown;
        };
        self.names
            .iter()
            .find(|name| !name.is_empty() && plan_name.contains(name.as_str()))
            .map(|name| ApartmentIdentity::Known(name.clone()))
            .unwrap_or(ApartmentIdentity::Unknown)
    }
}

/// Turns raw row text into [`ApartmentRecord`]s for one target unit type.
#[derive(Debug, Clone)]
pub struct Normalizer {
    identities: IdentitySet,
    target_bed_bath: String,
}

impl Normalizer {
    pub fn new(identities: IdentitySet, target_bed_bath: impl Into<String>) -> Self {
        Self {
            identities,
            target_bed_bath: target_bed_bath.into(),
        }
    }

    /// Build the record for `fragment`, or say why it was dropped.
    ///
    /// The unit-type gate runs before anything else, so price text of
    /// non-targeted units is never looked at.
    pub fn normalize(&self, fragment: &RawUnitFragment) -> Result<ApartmentRecord, SkipReason> {
        if !fragment.group.beds_baths.contains(&self.target_bed_bath) {
            return Err(SkipReason::UnitTypeMismatch {
                label: fragment.group.beds_baths.clone(),
            });
        }

        let price = parse_price(&fragment.price)
            .ok_or_else(|| SkipReason::UnparseablePrice(fragment.price.clone()))?;

        let features = clean_features(&fragment.features);
        let floor = extract_floor(&features);

        Ok(ApartmentRecord {
            apartment_identity: self.identities.resolve(fragment.group.plan_name.as_deref()),
            unit_label: fragment.unit_label.trim().to_string(),
            term: fragment.term.trim().to_string(),
            price,
            availability: fragment.availability.trim().to_string(),
            floor,
            features,
        })
    }
}

/// Parse `"$2,150"` style text. Negative or non-finite values are rejected.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let value: f64 = cleaned.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Trim each feature and one trailing comma; empties are dropped, order and
/// duplicates are kept.
pub fn clean_features(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|feature| {
            let trimmed = feature.trim();
            trimmed.strip_suffix(',').unwrap_or(trimmed).trim_end().to_string()
        })
        .filter(|feature| !feature.is_empty())
        .collect()
}

fn floor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)(\d+)[a-z]{2}\s+floor").expect("floor pattern is valid"))
}

/// Floor from the first feature that mentions "floor".
pub fn extract_floor(features: &[String]) -> FloorLabel {
    let Some(feature) = features
        .iter()
        .find(|feature| feature.to_lowercase().contains("floor"))
    else {
        return FloorLabel::NotAvailable;
    };

    floor_pattern()
        .captures(feature)
        .and_then(|caps| caps.get(1))
        .and_then(|n| n.as_str().parse::<u32>().ok())
        .map(FloorLabel::Ordinal)
        .unwrap_or_else(|| FloorLabel::Verbatim(feature.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FloorPlanGroup;

    fn identities() -> IdentitySet {
        IdentitySet::new(["Cadiz", "Milano", "Mirada", "Tesoro", "Toscana", "Verona"])
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fragment(plan: &str, beds: &str, price: &str, features: &[&str]) -> RawUnitFragment {
        RawUnitFragment {
            unit_label: " Bldg 5 / Apt 201 ".to_string(),
            term: "12 Months".to_string(),
            price: price.to_string(),
            availability: "Available Now".to_string(),
            features: strings(features),
            group: FloorPlanGroup {
                plan_name: Some(plan.to_string()),
                beds_baths: beds.to_string(),
            },
        }
    }

    #[test]
    fn test_identity_substring_match() {
        let set = identities();
        assert_eq!(
            set.resolve(Some("Toscana at CV - Plan A")),
            ApartmentIdentity::Known("Toscana".into())
        );
        assert_eq!(set.resolve(Some("Unnamed Plan 7")), ApartmentIdentity::Unknown);
        assert_eq!(set.resolve(None), ApartmentIdentity::Unknown);
    }

    #[test]
    fn test_identity_is_case_sensitive_and_ordered() {
        let set = IdentitySet::new(["Verona", "Toscana"]);
        assert_eq!(set.resolve(Some("toscana plan")), ApartmentIdentity::Unknown);
        assert_eq!(
            set.resolve(Some("Toscana / Verona combined")),
            ApartmentIdentity::Known("Verona".into())
        );
    }

    #[test]
    fn test_empty_identity_never_matches() {
        let set = IdentitySet::new(["", "Toscana"]);
        assert_eq!(set.resolve(Some("Unnamed Plan 7")), ApartmentIdentity::Unknown);
        assert_eq!(
            set.resolve(Some("Toscana at CV")),
            ApartmentIdentity::Known("Toscana".into())
        );
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$2,150"), Some(2150.0));
        assert_eq!(parse_price(" $1,234.50 "), Some(1234.5));
        assert_eq!(parse_price("2500"), Some(2500.0));
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("$-100"), None);
    }

    #[test]
    fn test_floor_from_ordinal_feature() {
        let features = clean_features(&strings(&["Pool View", "12th Floor", "Balcony,"]));
        assert_eq!(extract_floor(&features).to_string(), "12th Floor");

        let features = strings(&["1st floor"]);
        assert_eq!(extract_floor(&features), FloorLabel::Ordinal(1));
    }

    #[test]
    fn test_floor_not_available_without_mention() {
        let features = strings(&["Pool View", "Balcony"]);
        assert_eq!(extract_floor(&features), FloorLabel::NotAvailable);
    }

    #[test]
    fn test_floor_echoes_feature_without_number() {
        let features = strings(&["Top floor unit"]);
        assert_eq!(
            extract_floor(&features),
            FloorLabel::Verbatim("Top floor unit".into())
        );
    }

    #[test]
    fn test_floor_uses_first_mention_only() {
        let features = strings(&["Ground FLOOR access", "3rd Floor"]);
        assert_eq!(
            extract_floor(&features),
            FloorLabel::Verbatim("Ground FLOOR access".into())
        );
    }

    #[test]
    fn test_clean_features_keeps_order_and_duplicates() {
        let raw = strings(&["  Pool View, ", "", " , ", "Balcony,,", "Pool View"]);
        assert_eq!(
            clean_features(&raw),
            vec!["Pool View", "Balcony,", "Pool View"]
        );
    }

    #[test]
    fn test_normalize_builds_record() {
        let normalizer = Normalizer::new(identities(), "2 Bed / 2 Bath");
        let record = normalizer
            .normalize(&fragment(
                "Toscana at CV - Plan A",
                "2 Bed / 2 Bath",
                "$2,150",
                &["Pool View", "2nd Floor,", "Balcony,"],
            ))
            .unwrap();

        assert_eq!(record.apartment_identity, ApartmentIdentity::Known("Toscana".into()));
        assert_eq!(record.unit_label, "Bldg 5 / Apt 201");
        assert_eq!(record.price, 2150.0);
        assert_eq!(record.floor.to_string(), "2th Floor");
        assert_eq!(record.features, vec!["Pool View", "2nd Floor", "Balcony"]);
    }

    #[test]
    fn test_unit_type_gate_runs_before_price() {
        let normalizer = Normalizer::new(identities(), "2 Bed / 2 Bath");
        let result = normalizer.normalize(&fragment(
            "Cadiz",
            "1 Bed / 1 Bath",
            "Call for price",
            &[],
        ));
        assert_eq!(
            result,
            Err(SkipReason::UnitTypeMismatch { label: "1 Bed / 1 Bath".into() })
        );
    }

    #[test]
    fn test_unparseable_price_drops_fragment() {
        let normalizer = Normalizer::new(identities(), "2 Bed / 2 Bath");
        let result = normalizer.normalize(&fragment(
            "Cadiz",
            "2 Bed / 2 Bath",
            "Call for price",
            &[],
        ));
        assert_eq!(result, Err(SkipReason::UnparseablePrice("Call for price".into())));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = Normalizer::new(identities(), "2 Bed / 2 Bath");
        let raw = fragment("Milano B", "2 Bed / 2 Bath", "$2,300", &["Top floor unit"]);
        assert_eq!(normalizer.normalize(&raw), normalizer.normalize(&raw));
    }
}
