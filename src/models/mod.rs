use std::fmt;

/// Label written when no feature string mentions a floor.
pub const FLOOR_NOT_AVAILABLE: &str = "N/A";

/// Which known property a unit belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApartmentIdentity {
    Known(String),
    Unknown,
}

impl fmt::Display for ApartmentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApartmentIdentity::Known(name) => f.write_str(name),
            ApartmentIdentity::Unknown => f.write_str("unknown"),
        }
    }
}

/// Floor of a unit as derived from its feature strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloorLabel {
    /// Rendered as `{n}th Floor` whatever suffix the site used.
    Ordinal(u32),
    /// A feature mentioning "floor" without a leading number.
    Verbatim(String),
    NotAvailable,
}

impl fmt::Display for FloorLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloorLabel::Ordinal(n) => write!(f, "{n}th Floor"),
            FloorLabel::Verbatim(text) => f.write_str(text),
            FloorLabel::NotAvailable => f.write_str(FLOOR_NOT_AVAILABLE),
        }
    }
}

/// One expandable floor-plan section of the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorPlanGroup {
    /// Absent when the group header carries no plan name.
    pub plan_name: Option<String>,
    /// Aggregate label such as "2 Bed / 2 Bath".
    pub beds_baths: String,
}

/// Text found in one unit row, before any interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnitFragment {
    pub unit_label: String,
    pub term: String,
    pub price: String,
    pub availability: String,
    /// Untrimmed text of every feature element, in document order.
    pub features: Vec<String>,
    pub group: FloorPlanGroup,
}

/// Canonical record for one bookable unit
#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentRecord {
    pub apartment_identity: ApartmentIdentity,
    pub unit_label: String,
    pub term: String,
    pub price: f64,
    pub availability: String,
    pub floor: FloorLabel,
    pub features: Vec<String>,
}

impl ApartmentRecord {
    /// Price as shown to people, e.g. `$2,450`.
    pub fn price_display(&self) -> String {
        format_usd(self.price)
    }
}

/// Format a dollar amount rounded to whole dollars with thousands separators.
pub fn format_usd(amount: f64) -> String {
    let whole = amount.round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
