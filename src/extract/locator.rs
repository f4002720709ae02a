use crate::config::SelectorConfig;
use crate::error::{ScrapeError, SkipReason};
use crate::models::{FloorPlanGroup, RawUnitFragment};
use scraper::{ElementRef, Html, Selector};

/// Selectors needed to pull unit rows out of a rendered listing page.
#[derive(Debug)]
pub struct UnitSelectors {
    unit_row: Selector,
    group: Selector,
    plan_name: Selector,
    beds_baths: Selector,
    unit_name: Selector,
    term: Selector,
    price: Selector,
    availability: Selector,
    features: Selector,
    feature_item: Selector,
}

impl UnitSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            unit_row: parse(&config.unit_row)?,
            group: parse(&config.floor_plan_item)?,
            plan_name: parse(&config.plan_name)?,
            beds_baths: parse(&config.beds_baths)?,
            unit_name: parse(&config.unit_name)?,
            term: parse(&config.term)?,
            price: parse(&config.price)?,
            availability: parse(&config.availability)?,
            features: parse(&config.features)?,
            feature_item: parse(&config.feature_item)?,
        })
    }
}

pub(crate) fn parse(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Walk every unit row of `document` in document order.
///
/// Rows that cannot produce a complete fragment come out as `Err` so the
/// caller can count them; nothing here aborts the walk.
pub fn locate_units<'a>(
    document: &'a Html,
    selectors: &'a UnitSelectors,
) -> impl Iterator<Item = Result<RawUnitFragment, SkipReason>> + 'a {
    document
        .select(&selectors.unit_row)
        .map(move |row| extract_row(row, selectors))
}

fn extract_row(row: ElementRef<'_>, sel: &UnitSelectors) -> Result<RawUnitFragment, SkipReason> {
    let group_el =
        enclosing_group(row, &sel.group).ok_or(SkipReason::MissingField("floor plan group"))?;

    let plan_name = group_el
        .select(&sel.plan_name)
        .next()
        .map(text_of)
        .filter(|name| !name.is_empty());

    let unit_name = first(row, &sel.unit_name, "unit name")?;
    let beds_baths = group_el
        .select(&sel.beds_baths)
        .next()
        .map(collapsed_text_of)
        .ok_or(SkipReason::MissingField("beds/baths"))?;
    let term = first(row, &sel.term, "term")?;
    let price = first(row, &sel.price, "price")?;
    let availability = first(row, &sel.availability, "availability")?;
    let features_el = row
        .select(&sel.features)
        .next()
        .ok_or(SkipReason::MissingField("features"))?;

    let features = features_el
        .select(&sel.feature_item)
        .map(|item| item.text().collect::<String>())
        .collect();

    Ok(RawUnitFragment {
        unit_label: text_of(unit_name),
        term: text_of(term),
        price: text_of(price),
        availability: text_of(availability),
        features,
        group: FloorPlanGroup {
            plan_name,
            beds_baths,
        },
    })
}

fn first<'a>(
    row: ElementRef<'a>,
    selector: &Selector,
    field: &'static str,
) -> Result<ElementRef<'a>, SkipReason> {
    row.select(selector)
        .next()
        .ok_or(SkipReason::MissingField(field))
}

/// Nearest ancestor of `row` matching the floor-plan group selector.
fn enclosing_group<'a>(row: ElementRef<'a>, group: &Selector) -> Option<ElementRef<'a>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| group.matches(ancestor))
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

// Labels are sometimes split across spans; join the pieces with single spaces.
fn collapsed_text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
