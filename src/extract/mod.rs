pub mod filter;
pub mod locator;
pub mod normalize;

pub use filter::PriceBand;
pub use locator::{locate_units, UnitSelectors};
pub use normalize::{IdentitySet, Normalizer};
