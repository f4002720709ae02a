pub mod browser;
pub mod http;
pub mod traits;
pub mod types;

pub use browser::BrowserPageSource;
pub use http::{FilePageSource, StaticPageSource};
pub use traits::PageSource;
