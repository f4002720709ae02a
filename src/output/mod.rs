pub mod notify;
pub mod table;

pub use notify::{Notification, RunOutcome};
pub use table::write_table;
