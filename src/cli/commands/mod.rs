//! Command implementations

mod list;
mod run;
mod worker;

pub use list::list;
pub use run::run;
pub use worker::worker;
