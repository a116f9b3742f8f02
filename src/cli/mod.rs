//! CLI commands and terminal presentation

mod context;
mod land;
mod status;
mod style;
mod sync;

pub use land::{LandOptions, run_land};
pub use status::run_status;
pub use sync::run_sync;
