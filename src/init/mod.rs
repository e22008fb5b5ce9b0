//! Application wiring: state construction and worker startup.

mod initialize_app_state;
pub use initialize_app_state::*;

mod initialize_workers;
pub use initialize_workers::*;
