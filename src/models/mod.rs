//! # Models Module
//!
//! Contains the record types and status state machines for the job core.

mod app_state;
pub use app_state::*;

mod audit;
pub use audit::*;

mod error;
pub use error::*;

mod export;
pub use export::*;

mod media;
pub use media::*;

mod notification;
pub use notification::*;

mod pagination;
pub use pagination::*;

mod recruitment;
pub use recruitment::*;
