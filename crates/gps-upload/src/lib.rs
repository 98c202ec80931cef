//! # GPS Upload
//!
//! Decodes a fleet provider's GPS export, checks that it belongs to the shift
//! it was uploaded for, detects the route boundaries and records them on the
//! shift.

pub mod config;
pub mod error;
pub mod provider;
pub mod record;
pub mod shift;
pub mod state;
pub mod workflow;

pub use self::config::Config;
pub use self::error::{Error, Result};
pub use self::provider::StateStore;
pub use self::shift::{RouteEvent, ShiftRecord, ShiftRoute};
pub use self::workflow::{UploadOutcome, process_upload};
