//! # Route Boundary
//!
//! Detects where a vehicle's operational route really starts and ends within
//! the raw GPS pings reported over a shift.
//!
//! The detector is a pure function of its input: it holds no state, performs
//! no I/O and never mutates the pings it is given, so independent shifts can
//! be processed in parallel without coordination.

mod config;
mod detector;
mod error;
mod movement;
mod ping;
mod summary;

pub use self::config::{Cadence, DetectorConfig, ScanWindows, average_interval};
pub use self::detector::{Detector, RouteBoundary, detect};
pub use self::error::{Error, Result};
pub use self::movement::{DEFAULT_THRESHOLD_DEG, MovementThreshold};
pub use self::ping::{GpsPing, IgnitionEvent};
pub use self::summary::RouteSummary;
