//! # Fleet Route
//!
//! Host-side wiring for route boundary detection: an in-memory state store
//! and concurrent processing of GPS uploads.

mod batch;
mod store;

pub use gps_upload;
pub use route_boundary;

pub use self::batch::{BatchResult, Upload, process_batch};
pub use self::store::MemoryStore;
