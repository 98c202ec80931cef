//! Processing of a GPS upload against a shift.
//!
//! An upload is decoded, validated against the shift it was submitted for,
//! run through route boundary detection and persisted. Validation failures
//! reject the upload before anything is written.

use route_boundary::Detector;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::provider::StateStore;
use crate::record;
use crate::shift::ShiftRoute;
use crate::state;

/// Result of processing one upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub shift_id: String,
    pub pings_stored: usize,
    pub route: ShiftRoute,
}

impl UploadOutcome {
    /// Operator-facing description of what was detected.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match (self.route.start.is_some(), self.route.end.is_some()) {
            (true, true) => "GPS processed with confirmed departure and arrival",
            (true, false) => "GPS processed but no confirmed arrival detected",
            (false, true) => "GPS processed but no confirmed departure detected",
            (false, false) => "GPS processed but no confirmed departure or arrival detected",
        }
    }
}

/// Decodes, validates, detects and stores a GPS upload for `shift_id`.
///
/// A route with no confirmed departure or arrival is still stored; only a
/// rejected or malformed upload leaves the shift untouched.
///
/// The pings are written before the route and the two writes are not
/// atomic. When saving the route fails, the new pings sit next to the
/// previous route until the upload is retried.
///
/// # Errors
///
/// Returns `Error::NotFound` for an unknown shift, the decoding and
/// validation errors of [`record::decode`] and
/// [`ShiftRecord::validate_upload`](crate::shift::ShiftRecord::validate_upload),
/// and `Error::ServerError` when the state store fails.
pub async fn process_upload(
    shift_id: &str, csv: &[u8], config: &Config, store: &impl StateStore,
) -> Result<UploadOutcome> {
    let Some(stored) = state::get_shift(shift_id, config, store).await? else {
        return Err(Error::NotFound(format!("shift {shift_id}")));
    };

    let pings = record::decode(csv)?;
    if let Err(err) = stored.record.validate_upload(&pings) {
        warn!(shift_id, code = err.code(), "rejecting GPS upload");
        return Err(err);
    }

    let boundary = Detector::new(config.detector.clone()).detect(&pings)?;
    let route = ShiftRoute::from_boundary(&boundary, &pings, config.timezone);

    state::set_pings(shift_id, &pings, config, store).await?;
    let shift = state::set_route(stored, route, config, store).await?;

    let Some(route) = shift.route else {
        return Err(Error::ServerError(format!("route missing on shift {shift_id}")));
    };

    info!(
        shift_id,
        pings = pings.len(),
        start = ?route.start.as_ref().map(|event| event.local_time),
        end = ?route.end.as_ref().map(|event| event.local_time),
        "processed GPS upload"
    );

    Ok(UploadOutcome { shift_id: shift_id.to_string(), pings_stored: pings.len(), route })
}
