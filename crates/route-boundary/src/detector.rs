//! Start and end detection.
//!
//! Both scans walk the candidate pings of one ignition state and verify each
//! candidate against the pings that immediately follow it. The start scan
//! runs forward over ignition-on pings and confirms a candidate as soon as
//! the vehicle is seen to move. The end scan runs backward over ignition-off
//! pings and confirms a candidate when the vehicle stays off and in place.
//!
//! The scans are independent. In unusual data the confirmed end can precede
//! the confirmed start; callers that care must check the ordering themselves.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{DetectorConfig, ScanWindows};
use crate::error::{Error, Result};
use crate::movement::MovementThreshold;
use crate::ping::{GpsPing, IgnitionEvent};
use crate::summary::RouteSummary;

/// Boundaries detected in a ping sequence.
///
/// `start` and `end` index into the sequence passed to [`Detector::detect`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBoundary {
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub total_pings: usize,
    pub summary: RouteSummary,
}

impl RouteBoundary {
    /// The confirmed departure ping, resolved against the detected sequence.
    #[must_use]
    pub fn start_ping<'a>(&self, pings: &'a [GpsPing]) -> Option<&'a GpsPing> {
        self.start.and_then(|index| pings.get(index))
    }

    /// The confirmed arrival ping, resolved against the detected sequence.
    #[must_use]
    pub fn end_ping<'a>(&self, pings: &'a [GpsPing]) -> Option<&'a GpsPing> {
        self.end.and_then(|index| pings.get(index))
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// Detects route boundaries using the default configuration.
///
/// # Errors
///
/// Returns [`Error::PreconditionViolation`] when `pings` is empty, holds an
/// invalid coordinate, or is not ordered by timestamp.
pub fn detect(pings: &[GpsPing]) -> Result<RouteBoundary> {
    Detector::default().detect(pings)
}

#[derive(Debug, Clone, Default)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    #[must_use]
    pub const fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Finds the confirmed start and end of the route in `pings`.
    ///
    /// `pings` must already be sorted ascending by timestamp; the detector
    /// checks the ordering but never sorts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreconditionViolation`] when `pings` is empty, holds an
    /// invalid coordinate, or is not ordered by timestamp, and when the
    /// configured movement threshold is negative or not finite.
    pub fn detect(&self, pings: &[GpsPing]) -> Result<RouteBoundary> {
        let threshold = self.config.movement_threshold;
        if MovementThreshold::checked(threshold.degrees()).is_none() {
            return Err(Error::PreconditionViolation(format!(
                "movement threshold {} must be finite and not negative",
                threshold.degrees()
            )));
        }
        validate(pings)?;

        let windows = self.config.windows(pings);
        debug!(
            pings = pings.len(),
            lookahead = windows.lookahead,
            verification = windows.verification,
            min_stationary = windows.min_stationary,
            "detecting route boundaries"
        );

        let start = find_start(pings, &windows, threshold);
        let end = find_end(pings, &windows, threshold);
        debug!(?start, ?end, "route boundary detection complete");

        Ok(RouteBoundary {
            start,
            end,
            total_pings: pings.len(),
            summary: RouteSummary::from_pings(pings),
        })
    }
}

fn validate(pings: &[GpsPing]) -> Result<()> {
    if pings.is_empty() {
        return Err(Error::PreconditionViolation("ping sequence is empty".to_string()));
    }

    if let Some((index, ping)) = pings.iter().enumerate().find(|(_, p)| !p.has_valid_coordinates())
    {
        return Err(Error::PreconditionViolation(format!(
            "ping {index} has invalid coordinates ({}, {})",
            ping.latitude, ping.longitude
        )));
    }

    if let Some(index) = pings.windows(2).position(|pair| pair[1].timestamp < pair[0].timestamp) {
        return Err(Error::PreconditionViolation(format!(
            "ping {} at {} is earlier than ping {index} at {}",
            index + 1,
            pings[index + 1].timestamp,
            pings[index].timestamp
        )));
    }

    Ok(())
}

fn find_start(
    pings: &[GpsPing], windows: &ScanWindows, threshold: MovementThreshold,
) -> Option<usize> {
    let candidates = candidates(pings, IgnitionEvent::On);
    scan(pings, candidates, windows.lookahead, |candidate, following| {
        following.iter().any(|ping| threshold.has_moved(candidate, ping))
    })
}

fn find_end(
    pings: &[GpsPing], windows: &ScanWindows, threshold: MovementThreshold,
) -> Option<usize> {
    let candidates = candidates(pings, IgnitionEvent::Off).rev();
    scan(pings, candidates, windows.verification, |candidate, following| {
        let mut stationary = 0;
        for ping in following {
            if ping.is_ignition_on() || threshold.has_moved(candidate, ping) {
                return false;
            }
            if ping.is_ignition_off() {
                stationary += 1;
            }
        }
        stationary >= windows.min_stationary
    })
}

fn candidates(
    pings: &[GpsPing], event: IgnitionEvent,
) -> impl DoubleEndedIterator<Item = usize> + '_ {
    pings.iter().enumerate().filter(move |(_, p)| p.ignition == event).map(|(index, _)| index)
}

// Returns the first candidate confirmed against the pings that follow it.
// The follow-up window is clamped to the end of the sequence.
fn scan<F>(
    pings: &[GpsPing], mut candidates: impl Iterator<Item = usize>, window: usize, confirm: F,
) -> Option<usize>
where
    F: Fn(&GpsPing, &[GpsPing]) -> bool,
{
    candidates.find(|&index| {
        let from = index + 1;
        let to = from.saturating_add(window).min(pings.len());
        let confirmed = confirm(&pings[index], &pings[from..to]);
        if !confirmed {
            trace!(index, timestamp = %pings[index].timestamp, "candidate rejected");
        }
        confirmed
    })
}
