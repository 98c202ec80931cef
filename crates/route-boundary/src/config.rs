use std::time::Duration;

use crate::movement::MovementThreshold;
use crate::ping::GpsPing;

const DEFAULT_MOVEMENT_LOOKAHEAD: Duration = Duration::from_secs(100 * 60);
const DEFAULT_STOP_VERIFICATION: Duration = Duration::from_secs(50 * 60);
const DEFAULT_MIN_STATIONARY: Duration = Duration::from_secs(20 * 60);
const DEFAULT_REPORTING_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// How the provider's reporting interval is determined when converting the
/// configured durations into ping counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Use the average interval between consecutive pings of the sequence,
    /// or `fallback` when the sequence has no usable span.
    Observed { fallback: Duration },

    /// Assume the provider reports at exactly this interval.
    Fixed(Duration),
}

impl Default for Cadence {
    fn default() -> Self {
        Self::Fixed(DEFAULT_REPORTING_INTERVAL)
    }
}

/// Tunable thresholds for route boundary detection.
///
/// Windows are expressed as durations and converted to ping counts using the
/// configured [`Cadence`]. The default assumes a 10 minute reporting
/// interval, giving look-ahead, verification and stationary counts of 10, 5
/// and 2 pings.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Maximum coordinate delta still considered the same place.
    pub movement_threshold: MovementThreshold,

    /// How far past an ignition-on candidate to look for movement.
    pub movement_lookahead: Duration,

    /// How far past an ignition-off candidate to check that the vehicle
    /// stayed off and in place.
    pub stop_verification: Duration,

    /// Time the vehicle must be seen stationary with the ignition off for an
    /// ignition-off candidate to be confirmed.
    pub min_stationary: Duration,

    pub cadence: Cadence,
}

impl DetectorConfig {
    /// Measures the reporting interval from each sequence instead of
    /// assuming 10 minutes.
    ///
    /// The interval is averaged over the whole sequence, so dense driving
    /// pings shorten it for the stop at the end of the shift too.
    #[must_use]
    pub fn observed() -> Self {
        Self {
            cadence: Cadence::Observed { fallback: DEFAULT_REPORTING_INTERVAL },
            ..Self::default()
        }
    }

    /// Converts the configured durations into ping counts for `pings`.
    #[must_use]
    pub fn windows(&self, pings: &[GpsPing]) -> ScanWindows {
        let interval = match self.cadence {
            Cadence::Fixed(interval) => interval,
            Cadence::Observed { fallback } => average_interval(pings).unwrap_or(fallback),
        };

        ScanWindows {
            lookahead: pings_in(self.movement_lookahead, interval),
            verification: pings_in(self.stop_verification, interval),
            min_stationary: pings_in(self.min_stationary, interval),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            movement_threshold: MovementThreshold::default(),
            movement_lookahead: DEFAULT_MOVEMENT_LOOKAHEAD,
            stop_verification: DEFAULT_STOP_VERIFICATION,
            min_stationary: DEFAULT_MIN_STATIONARY,
            cadence: Cadence::default(),
        }
    }
}

/// Ping counts used by a single detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindows {
    /// Pings inspected after an ignition-on candidate.
    pub lookahead: usize,
    /// Pings inspected after an ignition-off candidate.
    pub verification: usize,
    /// Stationary ignition-off pings needed to confirm an end.
    pub min_stationary: usize,
}

/// Average time between consecutive pings, `None` for fewer than two pings
/// or when the sequence spans no time.
#[must_use]
pub fn average_interval(pings: &[GpsPing]) -> Option<Duration> {
    let (first, last) = (pings.first()?, pings.last()?);
    let gaps = u32::try_from(pings.len() - 1).ok().filter(|gaps| *gaps > 0)?;
    let span = (last.timestamp - first.timestamp).to_std().ok()?;
    let average = span / gaps;
    (!average.is_zero()).then_some(average)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pings_in(duration: Duration, interval: Duration) -> usize {
    if interval.is_zero() {
        return 1;
    }
    let count = (duration.as_secs_f64() / interval.as_secs_f64()).round() as usize;
    count.max(1)
}
