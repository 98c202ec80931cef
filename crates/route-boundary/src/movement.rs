use serde::{Deserialize, Serialize};

use crate::ping::GpsPing;

/// Roughly 100 m at mid-latitudes.
pub const DEFAULT_THRESHOLD_DEG: f64 = 0.001;

/// Decides whether two pings are at the same place.
///
/// Pings are the same place when both the latitude and longitude deltas are
/// within the threshold. Exceeding it on either axis counts as movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementThreshold {
    degrees: f64,
}

impl MovementThreshold {
    #[must_use]
    pub const fn new(degrees: f64) -> Self {
        Self { degrees }
    }

    /// Returns `None` unless `degrees` is finite and not negative.
    #[must_use]
    pub fn checked(degrees: f64) -> Option<Self> {
        (degrees.is_finite() && degrees >= 0.0).then_some(Self { degrees })
    }

    #[must_use]
    pub const fn degrees(&self) -> f64 {
        self.degrees
    }

    #[must_use]
    pub fn same_place(&self, from: &GpsPing, to: &GpsPing) -> bool {
        (to.latitude - from.latitude).abs() <= self.degrees
            && (to.longitude - from.longitude).abs() <= self.degrees
    }

    #[must_use]
    pub fn has_moved(&self, from: &GpsPing, to: &GpsPing) -> bool {
        !self.same_place(from, to)
    }
}

impl Default for MovementThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_DEG)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ping(latitude: f64, longitude: f64) -> GpsPing {
        let timestamp =
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(6, 0, 0).unwrap();
        GpsPing::new("ABC1234", timestamp, latitude, longitude, "")
    }

    #[test]
    fn identical_position() {
        let threshold = MovementThreshold::default();
        assert!(threshold.same_place(&ping(1.0, 1.0), &ping(1.0, 1.0)));
    }

    #[test]
    fn within_threshold() {
        let threshold = MovementThreshold::default();
        assert!(threshold.same_place(&ping(1.0, 1.0), &ping(1.0005, 0.9995)));
        assert!(threshold.same_place(&ping(1.0, 1.0), &ping(1.001, 1.0)));
    }

    #[test]
    fn either_axis_moves() {
        let threshold = MovementThreshold::default();
        assert!(threshold.has_moved(&ping(1.0, 1.0), &ping(1.002, 1.0)));
        assert!(threshold.has_moved(&ping(1.0, 1.0), &ping(1.0, 0.998)));
        assert!(threshold.has_moved(&ping(-23.5, -46.6), &ping(-23.503, -46.6)));
    }

    #[test]
    fn checked_degrees() {
        assert_eq!(MovementThreshold::checked(0.005), Some(MovementThreshold::new(0.005)));
        assert_eq!(MovementThreshold::checked(0.0), Some(MovementThreshold::new(0.0)));
        assert_eq!(MovementThreshold::checked(-0.001), None);
        assert_eq!(MovementThreshold::checked(f64::NAN), None);
        assert_eq!(MovementThreshold::checked(f64::INFINITY), None);
    }

    #[test]
    fn custom_threshold() {
        let threshold = MovementThreshold::new(0.01);
        assert!(threshold.same_place(&ping(1.0, 1.0), &ping(1.005, 1.0)));
        assert!(threshold.has_moved(&ping(1.0, 1.0), &ping(1.02, 1.0)));
    }
}
