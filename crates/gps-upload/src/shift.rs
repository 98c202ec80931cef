use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use route_boundary::{GpsPing, RouteBoundary, RouteSummary};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A vehicle's work shift as held by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub id: String,
    /// Registration plate of the vehicle expected on this shift.
    pub vehicle_plate: String,
    pub shift_date: NaiveDate,
    /// Last date covered by the shift when it runs past midnight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Route derived from the most recent GPS upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<ShiftRoute>,
}

impl ShiftRecord {
    #[must_use]
    pub fn new(
        id: impl Into<String>, vehicle_plate: impl Into<String>, shift_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            vehicle_plate: vehicle_plate.into(),
            shift_date,
            end_date: None,
            route: None,
        }
    }

    #[must_use]
    pub fn covers(&self, date: NaiveDate) -> bool {
        let last = self.end_date.unwrap_or(self.shift_date).max(self.shift_date);
        (self.shift_date..=last).contains(&date)
    }

    /// Checks that an upload belongs to this shift.
    ///
    /// Every ping must come from the shift's vehicle and the upload must
    /// start on a date the shift covers.
    ///
    /// # Errors
    ///
    /// Returns `Error::VehicleMismatch` or `Error::DateMismatch` when the
    /// upload belongs elsewhere, and `Error::NoData` when it is empty.
    pub fn validate_upload(&self, pings: &[GpsPing]) -> Result<()> {
        let Some(first) = pings.first() else {
            return Err(Error::NoData);
        };

        let expected = normalize_plate(&self.vehicle_plate);
        if let Some(other) = pings.iter().find(|ping| normalize_plate(&ping.asset_id) != expected) {
            return Err(Error::VehicleMismatch(format!(
                "upload vehicle {} does not match shift vehicle {}",
                other.asset_id, self.vehicle_plate
            )));
        }

        let upload_date = first.timestamp.date();
        if !self.covers(upload_date) {
            return Err(Error::DateMismatch(format!(
                "upload date {upload_date} is outside shift {} on {}",
                self.id, self.shift_date
            )));
        }

        Ok(())
    }
}

/// Route boundaries recorded on a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRoute {
    pub start: Option<RouteEvent>,
    pub end: Option<RouteEvent>,
    pub total_pings: usize,
    pub summary: RouteSummary,
    pub processed_at: DateTime<Utc>,
}

impl ShiftRoute {
    /// Resolves detected boundaries into the values stored on the shift.
    #[must_use]
    pub fn from_boundary(boundary: &RouteBoundary, pings: &[GpsPing], timezone: Tz) -> Self {
        Self {
            start: boundary.start_ping(pings).map(|ping| RouteEvent::from_ping(ping, timezone)),
            end: boundary.end_ping(pings).map(|ping| RouteEvent::from_ping(ping, timezone)),
            total_pings: boundary.total_pings,
            summary: boundary.summary.clone(),
            processed_at: Utc::now(),
        }
    }
}

/// A confirmed departure or arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEvent {
    /// Provider-local time of the ping.
    pub local_time: NaiveDateTime,
    /// `None` when the local time does not exist in the configured zone.
    pub utc_time: Option<DateTime<Utc>>,
    pub location_label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl RouteEvent {
    #[must_use]
    pub fn from_ping(ping: &GpsPing, timezone: Tz) -> Self {
        let utc_time = timezone
            .from_local_datetime(&ping.timestamp)
            .earliest()
            .map(|local| local.with_timezone(&Utc));

        Self {
            local_time: ping.timestamp,
            utc_time,
            location_label: ping.location_label.clone(),
            latitude: ping.latitude,
            longitude: ping.longitude,
        }
    }
}

fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn ping(asset_id: &str, day: u32, hour: u32) -> GpsPing {
        GpsPing::new(asset_id, date(day).and_hms_opt(hour, 0, 0).unwrap(), 1.0, 1.0, "")
    }

    #[test]
    fn plate_normalisation() {
        assert_eq!(normalize_plate("abc-1234"), "ABC1234");
        assert_eq!(normalize_plate(" ABC 1234 "), "ABC1234");
    }

    #[test]
    fn matching_upload() {
        let shift = ShiftRecord::new("42", "ABC-1234", date(14));
        let pings = vec![ping("abc1234", 14, 6), ping("ABC 1234", 14, 17)];
        assert!(shift.validate_upload(&pings).is_ok());
    }

    #[test]
    fn vehicle_mismatch() {
        let shift = ShiftRecord::new("42", "ABC1234", date(14));
        let pings = vec![ping("ABC1234", 14, 6), ping("XYZ9876", 14, 7)];

        let err = shift.validate_upload(&pings).expect_err("should reject");
        assert_eq!(
            err,
            Error::VehicleMismatch(
                "upload vehicle XYZ9876 does not match shift vehicle ABC1234".to_string()
            )
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn date_mismatch() {
        let shift = ShiftRecord::new("42", "ABC1234", date(14));
        let err = shift.validate_upload(&[ping("ABC1234", 15, 6)]).expect_err("should reject");
        assert_eq!(err.code(), "date_mismatch");
    }

    #[test]
    fn overnight_shift() {
        let shift =
            ShiftRecord { end_date: Some(date(15)), ..ShiftRecord::new("42", "ABC1234", date(14)) };
        assert!(shift.covers(date(15)));
        assert!(!shift.covers(date(16)));
        assert!(!shift.covers(date(13)));
    }

    #[test]
    fn empty_upload() {
        let shift = ShiftRecord::new("42", "ABC1234", date(14));
        assert_eq!(shift.validate_upload(&[]), Err(Error::NoData));
    }

    #[test]
    fn event_in_zone() {
        let ping = ping("ABC1234", 14, 6).with_location("Depot");
        let event = RouteEvent::from_ping(&ping, chrono_tz::America::Sao_Paulo);

        assert_eq!(event.location_label, "Depot");
        assert_eq!(event.utc_time, Some(Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()));
    }
}
