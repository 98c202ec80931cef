//! Decoding of the provider's tabular GPS export.
//!
//! The export has one row per fix with the columns mobile id, alias, GPS
//! time, server time, location, message, latitude and longitude. Header
//! names vary between provider accounts, so they are matched after
//! normalisation and against a set of aliases.

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord, Trim};
use route_boundary::GpsPing;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M",
];

/// One row of the export. Alias and server time columns are not used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Row {
    #[serde(alias = "mobile", alias = "asset_id", alias = "asset", alias = "vehicle")]
    mobile_id: String,

    #[serde(alias = "gps_timestamp", alias = "gps_date", alias = "timestamp")]
    gps_time: String,

    #[serde(alias = "location_label", alias = "address")]
    location: String,

    #[serde(alias = "event")]
    message: String,

    #[serde(alias = "lat")]
    latitude: String,

    #[serde(alias = "lng", alias = "lon")]
    longitude: String,
}

/// Decodes a CSV export into pings sorted by GPS time.
///
/// Rows without a mobile id or GPS time are skipped.
///
/// # Errors
///
/// Returns `Error::InvalidFormat` when the CSV is malformed or a coordinate
/// cannot be parsed, `Error::InvalidTimestamp` for an unrecognised GPS time
/// and `Error::NoData` when no usable rows remain.
pub fn decode(bytes: &[u8]) -> Result<Vec<GpsPing>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(bytes);
    let headers: StringRecord = reader.headers()?.iter().map(normalize_header).collect();
    reader.set_headers(headers.clone());

    let mut pings = Vec::new();
    let mut skipped = 0_usize;

    for (index, record) in reader.records().enumerate() {
        // header is line 1
        let line = index + 2;
        let row: Row = record?.deserialize(Some(&headers))?;

        if row.mobile_id.is_empty() || row.gps_time.is_empty() {
            debug!(line, "skipping row without mobile id or GPS time");
            skipped += 1;
            continue;
        }

        let timestamp = parse_timestamp(&row.gps_time).ok_or_else(|| {
            let raw = &row.gps_time;
            Error::InvalidTimestamp(format!("line {line}: unrecognised GPS time {raw:?}"))
        })?;
        let latitude = parse_coordinate(&row.latitude, "latitude", line)?;
        let longitude = parse_coordinate(&row.longitude, "longitude", line)?;

        pings.push(
            GpsPing::new(row.mobile_id, timestamp, latitude, longitude, row.message)
                .with_location(row.location),
        );
    }

    if pings.is_empty() {
        return Err(Error::NoData);
    }

    pings.sort_by_key(|ping| ping.timestamp);
    info!(decoded = pings.len(), skipped, "decoded GPS upload");

    Ok(pings)
}

/// Parses a provider-local GPS timestamp.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS.iter().find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn parse_coordinate(raw: &str, name: &str, line: usize) -> Result<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .map_err(|err| Error::InvalidFormat(format!("line {line}: invalid {name} {raw:?}: {err}")))
}

fn normalize_header(header: &str) -> String {
    let lower = header.trim().to_lowercase();
    let mut normalized = String::with_capacity(lower.len());
    for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|word| !word.is_empty()) {
        if !normalized.is_empty() {
            normalized.push('_');
        }
        normalized.push_str(word);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn header_normalisation() {
        assert_eq!(normalize_header("Mobile ID"), "mobile_id");
        assert_eq!(normalize_header(" GPS Time "), "gps_time");
        assert_eq!(normalize_header("Location/Label"), "location_label");
        assert_eq!(normalize_header("LATITUDE"), "latitude");
    }

    #[test]
    fn timestamp_formats() {
        let expected =
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap().and_hms_opt(6, 5, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-14 06:05:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-14T06:05:00"), Some(expected));
        assert_eq!(parse_timestamp("14/03/2025 06:05:00"), Some(expected));
        assert_eq!(parse_timestamp("14/03/2025 06:05"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn decimal_comma() {
        let value = parse_coordinate("-23,5505", "latitude", 2).expect("should parse");
        assert!((value + 23.5505).abs() < f64::EPSILON);
    }

    #[test]
    fn minimal_columns() {
        let csv = "Mobile ID,GPS Time,Message,Latitude,Longitude\n\
                   ABC1234,2025-03-14 06:00:00,Ignition On,-23.55,-46.63\n";
        let pings = decode(csv.as_bytes()).expect("should decode");

        assert_eq!(pings.len(), 1);
        assert!(pings[0].is_ignition_on());
        assert_eq!(pings[0].location_label, "");
    }
}
