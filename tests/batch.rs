#![allow(missing_docs)]

use std::path::PathBuf;

use chrono::NaiveDate;
use fleet_route::gps_upload::{Config, ShiftRecord, StateStore, state};
use fleet_route::{MemoryStore, Upload, process_batch};
use pretty_assertions::assert_eq;

const HEADER: &str = "Mobile ID,Alias,GPS Time,Server Time,Location,Message,Latitude,Longitude\n";

fn shift_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

// Departure at 06:00, arrival at 06:40 confirmed by two stationary
// ignition-off pings.
fn route_csv(plate: &str) -> Vec<u8> {
    let rows = [
        ("06:00", "Ignition On", "-23.5500"),
        ("06:10", "Position", "-23.5600"),
        ("06:20", "Position", "-23.5700"),
        ("06:30", "Position", "-23.5800"),
        ("06:40", "Ignition Off", "-23.5900"),
        ("06:50", "Ignition Off", "-23.5900"),
        ("07:00", "Ignition Off", "-23.5900"),
    ];

    let mut csv = HEADER.to_string();
    for (time, message, latitude) in rows {
        csv.push_str(&format!(
            "{plate},Truck,2025-03-14 {time}:00,,Street,{message},{latitude},-46.6300\n"
        ));
    }
    csv.into_bytes()
}

fn snapshot_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fleet-route-{}-{name}.json", std::process::id()))
}

// Should process independent uploads and keep failures to their own shift.
#[tokio::test]
async fn mixed_batch() {
    let config = Config::default();
    let store = MemoryStore::new();
    for (id, plate) in [("1", "ABC1234"), ("2", "DEF5678"), ("3", "GHI9012")] {
        let shift = ShiftRecord::new(id, plate, shift_date());
        state::set_shift(&shift, &config, &store).await.expect("should store shift");
    }

    let uploads = vec![
        Upload { shift_id: "1".to_string(), csv: route_csv("ABC1234") },
        Upload { shift_id: "2".to_string(), csv: route_csv("ABC1234") },
        Upload { shift_id: "3".to_string(), csv: route_csv("GHI9012") },
        Upload { shift_id: "4".to_string(), csv: route_csv("JKL3456") },
    ];

    let results = process_batch(&uploads, &config, &store).await;
    let ids: Vec<&str> = results.iter().map(|r| r.shift_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);

    let outcome = results[0].result.as_ref().expect("should process");
    assert_eq!(outcome.message(), "GPS processed with confirmed departure and arrival");
    let end = outcome.route.end.as_ref().expect("should have end");
    assert_eq!(end.local_time, shift_date().and_hms_opt(6, 40, 0).unwrap());

    let rejected = results[1].result.as_ref().expect_err("should reject");
    assert_eq!(rejected.code(), "vehicle_mismatch");

    assert!(results[2].result.is_ok());

    let missing = results[3].result.as_ref().expect_err("should fail");
    assert_eq!(missing.code(), "not_found");

    // three shifts plus pings for the two accepted uploads
    assert_eq!(store.len().expect("should count"), 5);
    assert!(store.get(&config.pings_key("2")).await.expect("should read").is_none());
}

// Should restore every entry from a saved snapshot.
#[tokio::test]
async fn snapshot() {
    let config = Config::default();
    let path = snapshot_path("snapshot");
    let store = MemoryStore::new();

    let shift = ShiftRecord::new("1", "ABC1234", shift_date());
    state::set_shift(&shift, &config, &store).await.expect("should store shift");
    let uploads = vec![Upload { shift_id: "1".to_string(), csv: route_csv("ABC1234") }];
    let results = process_batch(&uploads, &config, &store).await;
    assert!(results[0].result.is_ok());

    store.save(&path).await.expect("should save");
    let restored = MemoryStore::load(&path).await.expect("should load");
    std::fs::remove_file(&path).expect("should remove snapshot");

    assert_eq!(restored.len().expect("should count"), 2);
    let stored = state::get_shift("1", &config, &restored)
        .await
        .expect("should load shift")
        .expect("should exist");
    assert!(stored.record.route.expect("should record route").end.is_some());

    let pings = state::get_pings("1", &config, &restored).await.expect("should load pings");
    assert_eq!(pings.len(), 7);
}

#[tokio::test]
async fn missing_snapshot() {
    let store = MemoryStore::load(&snapshot_path("missing")).await.expect("should load");
    assert!(store.is_empty().expect("should count"));
}

#[tokio::test]
async fn corrupt_snapshot() {
    let path = snapshot_path("corrupt");
    std::fs::write(&path, b"not json").expect("should write");

    let result = MemoryStore::load(&path).await;
    std::fs::remove_file(&path).expect("should remove snapshot");

    let err = result.expect_err("should fail");
    assert!(err.to_string().starts_with("parsing snapshot"));
}
