use anyhow::{Context, Result};
use route_boundary::GpsPing;
use tracing::warn;

use crate::config::Config;
use crate::provider::StateStore;
use crate::shift::{ShiftRecord, ShiftRoute};

/// A shift record together with the bytes it was loaded from.
#[derive(Debug, Clone)]
pub struct StoredShift {
    pub record: ShiftRecord,
    raw: Vec<u8>,
}

/// Retrieve a shift record.
///
/// # Errors
///
/// This function will return an error if there is an issue reading from
/// the state store, or if the stored record is malformed.
pub async fn get_shift(
    shift_id: &str, config: &Config, store: &impl StateStore,
) -> Result<Option<StoredShift>> {
    let key = config.shift_key(shift_id);
    let Some(raw) = store.get(&key).await? else {
        return Ok(None);
    };
    let record = serde_json::from_slice(&raw).context("deserializing shift record")?;
    Ok(Some(StoredShift { record, raw }))
}

/// Save a shift record, replacing any previous version.
///
/// # Errors
///
/// This function will return an error if the record cannot be serialized or
/// written to the state store.
pub async fn set_shift(
    shift: &ShiftRecord, config: &Config, store: &impl StateStore,
) -> Result<()> {
    let key = config.shift_key(&shift.id);
    let bytes = serde_json::to_vec(shift).context("serializing shift record")?;
    store.set(&key, &bytes).await.with_context(|| format!("writing {key}"))?;
    Ok(())
}

/// Record the derived route on a previously loaded shift.
///
/// The record is written as a whole. A write by someone else between loading
/// the shift and saving it is logged and overwritten.
///
/// # Errors
///
/// This function will return an error if the record cannot be serialized or
/// written to the state store.
pub async fn set_route(
    stored: StoredShift, route: ShiftRoute, config: &Config, store: &impl StateStore,
) -> Result<ShiftRecord> {
    let StoredShift { mut record, raw } = stored;
    record.route = Some(route);

    let key = config.shift_key(&record.id);
    let bytes = serde_json::to_vec(&record).context("serializing shift record")?;
    let replaced = store.set(&key, &bytes).await.with_context(|| format!("writing {key}"))?;

    if let Some(during) = replaced
        && during != raw
    {
        warn!(
            shift_id = %record.id,
            previous = %String::from_utf8_lossy(&raw),
            replaced = %String::from_utf8_lossy(&during),
            "shift record overwritten concurrently"
        );
    }

    Ok(record)
}

/// Retrieve the raw pings stored for a shift.
///
/// # Errors
///
/// This function will return an error if there is an issue reading from
/// the state store, or if the stored pings are malformed.
pub async fn get_pings(
    shift_id: &str, config: &Config, store: &impl StateStore,
) -> Result<Vec<GpsPing>> {
    let key = config.pings_key(shift_id);
    let Some(bytes) = store.get(&key).await? else {
        return Ok(Vec::new());
    };
    serde_json::from_slice(&bytes).context("deserializing stored pings")
}

/// Save the raw pings of an upload, replacing any earlier upload.
///
/// # Errors
///
/// This function will return an error if the pings cannot be serialized or
/// written to the state store.
pub async fn set_pings(
    shift_id: &str, pings: &[GpsPing], config: &Config, store: &impl StateStore,
) -> Result<()> {
    let key = config.pings_key(shift_id);
    let bytes = serde_json::to_vec(pings).context("serializing pings")?;
    store.set(&key, &bytes).await.with_context(|| format!("writing {key}"))?;
    Ok(())
}
