use futures::future::join_all;
use gps_upload::{Config, StateStore, UploadOutcome, process_upload};
use tracing::info;

/// A GPS export waiting to be processed for a shift.
#[derive(Debug, Clone)]
pub struct Upload {
    pub shift_id: String,
    pub csv: Vec<u8>,
}

/// Result of one upload in a batch.
#[derive(Debug)]
pub struct BatchResult {
    pub shift_id: String,
    pub result: gps_upload::Result<UploadOutcome>,
}

/// Processes uploads concurrently against the same store.
///
/// Uploads are independent: a rejected or failed upload does not affect the
/// others. Results are returned in the order of `uploads`.
pub async fn process_batch(
    uploads: &[Upload], config: &Config, store: &impl StateStore,
) -> Vec<BatchResult> {
    let results = join_all(
        uploads.iter().map(|upload| process_upload(&upload.shift_id, &upload.csv, config, store)),
    )
    .await;

    let results: Vec<BatchResult> = uploads
        .iter()
        .zip(results)
        .map(|(upload, result)| BatchResult { shift_id: upload.shift_id.clone(), result })
        .collect();

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    info!(uploads = results.len(), failed, "processed GPS upload batch");

    results
}
