//! Dataset lifecycle commands: load a new upload generation, clear
//! it, and report store status to the upload/debug screens.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::commands::AppState;
use crate::dataset::Dataset;
use crate::records::{RawSalesRow, RecordBatch};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct DatasetLoadPayload {
    #[serde(default)]
    files: Vec<RecordBatch>,
    /// Flat-row form, for callers that pre-merged their sources.
    #[serde(default, alias = "records")]
    rows: Vec<RawSalesRow>,
}

fn parse_dataset_load_payload(arg0: Option<Value>) -> Result<Vec<RecordBatch>, String> {
    let payload = match arg0 {
        // A bare array is treated as one unnamed batch of rows.
        Some(Value::Array(rows)) => json!({ "rows": rows }),
        Some(v) => v,
        None => json!({}),
    };
    let parsed: DatasetLoadPayload =
        serde_json::from_value(payload).map_err(|e| format!("Invalid dataset payload: {e}"))?;

    let mut batches = parsed.files;
    if !parsed.rows.is_empty() {
        batches.push(RecordBatch {
            name: None,
            branch: None,
            rows: parsed.rows,
        });
    }
    Ok(batches)
}

/// Replace the record store with a freshly combined dataset. The swap
/// is atomic: an aggregation pass already running keeps its old
/// snapshot. Selection state resets because branch identities from
/// the previous upload are meaningless against the new data.
pub fn dataset_load(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let batches = parse_dataset_load_payload(arg0)?;
    if batches.is_empty() {
        return Ok(json!({
            "success": false,
            "error": "No files selected",
        }));
    }

    let dataset = Dataset::from_batches(&batches);
    if dataset.records.is_empty() {
        warn!(
            files = batches.len(),
            "Upload produced no valid records after cleaning"
        );
        return Ok(json!({
            "success": false,
            "error": "No valid data found in uploaded files",
        }));
    }

    let dataset = state.dataset.replace(dataset);
    state
        .selection
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .select_branch(None);

    info!(
        dataset_id = %dataset.id,
        records = dataset.total_records(),
        branches = dataset.branches.len(),
        "Dataset loaded"
    );

    Ok(json!({
        "success": true,
        "data": {
            "datasetId": dataset.id,
            "totalRecords": dataset.total_records(),
            "branches": dataset.branches,
            "dateRange": dataset.date_range_label(),
            "files": dataset.source_files,
        }
    }))
}

/// Drop the current dataset and reset the selection.
pub fn dataset_clear(state: &AppState) -> Result<Value, String> {
    state.dataset.clear();
    state
        .selection
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .select_branch(None);
    Ok(json!({ "success": true }))
}

/// Store status for the debug/upload screens.
pub fn dataset_get_status(state: &AppState) -> Result<Value, String> {
    match state.dataset.snapshot() {
        Some(dataset) => Ok(json!({
            "success": true,
            "dataLoaded": true,
            "data": {
                "datasetId": dataset.id,
                "totalRecords": dataset.total_records(),
                "branches": dataset.branches,
                "uniqueProducts": dataset.distinct_menu_count(),
                "dateRange": dataset.date_range_label(),
                "loadedAt": dataset.loaded_at,
            }
        })),
        None => Ok(json!({
            "success": true,
            "dataLoaded": false,
            "data": Value::Null,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_payload() -> Value {
        json!({
            "files": [{
                "name": "kemang.xlsx",
                "branch": "Kemang",
                "rows": [
                    { "menu": "Sate Ayam", "qty": 2, "total": 70000, "margin": 28000, "cogsTotal": 42000 },
                    { "menu": "Es Teh", "qty": 1, "total": 8000, "margin": 5000, "cogsTotal": 3000 },
                    { "total": 1000 }
                ]
            }]
        })
    }

    #[test]
    fn load_replaces_store_and_reports_counts() {
        let state = AppState::new();
        let result = dataset_load(&state, Some(rows_payload())).expect("load");
        assert_eq!(result["success"], true);
        assert_eq!(result["data"]["totalRecords"], 2);
        assert_eq!(result["data"]["branches"][0], "Kemang");
        assert_eq!(result["data"]["files"][0]["dropped"], 1);

        let status = dataset_get_status(&state).expect("status");
        assert_eq!(status["dataLoaded"], true);
        assert_eq!(status["data"]["uniqueProducts"], 2);
    }

    #[test]
    fn load_accepts_bare_row_array() {
        let state = AppState::new();
        let result = dataset_load(
            &state,
            Some(json!([
                { "branch": "Kemang", "menu": "Sate", "total": 70000 }
            ])),
        )
        .expect("load");
        assert_eq!(result["success"], true);
        assert_eq!(result["data"]["totalRecords"], 1);
    }

    #[test]
    fn load_with_no_usable_rows_reports_failure() {
        let state = AppState::new();
        let empty = dataset_load(&state, None).expect("load");
        assert_eq!(empty["success"], false);

        let unusable = dataset_load(
            &state,
            Some(json!({ "files": [{ "name": "bad.xlsx", "rows": [{ "total": 5 }] }] })),
        )
        .expect("load");
        assert_eq!(unusable["success"], false);
        assert_eq!(unusable["error"], "No valid data found in uploaded files");
    }

    #[test]
    fn load_resets_selection() {
        let state = AppState::new();
        dataset_load(&state, Some(rows_payload())).expect("load");
        state
            .selection
            .lock()
            .unwrap()
            .select_branch(Some("Kemang"));

        dataset_load(&state, Some(rows_payload())).expect("reload");
        assert_eq!(state.selection.lock().unwrap().branch(), None);
    }

    #[test]
    fn clear_empties_the_store() {
        let state = AppState::new();
        dataset_load(&state, Some(rows_payload())).expect("load");
        dataset_clear(&state).expect("clear");
        let status = dataset_get_status(&state).expect("status");
        assert_eq!(status["dataLoaded"], false);
    }
}
