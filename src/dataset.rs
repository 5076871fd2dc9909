//! In-memory record store for branch analytics.
//!
//! A [`Dataset`] is one upload generation: the combined, cleaned record
//! sequence plus the metadata the dashboard header shows (branch list,
//! date range, per-source counts). [`DatasetState`] is the managed
//! handle the command adapter holds; a new upload swaps the `Arc`
//! atomically, so an in-flight aggregation pass keeps the old snapshot
//! and never observes a half-replaced dataset.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::records::{clean_batch, RecordBatch, SalesRecord};

/// Per-source-file load info, mirrored back to the upload screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFileInfo {
    pub filename: String,
    pub records: usize,
    pub dropped: usize,
}

/// One upload generation of the record store.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: String,
    pub records: Vec<SalesRecord>,
    /// Sorted distinct branch names.
    pub branches: Vec<String>,
    pub min_date: Option<NaiveDateTime>,
    pub max_date: Option<NaiveDateTime>,
    pub source_files: Vec<SourceFileInfo>,
    pub loaded_at: String,
}

impl Dataset {
    /// Build a dataset from cleaned source batches. Batches that clean
    /// down to zero records still appear in `source_files` so the
    /// upload screen can report them.
    pub fn from_batches(batches: &[RecordBatch]) -> Self {
        let mut records: Vec<SalesRecord> = Vec::new();
        let mut source_files = Vec::with_capacity(batches.len());

        for (idx, batch) in batches.iter().enumerate() {
            let outcome = clean_batch(batch);
            source_files.push(SourceFileInfo {
                filename: batch
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("upload-{}", idx + 1)),
                records: outcome.records.len(),
                dropped: outcome.dropped,
            });
            records.extend(outcome.records);
        }

        let mut branches: Vec<String> = Vec::new();
        for record in &records {
            if !branches.iter().any(|b| b == &record.branch) {
                branches.push(record.branch.clone());
            }
        }
        branches.sort();

        let min_date = records.iter().filter_map(|r| r.sold_at).min();
        let max_date = records.iter().filter_map(|r| r.sold_at).max();

        let dataset = Dataset {
            id: format!("ds-{}", Uuid::new_v4()),
            records,
            branches,
            min_date,
            max_date,
            source_files,
            loaded_at: Utc::now().to_rfc3339(),
        };

        info!(
            dataset_id = %dataset.id,
            records = dataset.records.len(),
            branches = dataset.branches.len(),
            files = dataset.source_files.len(),
            "Combined dataset prepared"
        );

        dataset
    }

    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    /// Distinct product count across all branches.
    pub fn distinct_menu_count(&self) -> usize {
        let mut menus: Vec<&str> = self.records.iter().map(|r| r.menu.as_str()).collect();
        menus.sort_unstable();
        menus.dedup();
        menus.len()
    }

    /// Human-readable date range for the dashboard header, in the
    /// source app's `dd/mm/yyyy - dd/mm/yyyy` form.
    pub fn date_range_label(&self) -> String {
        match (self.min_date, self.max_date) {
            (Some(min), Some(max)) => format!(
                "{} - {}",
                min.format("%d/%m/%Y"),
                max.format("%d/%m/%Y")
            ),
            _ => "No date range".to_string(),
        }
    }
}

/// Managed handle to the current dataset. Replacement is atomic from
/// the perspective of readers: `snapshot()` hands out an `Arc` clone,
/// and `replace()` swaps the slot under the lock.
pub struct DatasetState {
    current: Mutex<Option<Arc<Dataset>>>,
}

impl DatasetState {
    pub fn new() -> Self {
        DatasetState {
            current: Mutex::new(None),
        }
    }

    /// Install a freshly-built dataset, dropping the previous
    /// generation (holders of an old snapshot keep it alive until
    /// their pass finishes).
    pub fn replace(&self, dataset: Dataset) -> Arc<Dataset> {
        let dataset = Arc::new(dataset);
        let mut slot = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(dataset.clone());
        dataset
    }

    pub fn clear(&self) {
        let mut slot = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = slot.take() {
            info!(dataset_id = %old.id, "Dataset cleared");
        }
    }

    /// The current dataset, or `None` before the first upload.
    pub fn snapshot(&self) -> Option<Arc<Dataset>> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for DatasetState {
    fn default() -> Self {
        Self::new()
    }
}
