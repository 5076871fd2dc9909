//! Branch Analytics - multi-branch sales reporting core
//!
//! The data-shaping layer behind a multi-branch retail dashboard:
//! an in-memory record store fed by the upload collaborator, the
//! aggregation/ranking/detail pipeline behind every dashboard view,
//! and a JSON command adapter the UI collaborator calls. Rendering,
//! file parsing, and the chat integration live outside this crate;
//! they only exchange the payloads defined here.
//!
//! Every pipeline stage is a pure function over the record sequence.
//! Each UI event triggers one complete, synchronous recomputation
//! pass; nothing is cached between passes, and a new upload replaces
//! the store atomically.

use tracing::debug;

pub mod branch_comparison;
pub mod charts;
pub mod cogs;
pub mod commands;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod insights;
pub mod product_analysis;
pub mod records;
pub mod selection;
pub mod time_analysis;

pub use commands::AppState;
pub use dataset::{Dataset, DatasetState};
pub use error::AnalysisError;
pub use product_analysis::SortKey;
pub use records::SalesRecord;
pub use selection::{Selection, SelectionState};

/// Division with the zero-denominator fallback used throughout the
/// pipeline: a zero (or non-finite) denominator yields 0, never NaN
/// and never an error. Division by zero is normal input here, not an
/// exceptional condition.
pub(crate) fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    numerator / denominator
}

/// Convenience for embedders: build the managed state and log the
/// crate version once.
pub fn init_app_state() -> AppState {
    debug!(version = env!("CARGO_PKG_VERSION"), "Analytics core ready");
    AppState::new()
}
