//! Error taxonomy for the analytics pipeline.
//!
//! All variants are non-fatal and locally recoverable. The command
//! adapter maps the first three to distinct user-facing guidance
//! messages; `InvalidSortKey` is an integration mistake and is
//! propagated loudly instead of being defaulted away.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// No branch is selected. Downstream aggregation must not run.
    #[error("No branch selected")]
    NoBranchSelected,

    /// The branch (or branch + product) filter matched zero records.
    #[error("No data for the current selection")]
    NoDataForSelection,

    /// A product-detail breakdown had no positive components left
    /// after filtering.
    #[error("Breakdown has no positive components")]
    InvalidBreakdown,

    /// The caller requested a sort key the ranker does not recognize.
    #[error("Unknown sort key: {0}")]
    InvalidSortKey(String),
}
