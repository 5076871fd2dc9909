//! Record intake for branch analytics.
//!
//! Rows arrive from the upload/parsing collaborator as loosely-typed
//! JSON objects (camelCase keys or the source spreadsheet's column
//! names). This module applies the optional-to-default coercion and
//! cleaning rules exactly once, at this boundary; everything downstream
//! works on fully-typed [`SalesRecord`]s and never re-checks for
//! missing fields.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::safe_divide;

/// One incoming row, before coercion. Every field is optional so a
/// sparse or legacy payload deserializes without error; the cleaning
/// pass decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSalesRow {
    #[serde(default, alias = "Branch", alias = "branch_name")]
    pub branch: Option<String>,
    #[serde(default, alias = "Menu", alias = "product", alias = "product_name")]
    pub menu: Option<String>,
    #[serde(default, alias = "Qty", alias = "quantity")]
    pub qty: Option<f64>,
    #[serde(default, alias = "Total", alias = "revenue", alias = "total_revenue")]
    pub total: Option<f64>,
    #[serde(default, alias = "Margin")]
    pub margin: Option<f64>,
    #[serde(default, alias = "COGS Total", alias = "cogs_total")]
    pub cogs_total: Option<f64>,
    #[serde(default, alias = "COGS Total (%)", alias = "cogs_pct", alias = "cogsPercentage")]
    pub cogs_pct: Option<f64>,
    #[serde(default, alias = "Sales Date", alias = "sales_date", alias = "soldAt", alias = "sold_at")]
    pub sales_date: Option<String>,
}

/// A batch of rows from one source file. The optional batch-level
/// branch stamps rows that did not carry their own (the original
/// spreadsheets name the branch once, in the file header).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordBatch {
    #[serde(default, alias = "file_name", alias = "fileName", alias = "source")]
    pub name: Option<String>,
    #[serde(default, alias = "branch_name")]
    pub branch: Option<String>,
    #[serde(default, alias = "records")]
    pub rows: Vec<RawSalesRow>,
}

/// One fully-typed sales transaction. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub branch: String,
    pub menu: String,
    pub qty: f64,
    pub total: f64,
    pub margin: f64,
    pub cogs_total: f64,
    pub cogs_pct: f64,
    /// Consumed only by the time-trend analyses; records without a
    /// parseable timestamp still count everywhere else.
    pub sold_at: Option<NaiveDateTime>,
}

/// Result of cleaning one batch.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub records: Vec<SalesRecord>,
    pub dropped: usize,
}

/// Parse the source timestamp formats in order of likelihood.
/// RFC 3339 first (API payloads), then the spreadsheet exports.
pub fn parse_sales_date(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerce and validate one batch of raw rows.
///
/// Coercion: missing/null numerics become 0; a missing COGS % is
/// derived from cogs/total (zero-denominator fallback 0). Cleaning
/// drops rows missing a branch or product name, rows with negative
/// COGS, and rows whose explicit COGS % is outside 0-100. Unparseable
/// timestamps keep the row and store `None`.
pub fn clean_batch(batch: &RecordBatch) -> CleanOutcome {
    let batch_branch = batch
        .branch
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let mut records = Vec::with_capacity(batch.rows.len());
    let mut dropped = 0usize;

    for row in &batch.rows {
        let branch = row
            .branch
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .or(batch_branch);
        let menu = row
            .menu
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());

        let (branch, menu) = match (branch, menu) {
            (Some(b), Some(m)) => (b.to_string(), m.to_string()),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let qty = row.qty.unwrap_or(0.0);
        let total = row.total.unwrap_or(0.0);
        let margin = row.margin.unwrap_or(0.0);
        let cogs_total = row.cogs_total.unwrap_or(0.0);

        if cogs_total < 0.0 {
            dropped += 1;
            continue;
        }
        if let Some(pct) = row.cogs_pct {
            if !(0.0..=100.0).contains(&pct) {
                dropped += 1;
                continue;
            }
        }

        let cogs_pct = row
            .cogs_pct
            .unwrap_or_else(|| safe_divide(cogs_total, total) * 100.0);
        let sold_at = row.sales_date.as_deref().and_then(parse_sales_date);

        records.push(SalesRecord {
            branch,
            menu,
            qty,
            total,
            margin,
            cogs_total,
            cogs_pct,
            sold_at,
        });
    }

    if dropped > 0 {
        warn!(
            source = %batch.name.as_deref().unwrap_or("unnamed"),
            dropped,
            kept = records.len(),
            "Dropped unusable rows while cleaning batch"
        );
    }

    CleanOutcome { records, dropped }
}
