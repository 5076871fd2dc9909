//! Cross-branch revenue comparison rollups.
//!
//! One row per branch with revenue/margin/COGS totals, averages, the
//! active date range, and a 1-based revenue rank. Rows come back
//! sorted by total revenue descending, matching the comparison table
//! and its charts.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::records::SalesRecord;
use crate::safe_divide;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchComparisonRow {
    pub branch: String,
    pub total_revenue: f64,
    pub avg_transaction: f64,
    pub transaction_count: usize,
    pub total_margin: f64,
    pub avg_margin: f64,
    pub total_cogs: f64,
    pub total_qty: f64,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub margin_pct: f64,
    pub cogs_pct: f64,
    pub revenue_per_day: f64,
    pub revenue_rank: usize,
}

/// Roll the record sequence up per branch and rank by revenue.
pub fn branch_revenue_comparison(records: &[SalesRecord]) -> Vec<BranchComparisonRow> {
    let mut rows: Vec<BranchComparisonRow> = Vec::new();

    for record in records {
        let idx = match rows.iter().position(|row| row.branch == record.branch) {
            Some(i) => i,
            None => {
                rows.push(BranchComparisonRow {
                    branch: record.branch.clone(),
                    total_revenue: 0.0,
                    avg_transaction: 0.0,
                    transaction_count: 0,
                    total_margin: 0.0,
                    avg_margin: 0.0,
                    total_cogs: 0.0,
                    total_qty: 0.0,
                    start_date: None,
                    end_date: None,
                    margin_pct: 0.0,
                    cogs_pct: 0.0,
                    revenue_per_day: 0.0,
                    revenue_rank: 0,
                });
                rows.len() - 1
            }
        };
        let slot = &mut rows[idx];
        slot.total_revenue += record.total;
        slot.total_margin += record.margin;
        slot.total_cogs += record.cogs_total;
        slot.total_qty += record.qty;
        slot.transaction_count += 1;
        if let Some(sold_at) = record.sold_at {
            slot.start_date = Some(match slot.start_date {
                Some(d) if d <= sold_at => d,
                _ => sold_at,
            });
            slot.end_date = Some(match slot.end_date {
                Some(d) if d >= sold_at => d,
                _ => sold_at,
            });
        }
    }

    for row in &mut rows {
        let count = row.transaction_count as f64;
        row.avg_transaction = safe_divide(row.total_revenue, count);
        row.avg_margin = safe_divide(row.total_margin, count);
        row.margin_pct = safe_divide(row.total_margin, row.total_revenue) * 100.0;
        row.cogs_pct = safe_divide(row.total_cogs, row.total_revenue) * 100.0;
        row.revenue_per_day = row.total_revenue / active_days(row.start_date, row.end_date) as f64;
    }

    rows.sort_by(|a, b| {
        b.total_revenue
            .partial_cmp(&a.total_revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.revenue_rank = i + 1;
    }

    rows
}

/// Inclusive day span of the branch's activity, never below 1 so the
/// per-day division stays defined for single-day or dateless data.
fn active_days(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) => ((end.date() - start.date()).num_days() + 1).max(1),
        _ => 1,
    }
}
