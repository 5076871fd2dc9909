//! Chart data payloads for the rendering collaborator.
//!
//! This crate never talks to a charting library; it shapes labeled
//! series the frontend feeds into one. Every series also renders to a
//! plain-text summary so a charting failure downstream can degrade to
//! text instead of leaving the view blank.

use serde::Serialize;

use crate::branch_comparison::BranchComparisonRow;
use crate::format::format_currency;
use crate::product_analysis::ProductDetail;
use crate::records::SalesRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    /// Pre-formatted display text for the point.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub title: String,
    pub points: Vec<ChartPoint>,
}

/// One branch dot on the performance matrix (revenue x margin %,
/// colored by COGS %).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixPoint {
    pub branch: String,
    pub revenue: f64,
    pub margin_pct: f64,
    pub cogs_pct: f64,
}

/// Revenue-per-branch bar, capped at the top 10 for dashboard
/// readability. Rows arrive revenue-descending from the comparison.
pub fn revenue_bar(rows: &[BranchComparisonRow]) -> ChartSeries {
    ChartSeries {
        title: "Revenue per Branch (Top 10)".to_string(),
        points: rows
            .iter()
            .take(10)
            .map(|row| ChartPoint {
                label: row.branch.clone(),
                value: row.total_revenue,
                text: format_currency(Some(row.total_revenue)),
            })
            .collect(),
    }
}

/// Revenue-share pie, top 8 branches.
pub fn revenue_pie(rows: &[BranchComparisonRow]) -> ChartSeries {
    ChartSeries {
        title: "Revenue Share per Branch (Top 8)".to_string(),
        points: rows
            .iter()
            .take(8)
            .map(|row| ChartPoint {
                label: row.branch.clone(),
                value: row.total_revenue,
                text: format_currency(Some(row.total_revenue)),
            })
            .collect(),
    }
}

/// Branch performance matrix: every branch, revenue vs margin %.
pub fn performance_matrix(rows: &[BranchComparisonRow]) -> Vec<MatrixPoint> {
    rows.iter()
        .map(|row| MatrixPoint {
            branch: row.branch.clone(),
            revenue: row.total_revenue,
            margin_pct: row.margin_pct,
            cogs_pct: row.cogs_pct,
        })
        .collect()
}

/// Revenue-per-transaction efficiency bar, best first.
pub fn efficiency_bar(rows: &[BranchComparisonRow]) -> ChartSeries {
    let mut points: Vec<ChartPoint> = rows
        .iter()
        .map(|row| ChartPoint {
            label: row.branch.clone(),
            value: row.avg_transaction,
            text: format_currency(Some(row.avg_transaction)),
        })
        .collect();
    points.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    ChartSeries {
        title: "Revenue per Transaction".to_string(),
        points,
    }
}

/// Top products across all branches by revenue, top 10 bar.
pub fn top_products_bar(records: &[SalesRecord]) -> ChartSeries {
    let mut totals: Vec<(String, f64)> = Vec::new();
    for record in records {
        match totals.iter_mut().find(|(menu, _)| menu == &record.menu) {
            Some((_, total)) => *total += record.total,
            None => totals.push((record.menu.clone(), record.total)),
        }
    }
    totals.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ChartSeries {
        title: "Top 10 Products by Revenue".to_string(),
        points: totals
            .into_iter()
            .take(10)
            .map(|(label, value)| ChartPoint {
                text: format_currency(Some(value)),
                label,
                value,
            })
            .collect(),
    }
}

/// The product-detail composition series. The resolver has already
/// filtered the net-revenue/margin/COGS slices down to positive values.
pub fn product_breakdown(detail: &ProductDetail) -> ChartSeries {
    ChartSeries {
        title: format!("Financial Breakdown - {}", detail.menu),
        points: detail
            .breakdown
            .iter()
            .map(|component| ChartPoint {
                label: component.label.to_string(),
                value: component.value,
                text: format_currency(Some(component.value)),
            })
            .collect(),
    }
}

/// Plain-text rendering of a series, used when the external charting
/// step fails and the view must degrade to text.
pub fn fallback_summary(series: &ChartSeries) -> String {
    if series.points.is_empty() {
        return format!("{}: no data", series.title);
    }
    let parts: Vec<String> = series
        .points
        .iter()
        .map(|p| format!("{}: {}", p.label, p.text))
        .collect();
    format!("{} | {}", series.title, parts.join(", "))
}
