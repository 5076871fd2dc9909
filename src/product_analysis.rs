//! Per-branch product analysis: the Top Performers pipeline.
//!
//! Branch filter -> product aggregator -> ranker, plus the
//! single-product detail resolver feeding the composition chart.
//! Every function here is pure over the record slice it is given; the
//! command adapter re-runs the pipeline on each selection change.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::AnalysisError;
use crate::records::SalesRecord;
use crate::safe_divide;

/// Sums for one product within one branch, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAggregate {
    pub menu: String,
    pub branch: String,
    pub qty: f64,
    pub revenue: f64,
    pub margin: f64,
    pub cogs: f64,
    /// margin / revenue x 100; 0 when revenue is 0.
    pub margin_pct: f64,
    /// revenue / qty; 0 when qty is 0.
    pub avg_price: f64,
}

/// An aggregate plus its 1-based rank after sorting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub aggregate: ProductAggregate,
}

/// Metric the ranker orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Revenue,
    Quantity,
    MarginPercentage,
}

impl SortKey {
    /// Parse the UI's sort-key string. Unknown keys are an integration
    /// error and fail loudly; they are never silently defaulted.
    pub fn parse(raw: &str) -> Result<Self, AnalysisError> {
        match raw.trim() {
            "revenue" | "total" => Ok(SortKey::Revenue),
            "quantity" | "qty" => Ok(SortKey::Quantity),
            "margin" | "margin_percentage" | "marginPercentage" => Ok(SortKey::MarginPercentage),
            other => Err(AnalysisError::InvalidSortKey(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Revenue => "revenue",
            SortKey::Quantity => "quantity",
            SortKey::MarginPercentage => "margin",
        }
    }

    fn field(&self, aggregate: &ProductAggregate) -> f64 {
        match self {
            SortKey::Revenue => aggregate.revenue,
            SortKey::Quantity => aggregate.qty,
            SortKey::MarginPercentage => aggregate.margin_pct,
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Revenue
    }
}

/// Narrow the record sequence to one branch (exact, case-sensitive
/// match). An empty identifier means no branch is selected yet; the
/// caller must not run the downstream stages in that state.
pub fn filter_branch<'a>(
    records: &'a [SalesRecord],
    branch: &str,
) -> Result<Vec<&'a SalesRecord>, AnalysisError> {
    if branch.trim().is_empty() {
        return Err(AnalysisError::NoBranchSelected);
    }
    Ok(records.iter().filter(|r| r.branch == branch).collect())
}

/// Group branch-filtered records by product name and sum the monetary
/// fields. Output preserves first-seen order, which the ranker relies
/// on for tie-break stability.
pub fn aggregate_products(filtered: &[&SalesRecord]) -> Vec<ProductAggregate> {
    let mut aggregates: Vec<ProductAggregate> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in filtered {
        let slot = match index.get(record.menu.as_str()) {
            Some(&i) => i,
            None => {
                aggregates.push(ProductAggregate {
                    menu: record.menu.clone(),
                    branch: record.branch.clone(),
                    qty: 0.0,
                    revenue: 0.0,
                    margin: 0.0,
                    cogs: 0.0,
                    margin_pct: 0.0,
                    avg_price: 0.0,
                });
                index.insert(record.menu.as_str(), aggregates.len() - 1);
                aggregates.len() - 1
            }
        };
        let entry = &mut aggregates[slot];
        entry.qty += record.qty;
        entry.revenue += record.total;
        entry.margin += record.margin;
        entry.cogs += record.cogs_total;
    }

    for entry in &mut aggregates {
        entry.margin_pct = safe_divide(entry.margin, entry.revenue) * 100.0;
        entry.avg_price = safe_divide(entry.revenue, entry.qty);
    }

    aggregates
}

/// Order aggregates descending by the chosen metric and truncate.
///
/// `Vec::sort_by` is stable, so equal-key entries keep the
/// aggregator's insertion order; that stability is part of the
/// contract, not an implementation accident. `limit = None` returns
/// all entries.
pub fn rank_products(
    mut aggregates: Vec<ProductAggregate>,
    key: SortKey,
    limit: Option<usize>,
) -> Vec<RankedEntry> {
    aggregates.sort_by(|a, b| {
        key.field(b)
            .partial_cmp(&key.field(a))
            .unwrap_or(Ordering::Equal)
    });
    if let Some(limit) = limit {
        aggregates.truncate(limit);
    }
    aggregates
        .into_iter()
        .enumerate()
        .map(|(i, aggregate)| RankedEntry {
            rank: i + 1,
            aggregate,
        })
        .collect()
}

/// Sorted distinct product names for the active branch (the dropdown
/// payload).
pub fn product_options(
    records: &[SalesRecord],
    branch: &str,
) -> Result<Vec<String>, AnalysisError> {
    let filtered = filter_branch(records, branch)?;
    let mut menus: Vec<String> = Vec::new();
    for record in filtered {
        if !menus.iter().any(|m| m == &record.menu) {
            menus.push(record.menu.clone());
        }
    }
    menus.sort();
    Ok(menus)
}

/// One positive slice of the product financial composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownComponent {
    pub label: &'static str,
    pub value: f64,
}

/// Totals and the 3-way financial decomposition for one product in
/// one branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub menu: String,
    pub branch: String,
    pub revenue: f64,
    pub qty: f64,
    pub margin: f64,
    pub cogs: f64,
    pub margin_pct: f64,
    /// Net revenue / margin / COGS, keeping only components > 0.
    pub breakdown: Vec<BreakdownComponent>,
}

/// Recompute totals and the composition chart data for one product.
///
/// Distinct failure signals: zero matching records is
/// `NoDataForSelection` (the adapter leaves the prior view untouched);
/// records that exist but yield no positive component is
/// `InvalidBreakdown` (the chart collaborator must show an explicit
/// error affordance, not an empty chart).
pub fn resolve_product_detail(
    records: &[SalesRecord],
    branch: &str,
    menu: &str,
) -> Result<ProductDetail, AnalysisError> {
    let filtered = filter_branch(records, branch)?;
    let matched: Vec<&SalesRecord> = filtered.into_iter().filter(|r| r.menu == menu).collect();
    if matched.is_empty() {
        return Err(AnalysisError::NoDataForSelection);
    }

    let mut revenue = 0.0;
    let mut qty = 0.0;
    let mut margin = 0.0;
    let mut cogs = 0.0;
    for record in &matched {
        revenue += record.total;
        qty += record.qty;
        margin += record.margin;
        cogs += record.cogs_total;
    }

    let net_revenue = revenue - cogs;
    let breakdown: Vec<BreakdownComponent> = [
        ("Net Revenue", net_revenue),
        ("Margin", margin),
        ("COGS", cogs),
    ]
    .into_iter()
    .filter(|(_, value)| *value > 0.0)
    .map(|(label, value)| BreakdownComponent { label, value })
    .collect();

    if breakdown.is_empty() {
        return Err(AnalysisError::InvalidBreakdown);
    }

    Ok(ProductDetail {
        menu: menu.to_string(),
        branch: branch.to_string(),
        revenue,
        qty,
        margin,
        cogs,
        margin_pct: safe_divide(margin, revenue) * 100.0,
        breakdown,
    })
}
