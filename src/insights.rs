//! Dataset summary statistics, cross-branch insights, and the data
//! context handed to the AI chat collaborator.
//!
//! Everything here is data shaping; the chat integration that consumes
//! `ai_context` lives outside this crate.

use serde::Serialize;
use serde_json::{json, Value};

use crate::branch_comparison::{branch_revenue_comparison, BranchComparisonRow};
use crate::cogs::{cogs_per_product_per_branch, cogs_variance};
use crate::dataset::{Dataset, SourceFileInfo};
use crate::safe_divide;

/// Headline numbers for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_branches: usize,
    pub total_records: usize,
    pub date_range: String,
    pub total_revenue: f64,
    pub total_margin: f64,
    pub total_cogs: f64,
    pub avg_cogs_pct: f64,
    pub unique_products: usize,
    pub avg_transaction_value: f64,
    pub files_processed: Vec<SourceFileInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueConcentration {
    pub top3_share_pct: f64,
    pub bottom3_share_pct: f64,
    /// Population std-dev of branch revenues divided by their mean.
    pub inequality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConsistency {
    /// Products available in every branch.
    pub universal_products: usize,
    /// Products available in fewer than half the branches.
    pub limited_products: usize,
    pub avg_availability_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CogsConsistency {
    /// Products whose cross-branch COGS % CV exceeds 0.2.
    pub high_variance_products: usize,
    pub avg_cv: f64,
    pub most_consistent_menu: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossBranchInsights {
    pub revenue_concentration: RevenueConcentration,
    pub product_consistency: ProductConsistency,
    pub cogs_consistency: CogsConsistency,
}

pub fn branch_summary_stats(dataset: &Dataset) -> SummaryStats {
    let records = &dataset.records;
    let total_revenue: f64 = records.iter().map(|r| r.total).sum();
    let total_margin: f64 = records.iter().map(|r| r.margin).sum();
    let total_cogs: f64 = records.iter().map(|r| r.cogs_total).sum();
    let pct_sum: f64 = records.iter().map(|r| r.cogs_pct).sum();

    SummaryStats {
        total_branches: dataset.branches.len(),
        total_records: records.len(),
        date_range: dataset.date_range_label(),
        total_revenue,
        total_margin,
        total_cogs,
        avg_cogs_pct: safe_divide(pct_sum, records.len() as f64),
        unique_products: dataset.distinct_menu_count(),
        avg_transaction_value: safe_divide(total_revenue, records.len() as f64),
        files_processed: dataset.source_files.clone(),
    }
}

fn revenue_concentration(comparison: &[BranchComparisonRow]) -> RevenueConcentration {
    let revenues: Vec<f64> = comparison.iter().map(|r| r.total_revenue).collect();
    let total: f64 = revenues.iter().sum();

    // Comparison rows arrive revenue-descending, so head/tail slices
    // are the top and bottom earners.
    let top3: f64 = revenues.iter().take(3).sum();
    let bottom3: f64 = revenues.iter().rev().take(3).sum();

    let mean = safe_divide(total, revenues.len() as f64);
    let variance = if revenues.is_empty() {
        0.0
    } else {
        revenues.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / revenues.len() as f64
    };

    RevenueConcentration {
        top3_share_pct: safe_divide(top3, total) * 100.0,
        bottom3_share_pct: safe_divide(bottom3, total) * 100.0,
        inequality: safe_divide(variance.sqrt(), mean),
    }
}

fn product_consistency(dataset: &Dataset) -> ProductConsistency {
    let branch_total = dataset.branches.len();
    // (menu, branches it appears in)
    let mut availability: Vec<(&str, Vec<&str>)> = Vec::new();
    for record in &dataset.records {
        match availability.iter_mut().find(|(m, _)| *m == record.menu) {
            Some((_, branches)) => {
                if !branches.contains(&record.branch.as_str()) {
                    branches.push(record.branch.as_str());
                }
            }
            None => availability.push((record.menu.as_str(), vec![record.branch.as_str()])),
        }
    }

    let mut universal = 0usize;
    let mut limited = 0usize;
    let mut pct_sum = 0.0;
    for (_, branches) in &availability {
        let pct = safe_divide(branches.len() as f64, branch_total as f64) * 100.0;
        pct_sum += pct;
        if branches.len() == branch_total && branch_total > 0 {
            universal += 1;
        }
        if pct < 50.0 {
            limited += 1;
        }
    }

    ProductConsistency {
        universal_products: universal,
        limited_products: limited,
        avg_availability_pct: safe_divide(pct_sum, availability.len() as f64),
    }
}

fn cogs_consistency(dataset: &Dataset) -> CogsConsistency {
    let rows = cogs_per_product_per_branch(&dataset.records);
    let variance = cogs_variance(&rows);

    let high_variance = variance.iter().filter(|v| v.cv > 0.2).count();
    let cv_sum: f64 = variance.iter().map(|v| v.cv).sum();
    // Variance rows come back most-volatile first, so the most
    // consistent product is the last one.
    let most_consistent = variance.last().map(|v| v.menu.clone());

    CogsConsistency {
        high_variance_products: high_variance,
        avg_cv: safe_divide(cv_sum, variance.len() as f64),
        most_consistent_menu: most_consistent,
    }
}

pub fn cross_branch_insights(dataset: &Dataset) -> CrossBranchInsights {
    let comparison = branch_revenue_comparison(&dataset.records);
    CrossBranchInsights {
        revenue_concentration: revenue_concentration(&comparison),
        product_consistency: product_consistency(dataset),
        cogs_consistency: cogs_consistency(dataset),
    }
}

/// The full data context for the chat collaborator: headline stats,
/// best/worst branch, top products overall, insights, and the branch
/// list.
pub fn ai_context(dataset: &Dataset) -> Value {
    let summary = branch_summary_stats(dataset);
    let comparison = branch_revenue_comparison(&dataset.records);
    let insights = cross_branch_insights(dataset);

    let branch_entry = |row: Option<&BranchComparisonRow>| match row {
        Some(row) => json!({
            "name": row.branch,
            "revenue": row.total_revenue,
            "marginPct": row.margin_pct,
        }),
        None => json!({ "name": "N/A", "revenue": 0.0, "marginPct": 0.0 }),
    };

    // Top 5 products overall by revenue, across every branch.
    let mut products: Vec<(String, f64, f64, f64)> = Vec::new();
    for record in &dataset.records {
        match products.iter_mut().find(|(m, ..)| m == &record.menu) {
            Some((_, qty, total, margin)) => {
                *qty += record.qty;
                *total += record.total;
                *margin += record.margin;
            }
            None => products.push((record.menu.clone(), record.qty, record.total, record.margin)),
        }
    }
    products.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    let top_products: Vec<Value> = products
        .into_iter()
        .take(5)
        .map(|(menu, qty, total, margin)| {
            json!({ "menu": menu, "qty": qty, "total": total, "margin": margin })
        })
        .collect();

    json!({
        "summary": summary,
        "branchPerformance": {
            "bestBranch": branch_entry(comparison.first()),
            "worstBranch": branch_entry(comparison.last()),
        },
        "topProductsOverall": top_products,
        "crossBranchInsights": insights,
        "branchList": dataset.branches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{RawSalesRow, RecordBatch};

    fn dataset(rows: Vec<serde_json::Value>) -> Dataset {
        let batch = RecordBatch {
            name: Some("fixture.xlsx".into()),
            branch: None,
            rows: rows
                .into_iter()
                .map(|v| serde_json::from_value::<RawSalesRow>(v).expect("row fixture"))
                .collect(),
        };
        Dataset::from_batches(&[batch])
    }

    fn row(branch: &str, menu: &str, total: f64, margin: f64, cogs: f64) -> serde_json::Value {
        serde_json::json!({
            "branch": branch,
            "menu": menu,
            "qty": 1.0,
            "total": total,
            "margin": margin,
            "cogsTotal": cogs,
        })
    }

    #[test]
    fn summary_stats_totals() {
        let ds = dataset(vec![
            row("Kemang", "Sate", 100.0, 40.0, 60.0),
            row("Kemang", "Es Teh", 10.0, 6.0, 4.0),
            row("Senopati", "Sate", 200.0, 80.0, 120.0),
        ]);
        let stats = branch_summary_stats(&ds);
        assert_eq!(stats.total_branches, 2);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.total_revenue, 310.0);
        assert_eq!(stats.total_margin, 126.0);
        assert_eq!(stats.unique_products, 2);
        assert!((stats.avg_transaction_value - 310.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.files_processed.len(), 1);
    }

    #[test]
    fn concentration_shares_from_ranked_rows() {
        let ds = dataset(vec![
            row("A", "P", 700.0, 70.0, 630.0),
            row("B", "P", 200.0, 20.0, 180.0),
            row("C", "P", 100.0, 10.0, 90.0),
        ]);
        let insights = cross_branch_insights(&ds);
        // Only three branches: top-3 and bottom-3 both cover them all.
        assert_eq!(insights.revenue_concentration.top3_share_pct, 100.0);
        assert_eq!(insights.revenue_concentration.bottom3_share_pct, 100.0);
        assert!(insights.revenue_concentration.inequality > 0.0);
    }

    #[test]
    fn product_consistency_counts_universal_and_limited() {
        let ds = dataset(vec![
            row("A", "Everywhere", 100.0, 10.0, 90.0),
            row("B", "Everywhere", 100.0, 10.0, 90.0),
            row("C", "Everywhere", 100.0, 10.0, 90.0),
            row("A", "Rare", 100.0, 10.0, 90.0),
        ]);
        let insights = cross_branch_insights(&ds);
        assert_eq!(insights.product_consistency.universal_products, 1);
        // "Rare" is in 1 of 3 branches -> < 50%.
        assert_eq!(insights.product_consistency.limited_products, 1);
    }

    #[test]
    fn ai_context_names_best_and_worst_branch() {
        let ds = dataset(vec![
            row("Kemang", "Sate", 500.0, 200.0, 300.0),
            row("Senopati", "Sate", 100.0, 20.0, 80.0),
        ]);
        let context = ai_context(&ds);
        assert_eq!(context["branchPerformance"]["bestBranch"]["name"], "Kemang");
        assert_eq!(
            context["branchPerformance"]["worstBranch"]["name"],
            "Senopati"
        );
        assert_eq!(context["branchList"].as_array().unwrap().len(), 2);
        assert_eq!(context["topProductsOverall"][0]["menu"], "Sate");
        assert_eq!(context["topProductsOverall"][0]["total"], 600.0);
    }

    #[test]
    fn empty_dataset_is_all_zeros_not_nan() {
        let ds = dataset(vec![]);
        let stats = branch_summary_stats(&ds);
        assert_eq!(stats.avg_transaction_value, 0.0);
        assert_eq!(stats.avg_cogs_pct, 0.0);
        let insights = cross_branch_insights(&ds);
        assert_eq!(insights.revenue_concentration.top3_share_pct, 0.0);
        assert_eq!(insights.product_consistency.avg_availability_pct, 0.0);
        assert_eq!(insights.cogs_consistency.most_consistent_menu, None);
    }
}
