//! COGS analysis: per-product cost rollups, branch efficiency,
//! cost-extreme rankings, cross-branch consistency, and the
//! optimization recommendations shown on the COGS screen.

use serde::Serialize;

use crate::records::SalesRecord;
use crate::safe_divide;

/// One (product, branch) COGS rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CogsProductRow {
    pub menu: String,
    pub branch: String,
    pub cogs_total: f64,
    /// Mean of the record-level COGS percentages.
    pub avg_cogs_pct: f64,
    pub revenue: f64,
    pub qty: f64,
    pub margin: f64,
    pub cogs_per_unit: f64,
    pub revenue_per_unit: f64,
    pub margin_per_unit: f64,
    /// 100 - avg COGS %.
    pub efficiency: f64,
}

/// Mean COGS % per branch, ranked by efficiency.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchCogsRow {
    pub branch: String,
    pub avg_cogs_pct: f64,
    pub efficiency: f64,
}

/// One product in the highest/lowest COGS rankings (all branches
/// combined).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CogsExtremeRow {
    pub menu: String,
    pub avg_cogs_pct: f64,
    pub total_revenue: f64,
    pub total_qty: f64,
}

/// Cross-branch COGS consistency for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CogsVarianceRow {
    pub menu: String,
    pub mean_cogs_pct: f64,
    pub std_dev: f64,
    /// Coefficient of variation (sample std-dev / mean).
    pub cv: f64,
    pub branch_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub potential_saving: String,
}

/// Roll COGS up per (product, branch), sorted by product name then
/// ascending COGS % so each product's cheapest branch leads.
pub fn cogs_per_product_per_branch(records: &[SalesRecord]) -> Vec<CogsProductRow> {
    struct Acc {
        menu: String,
        branch: String,
        cogs_total: f64,
        pct_sum: f64,
        revenue: f64,
        qty: f64,
        margin: f64,
        count: usize,
    }

    let mut accs: Vec<Acc> = Vec::new();
    for record in records {
        let idx = match accs
            .iter()
            .position(|a| a.menu == record.menu && a.branch == record.branch)
        {
            Some(i) => i,
            None => {
                accs.push(Acc {
                    menu: record.menu.clone(),
                    branch: record.branch.clone(),
                    cogs_total: 0.0,
                    pct_sum: 0.0,
                    revenue: 0.0,
                    qty: 0.0,
                    margin: 0.0,
                    count: 0,
                });
                accs.len() - 1
            }
        };
        let slot = &mut accs[idx];
        slot.cogs_total += record.cogs_total;
        slot.pct_sum += record.cogs_pct;
        slot.revenue += record.total;
        slot.qty += record.qty;
        slot.margin += record.margin;
        slot.count += 1;
    }

    let mut rows: Vec<CogsProductRow> = accs
        .into_iter()
        .map(|a| {
            let avg_cogs_pct = safe_divide(a.pct_sum, a.count as f64);
            CogsProductRow {
                cogs_per_unit: safe_divide(a.cogs_total, a.qty),
                revenue_per_unit: safe_divide(a.revenue, a.qty),
                margin_per_unit: safe_divide(a.margin, a.qty),
                efficiency: 100.0 - avg_cogs_pct,
                menu: a.menu,
                branch: a.branch,
                cogs_total: a.cogs_total,
                avg_cogs_pct,
                revenue: a.revenue,
                qty: a.qty,
                margin: a.margin,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.menu.cmp(&b.menu).then(
            a.avg_cogs_pct
                .partial_cmp(&b.avg_cogs_pct)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    rows
}

/// Mean COGS % per branch over its product rows, best efficiency
/// first.
pub fn branch_cogs_efficiency(rows: &[CogsProductRow]) -> Vec<BranchCogsRow> {
    let mut accs: Vec<(String, f64, usize)> = Vec::new();
    for row in rows {
        match accs.iter_mut().find(|(branch, ..)| branch == &row.branch) {
            Some((_, sum, count)) => {
                *sum += row.avg_cogs_pct;
                *count += 1;
            }
            None => accs.push((row.branch.clone(), row.avg_cogs_pct, 1)),
        }
    }

    let mut out: Vec<BranchCogsRow> = accs
        .into_iter()
        .map(|(branch, sum, count)| {
            let avg_cogs_pct = safe_divide(sum, count as f64);
            BranchCogsRow {
                branch,
                avg_cogs_pct,
                efficiency: 100.0 - avg_cogs_pct,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.efficiency
            .partial_cmp(&a.efficiency)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}

fn menu_cogs_rollup(records: &[SalesRecord]) -> Vec<CogsExtremeRow> {
    let mut accs: Vec<(String, f64, usize, f64, f64)> = Vec::new();
    for record in records {
        match accs.iter_mut().find(|(menu, ..)| menu == &record.menu) {
            Some((_, pct_sum, count, revenue, qty)) => {
                *pct_sum += record.cogs_pct;
                *count += 1;
                *revenue += record.total;
                *qty += record.qty;
            }
            None => accs.push((
                record.menu.clone(),
                record.cogs_pct,
                1,
                record.total,
                record.qty,
            )),
        }
    }
    accs.into_iter()
        .map(|(menu, pct_sum, count, total_revenue, total_qty)| CogsExtremeRow {
            menu,
            avg_cogs_pct: safe_divide(pct_sum, count as f64),
            total_revenue,
            total_qty,
        })
        .collect()
}

/// Products with the highest mean COGS %, worst first.
pub fn high_cogs_menus(records: &[SalesRecord], top_n: usize) -> Vec<CogsExtremeRow> {
    let mut rows = menu_cogs_rollup(records);
    rows.sort_by(|a, b| {
        b.avg_cogs_pct
            .partial_cmp(&a.avg_cogs_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(top_n);
    rows
}

/// Products with the lowest mean COGS %, best first.
pub fn low_cogs_menus(records: &[SalesRecord], top_n: usize) -> Vec<CogsExtremeRow> {
    let mut rows = menu_cogs_rollup(records);
    rows.sort_by(|a, b| {
        a.avg_cogs_pct
            .partial_cmp(&b.avg_cogs_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows.truncate(top_n);
    rows
}

/// Cross-branch COGS consistency per product, most volatile first.
/// Needs at least two branches and a positive mean to be meaningful;
/// products failing that are omitted.
pub fn cogs_variance(rows: &[CogsProductRow]) -> Vec<CogsVarianceRow> {
    let mut menus: Vec<&str> = Vec::new();
    for row in rows {
        if !menus.iter().any(|m| *m == row.menu) {
            menus.push(row.menu.as_str());
        }
    }

    let mut out: Vec<CogsVarianceRow> = Vec::new();
    for menu in menus {
        let pcts: Vec<f64> = rows
            .iter()
            .filter(|r| r.menu == menu)
            .map(|r| r.avg_cogs_pct)
            .collect();
        if pcts.len() < 2 {
            continue;
        }
        let mean = pcts.iter().sum::<f64>() / pcts.len() as f64;
        if mean <= 0.0 {
            continue;
        }
        let variance =
            pcts.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (pcts.len() - 1) as f64;
        let std_dev = variance.sqrt();
        out.push(CogsVarianceRow {
            menu: menu.to_string(),
            mean_cogs_pct: mean,
            std_dev,
            cv: std_dev / mean,
            branch_count: pcts.len(),
        });
    }

    out.sort_by(|a, b| b.cv.partial_cmp(&a.cv).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Linear-interpolated quantile over an unsorted sample.
fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
    }
}

/// Data-driven COGS optimization recommendations, in the order the
/// COGS screen presents them.
pub fn optimization_recommendations(records: &[SalesRecord]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let worst = high_cogs_menus(records, 5);
    if let Some(worst_menu) = worst.first() {
        recommendations.push(Recommendation {
            title: "Optimize the highest-COGS product".to_string(),
            description: format!(
                "\"{}\" runs at {:.1}% COGS. Review its suppliers or recipe to bring ingredient cost down.",
                worst_menu.menu, worst_menu.avg_cogs_pct
            ),
            potential_saving: format!(
                "{} per period",
                crate::format::format_currency(Some(worst_menu.total_revenue * 0.05))
            ),
        });
    }

    // High-volume products with high COGS have the biggest payoff.
    let rollup = menu_cogs_rollup(records);
    if rollup.len() > 1 {
        let qty_threshold = quantile(
            &rollup.iter().map(|r| r.total_qty).collect::<Vec<f64>>(),
            0.7,
        );
        let pct_threshold = quantile(
            &rollup.iter().map(|r| r.avg_cogs_pct).collect::<Vec<f64>>(),
            0.7,
        );
        let priority_count = rollup
            .iter()
            .filter(|r| r.total_qty > qty_threshold && r.avg_cogs_pct > pct_threshold)
            .count();
        if priority_count > 0 {
            recommendations.push(Recommendation {
                title: "Prioritize high-volume, high-COGS products".to_string(),
                description: format!(
                    "{priority_count} product(s) sell in high volume but carry high COGS. Optimizing these has the largest impact."
                ),
                potential_saving: "Highest impact on overall profitability".to_string(),
            });
        }
    }

    let total_cogs: f64 = records.iter().map(|r| r.cogs_total).sum();
    recommendations.push(Recommendation {
        title: "Renegotiate with suppliers".to_string(),
        description:
            "Revisit contracts with the main suppliers, starting with high-volume purchase items."
                .to_string(),
        potential_saving: format!(
            "{} (est. 3% of total COGS)",
            crate::format::format_currency(Some(total_cogs * 0.03))
        ),
    });

    recommendations
}
