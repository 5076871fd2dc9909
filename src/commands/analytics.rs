//! Report commands: every dashboard view's payload.
//!
//! Each command re-runs the full pipeline over the current dataset
//! snapshot. Payload fields fall back to the stored selection state,
//! so the frontend can send only what changed. User-facing failures
//! come back as `success: false` with a distinct `code` the view
//! switches on; integration mistakes (an unknown sort key) reject the
//! call outright.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::branch_comparison::branch_revenue_comparison;
use crate::charts;
use crate::cogs;
use crate::commands::AppState;
use crate::dataset::Dataset;
use crate::error::AnalysisError;
use crate::format::{
    composite_status, format_currency, format_number, format_percentage, margin_tier, rank_tier,
    truncate_label, DROPDOWN_LABEL_LIMIT, SUMMARY_LABEL_LIMIT, TABLE_LABEL_LIMIT,
};
use crate::insights;
use crate::product_analysis::{
    aggregate_products, filter_branch, product_options, rank_products, resolve_product_detail,
    SortKey,
};
use crate::safe_divide;
use crate::time_analysis;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReportBranchPayload {
    #[serde(default, alias = "branch_id", alias = "branch")]
    branch_id: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReportTopPerformersPayload {
    #[serde(default, alias = "branch_id", alias = "branch")]
    branch_id: Option<String>,
    #[serde(default, alias = "sort_by", alias = "sortKey", alias = "sort_key")]
    sort_by: Option<String>,
    #[serde(default)]
    limit: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReportProductDetailPayload {
    #[serde(default, alias = "branch_id", alias = "branch")]
    branch_id: Option<String>,
    #[serde(default, alias = "menu_name", alias = "product")]
    menu: Option<String>,
}

fn normalize_payload_with_branch(arg0: Option<Value>) -> Value {
    match arg0 {
        Some(Value::String(branch_id)) => json!({ "branchId": branch_id }),
        Some(v) => v,
        None => json!({}),
    }
}

fn clean_opt(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// The current dataset, or the ready-made guidance envelope when
/// nothing has been uploaded yet.
fn snapshot_or_guidance(state: &AppState) -> Result<Arc<Dataset>, Value> {
    state.dataset.snapshot().ok_or_else(|| {
        json!({
            "success": false,
            "code": "noDataset",
            "error": "No data available. Please upload files first.",
        })
    })
}

/// Map a pipeline error to its user-facing envelope. Each condition
/// keeps a distinct code: `noBranchSelected` shows the pick-a-branch
/// guidance, `noData` tells the view to keep whatever it currently
/// shows, and `invalidBreakdown` makes the chart collaborator render
/// an explicit error affordance instead of an empty chart.
fn failure(error: &AnalysisError) -> Value {
    let (code, message) = match error {
        AnalysisError::NoBranchSelected => (
            "noBranchSelected",
            "No branch selected. Choose a branch to continue.",
        ),
        AnalysisError::NoDataForSelection => ("noData", "No data for this selection."),
        AnalysisError::InvalidBreakdown => (
            "invalidBreakdown",
            "This product has no positive components to chart. Pick a different product.",
        ),
        // Integration errors never reach this envelope; the command
        // rejects them before getting here.
        AnalysisError::InvalidSortKey(_) => ("invalidSortKey", "Unknown sort key."),
    };
    json!({ "success": false, "code": code, "error": message })
}

/// The ranked, formatted Top Performers table plus its summary strip.
pub fn report_get_top_performers(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_branch(arg0);
    let parsed: ReportTopPerformersPayload = serde_json::from_value(payload).unwrap_or_default();

    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };

    // Explicit payload values win; the stored selection fills the gaps.
    let selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    let branch = clean_opt(parsed.branch_id)
        .or_else(|| selection.branch().map(str::to_string))
        .unwrap_or_default();
    let sort_key = match parsed
        .sort_by
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(raw) => SortKey::parse(raw).map_err(|e| e.to_string())?,
        None => selection.sort_key(),
    };
    let limit = match parsed.limit.as_ref() {
        Some(raw) => super::selection::parse_limit_value(raw)?,
        None => selection.limit(),
    };
    drop(selection);

    let filtered = match filter_branch(&dataset.records, &branch) {
        Ok(f) => f,
        Err(error) => return Ok(failure(&error)),
    };
    let aggregates = aggregate_products(&filtered);
    if aggregates.is_empty() {
        return Ok(failure(&AnalysisError::NoDataForSelection));
    }

    let total_count = aggregates.len();
    let total_revenue: f64 = aggregates.iter().map(|a| a.revenue).sum();
    let margin_pct_sum: f64 = aggregates.iter().map(|a| a.margin_pct).sum();
    let avg_margin_pct = safe_divide(margin_pct_sum, total_count as f64);

    let ranked = rank_products(aggregates, sort_key, limit);
    let entries: Vec<Value> = ranked
        .iter()
        .map(|entry| {
            let agg = &entry.aggregate;
            json!({
                "rank": entry.rank,
                "rankTier": rank_tier(entry.rank),
                "menu": truncate_label(&agg.menu, TABLE_LABEL_LIMIT),
                "menuFull": agg.menu,
                "revenue": format_currency(Some(agg.revenue)),
                "quantity": format_number(Some(agg.qty)),
                "marginPct": format_percentage(Some(agg.margin_pct)),
                "marginTier": margin_tier(agg.margin_pct),
                "avgPrice": format_currency(Some(agg.avg_price)),
                "status": composite_status(entry.rank, agg.margin_pct),
            })
        })
        .collect();

    let top_products: Vec<String> = ranked
        .iter()
        .take(3)
        .map(|entry| truncate_label(&entry.aggregate.menu, SUMMARY_LABEL_LIMIT))
        .collect();

    Ok(json!({
        "success": true,
        "data": {
            "branch": branch,
            "sortBy": sort_key.as_str(),
            "entries": entries,
            "summary": {
                "topProducts": top_products,
                "totalRevenue": format_currency(Some(total_revenue)),
                "avgMarginPct": format_percentage(Some(avg_margin_pct)),
                "shownCount": ranked.len(),
                "totalCount": total_count,
            }
        }
    }))
}

/// Dropdown payload: distinct products of the active branch.
pub fn report_get_product_options(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_branch(arg0);
    let parsed: ReportBranchPayload = serde_json::from_value(payload).unwrap_or_default();

    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    let branch = clean_opt(parsed.branch_id)
        .or_else(|| selection.branch().map(str::to_string))
        .unwrap_or_default();
    drop(selection);

    let options = match product_options(&dataset.records, &branch) {
        Ok(options) => options,
        Err(error) => return Ok(failure(&error)),
    };
    let data: Vec<Value> = options
        .iter()
        .map(|menu| {
            json!({
                "value": menu,
                "label": truncate_label(menu, DROPDOWN_LABEL_LIMIT),
            })
        })
        .collect();

    Ok(json!({ "success": true, "data": data }))
}

/// Single-product detail: totals plus the financial composition chart
/// payload. On `noData` the frontend keeps the prior view; on
/// `invalidBreakdown` it shows the pick-another-product affordance.
pub fn report_get_product_detail(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_branch(arg0);
    let parsed: ReportProductDetailPayload = serde_json::from_value(payload).unwrap_or_default();

    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    let branch = clean_opt(parsed.branch_id)
        .or_else(|| selection.branch().map(str::to_string))
        .unwrap_or_default();
    let menu = clean_opt(parsed.menu)
        .or_else(|| selection.menu().map(str::to_string))
        .unwrap_or_default();
    drop(selection);

    let detail = match resolve_product_detail(&dataset.records, &branch, &menu) {
        Ok(detail) => detail,
        Err(error) => {
            warn!(branch = %branch, menu = %menu, error = %error, "Product detail unavailable");
            return Ok(failure(&error));
        }
    };

    let chart = charts::product_breakdown(&detail);
    let fallback_text = charts::fallback_summary(&chart);

    Ok(json!({
        "success": true,
        "data": {
            "menu": detail.menu,
            "branch": detail.branch,
            "totalRevenue": format_currency(Some(detail.revenue)),
            "totalQty": format_number(Some(detail.qty)),
            "totalMargin": format_currency(Some(detail.margin)),
            "avgMarginPct": format_percentage(Some(detail.margin_pct)),
            "breakdown": detail.breakdown,
            "chart": chart,
            "fallbackText": fallback_text,
        }
    }))
}

/// The cross-branch comparison table with its charts.
pub fn report_get_branch_comparison(state: &AppState) -> Result<Value, String> {
    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let rows = branch_revenue_comparison(&dataset.records);
    let chart_payload = json!({
        "revenueComparison": charts::revenue_bar(&rows),
        "performanceMatrix": charts::performance_matrix(&rows),
        "efficiency": charts::efficiency_bar(&rows),
    });
    Ok(json!({ "success": true, "data": { "rows": rows, "charts": chart_payload } }))
}

/// Time trends, optionally scoped to one branch (all branches when
/// the payload names none).
pub fn report_get_time_analysis(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_branch(arg0);
    let parsed: ReportBranchPayload = serde_json::from_value(payload).unwrap_or_default();
    let branch = clean_opt(parsed.branch_id);

    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let analysis = time_analysis::analyze(&dataset.records, branch.as_deref());
    Ok(json!({
        "success": true,
        "data": analysis,
        "summary": {
            "totalBranches": dataset.branches.len(),
            "dateRange": dataset.date_range_label(),
            "totalRecords": dataset.total_records(),
        }
    }))
}

/// The COGS screen: rollups, branch efficiency, extremes, variance,
/// and recommendations.
pub fn report_get_cogs_analysis(state: &AppState) -> Result<Value, String> {
    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let rows = cogs::cogs_per_product_per_branch(&dataset.records);
    if rows.is_empty() {
        return Ok(failure(&AnalysisError::NoDataForSelection));
    }
    let branch_efficiency = cogs::branch_cogs_efficiency(&rows);
    let variance = cogs::cogs_variance(&rows);
    Ok(json!({
        "success": true,
        "data": {
            "rows": rows,
            "branchEfficiency": branch_efficiency,
            "highCogs": cogs::high_cogs_menus(&dataset.records, 10),
            "lowCogs": cogs::low_cogs_menus(&dataset.records, 10),
            "variance": variance,
            "recommendations": cogs::optimization_recommendations(&dataset.records),
        }
    }))
}

/// Headline stats for the dashboard header.
pub fn report_get_summary_stats(state: &AppState) -> Result<Value, String> {
    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let stats = insights::branch_summary_stats(&dataset);
    let gross_margin_pct = safe_divide(stats.total_margin, stats.total_revenue) * 100.0;
    Ok(json!({
        "success": true,
        "formatted": {
            "totalRevenue": format_currency(Some(stats.total_revenue)),
            "totalMargin": format_currency(Some(stats.total_margin)),
            "grossMarginPct": format_percentage(Some(gross_margin_pct)),
        },
        "data": stats,
    }))
}

/// The dashboard landing view: headline stats plus its four charts.
pub fn report_get_dashboard(state: &AppState) -> Result<Value, String> {
    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    let rows = branch_revenue_comparison(&dataset.records);
    Ok(json!({
        "success": true,
        "data": {
            "summary": insights::branch_summary_stats(&dataset),
            "branches": dataset.branches,
            "charts": {
                "revenueBar": charts::revenue_bar(&rows),
                "revenuePie": charts::revenue_pie(&rows),
                "performanceMatrix": charts::performance_matrix(&rows),
                "topProducts": charts::top_products_bar(&dataset.records),
            }
        }
    }))
}

/// Cross-branch insights for the dashboard's insight cards.
pub fn report_get_insights(state: &AppState) -> Result<Value, String> {
    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    Ok(json!({
        "success": true,
        "data": insights::cross_branch_insights(&dataset),
    }))
}

/// The data context handed to the chat collaborator.
pub fn report_get_ai_context(state: &AppState) -> Result<Value, String> {
    let dataset = match snapshot_or_guidance(state) {
        Ok(d) => d,
        Err(resp) => return Ok(resp),
    };
    Ok(json!({
        "success": true,
        "data": insights::ai_context(&dataset),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::dataset::dataset_load;

    /// Two branches; Kemang has a long-named product and a loss maker.
    fn loaded_state() -> AppState {
        let state = AppState::new();
        let long_name = "Paket Keluarga Spesial Ayam Bakar Madu dengan Nasi Uduk Komplit";
        let payload = json!({
            "files": [{
                "name": "kemang.xlsx",
                "branch": "Kemang",
                "rows": [
                    { "menu": "Sate Ayam", "qty": 10, "total": 350000, "margin": 140000, "cogsTotal": 210000, "salesDate": "2025-06-02 12:00:00" },
                    { "menu": "Sate Ayam", "qty": 5, "total": 175000, "margin": 70000, "cogsTotal": 105000, "salesDate": "2025-06-03 19:00:00" },
                    { "menu": long_name, "qty": 2, "total": 150000, "margin": 30000, "cogsTotal": 120000, "salesDate": "2025-06-02 13:00:00" },
                    { "menu": "Es Teh", "qty": 20, "total": 160000, "margin": 96000, "cogsTotal": 64000, "salesDate": "2025-06-02 12:30:00" },
                    { "menu": "Promo Gratis", "qty": 1, "total": 1000, "margin": -200, "cogsTotal": 1200 }
                ]
            }, {
                "name": "senopati.xlsx",
                "branch": "Senopati",
                "rows": [
                    { "menu": "Bakso", "qty": 4, "total": 100000, "margin": 30000, "cogsTotal": 70000, "salesDate": "2025-06-02 18:00:00" }
                ]
            }]
        });
        dataset_load(&state, Some(payload)).expect("seed dataset");
        state
    }

    #[test]
    fn top_performers_ranks_formats_and_classifies() {
        let state = loaded_state();
        let result = report_get_top_performers(
            &state,
            Some(json!({ "branchId": "Kemang", "sortBy": "revenue" })),
        )
        .expect("report");
        assert_eq!(result["success"], true);

        let entries = result["data"]["entries"].as_array().expect("entries");
        assert_eq!(entries.len(), 4);

        // Sate Ayam: 525,000 revenue, 40% margin, rank 1 -> Star Product.
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[0]["menuFull"], "Sate Ayam");
        assert_eq!(entries[0]["revenue"], "Rp 525,000");
        assert_eq!(entries[0]["quantity"], "15");
        assert_eq!(entries[0]["marginPct"], "40.0%");
        assert_eq!(entries[0]["rankTier"], "excellent");
        assert_eq!(entries[0]["marginTier"], "excellent");
        assert_eq!(entries[0]["status"], "Star Product");
        assert_eq!(entries[0]["avgPrice"], "Rp 35,000");

        // The 63-char menu truncates to 50 + ellipsis in the table.
        let long_entry = entries
            .iter()
            .find(|e| e["menuFull"].as_str().unwrap().starts_with("Paket"))
            .expect("long-name entry");
        assert_eq!(long_entry["menu"].as_str().unwrap().chars().count(), 53);
        assert!(long_entry["menu"].as_str().unwrap().ends_with("..."));

        let summary = &result["data"]["summary"];
        assert_eq!(summary["shownCount"], 4);
        assert_eq!(summary["totalCount"], 4);
        let top = summary["topProducts"].as_array().expect("top products");
        assert_eq!(top.len(), 3);
        // Summary names use the tighter 35-char limit.
        assert!(top
            .iter()
            .all(|n| n.as_str().unwrap().chars().count() <= 38));
    }

    #[test]
    fn top_performers_limit_and_unbounded() {
        let state = loaded_state();
        let limited =
            report_get_top_performers(&state, Some(json!({ "branchId": "Kemang", "limit": 2 })))
                .expect("report");
        assert_eq!(limited["data"]["entries"].as_array().unwrap().len(), 2);
        assert_eq!(limited["data"]["summary"]["shownCount"], 2);
        assert_eq!(limited["data"]["summary"]["totalCount"], 4);

        let unbounded = report_get_top_performers(
            &state,
            Some(json!({ "branchId": "Kemang", "limit": "all" })),
        )
        .expect("report");
        assert_eq!(unbounded["data"]["entries"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn top_performers_distinct_failure_signals() {
        let fresh = AppState::new();
        let no_dataset = report_get_top_performers(&fresh, None).expect("report");
        assert_eq!(no_dataset["success"], false);
        assert_eq!(no_dataset["code"], "noDataset");

        let state = loaded_state();
        let no_branch = report_get_top_performers(&state, None).expect("report");
        assert_eq!(no_branch["success"], false);
        assert_eq!(no_branch["code"], "noBranchSelected");

        let no_data = report_get_top_performers(&state, Some(json!({ "branchId": "Tebet" })))
            .expect("report");
        assert_eq!(no_data["success"], false);
        assert_eq!(no_data["code"], "noData");

        let invalid_sort = report_get_top_performers(
            &state,
            Some(json!({ "branchId": "Kemang", "sortBy": "popularity" })),
        );
        assert!(invalid_sort.is_err());
        assert!(invalid_sort.unwrap_err().contains("popularity"));
    }

    #[test]
    fn top_performers_falls_back_to_selection_state() {
        let state = loaded_state();
        crate::commands::selection::selection_select_branch(&state, Some(json!("Kemang")))
            .expect("select branch");
        crate::commands::selection::selection_set_sort(&state, Some(json!("quantity")))
            .expect("set sort");

        let result = report_get_top_performers(&state, None).expect("report");
        assert_eq!(result["success"], true);
        assert_eq!(result["data"]["sortBy"], "quantity");
        // Es Teh sold 20 units, the most by quantity.
        assert_eq!(result["data"]["entries"][0]["menuFull"], "Es Teh");
    }

    #[test]
    fn product_options_are_sorted_and_truncated() {
        let state = loaded_state();
        let result = report_get_product_options(&state, Some(json!({ "branchId": "Kemang" })))
            .expect("options");
        let data = result["data"].as_array().expect("options array");
        assert_eq!(data.len(), 4);
        let labels: Vec<&str> = data.iter().map(|o| o["label"].as_str().unwrap()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
        // 63-char name passes the 60-char dropdown limit with ellipsis.
        assert!(labels
            .iter()
            .any(|l| l.ends_with("...") && l.chars().count() == 63));
    }

    #[test]
    fn product_detail_success_and_single_slice() {
        let state = loaded_state();
        let result = report_get_product_detail(
            &state,
            Some(json!({ "branchId": "Kemang", "menu": "Sate Ayam" })),
        )
        .expect("detail");
        assert_eq!(result["success"], true);
        assert_eq!(result["data"]["totalRevenue"], "Rp 525,000");
        assert_eq!(result["data"]["breakdown"].as_array().unwrap().len(), 3);
        assert!(result["data"]["fallbackText"]
            .as_str()
            .unwrap()
            .contains("Sate Ayam"));

        // The loss maker keeps only its COGS slice; that is still a
        // renderable chart, not a failure.
        let loss = report_get_product_detail(
            &state,
            Some(json!({ "branchId": "Kemang", "menu": "Promo Gratis" })),
        )
        .expect("detail");
        assert_eq!(loss["success"], true);
        let slices = loss["data"]["chart"]["points"].as_array().unwrap();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0]["label"], "COGS");
    }

    #[test]
    fn product_detail_failure_codes() {
        let state = loaded_state();
        let no_data = report_get_product_detail(
            &state,
            Some(json!({ "branchId": "Kemang", "menu": "Tidak Ada" })),
        )
        .expect("detail");
        assert_eq!(no_data["success"], false);
        assert_eq!(no_data["code"], "noData");

        let no_branch = report_get_product_detail(&state, Some(json!({ "menu": "Sate Ayam" })))
            .expect("detail");
        assert_eq!(no_branch["code"], "noBranchSelected");
    }

    #[test]
    fn branch_comparison_payload_shape() {
        let state = loaded_state();
        let result = report_get_branch_comparison(&state).expect("comparison");
        assert_eq!(result["success"], true);
        let rows = result["data"]["rows"].as_array().expect("rows");
        assert_eq!(rows.len(), 2);
        // Kemang out-earns Senopati and leads the ranking.
        assert_eq!(rows[0]["branch"], "Kemang");
        assert_eq!(rows[0]["revenueRank"], 1);
        assert!(
            result["data"]["charts"]["revenueComparison"]["points"]
                .as_array()
                .unwrap()
                .len()
                <= 10
        );
    }

    #[test]
    fn time_analysis_scopes_by_branch() {
        let state = loaded_state();
        let all = report_get_time_analysis(&state, None).expect("time");
        assert_eq!(all["success"], true);
        assert_eq!(all["summary"]["totalBranches"], 2);
        assert_eq!(all["data"]["hourly"].as_array().unwrap().len(), 24);

        let kemang =
            report_get_time_analysis(&state, Some(json!({ "branchId": "Kemang" }))).expect("time");
        // Senopati's 18:00 sale is out of scope here.
        assert_eq!(kemang["data"]["hourly"][18]["orders"], 0);
        assert_eq!(kemang["data"]["undatedRecords"], 1);
    }

    #[test]
    fn cogs_analysis_payload_shape() {
        let state = loaded_state();
        let result = report_get_cogs_analysis(&state).expect("cogs");
        assert_eq!(result["success"], true);
        assert!(!result["data"]["rows"].as_array().unwrap().is_empty());
        assert_eq!(
            result["data"]["branchEfficiency"].as_array().unwrap().len(),
            2
        );
        assert!(!result["data"]["recommendations"]
            .as_array()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn summary_stats_formats_headline_numbers() {
        let state = loaded_state();
        let result = report_get_summary_stats(&state).expect("summary");
        assert_eq!(result["success"], true);
        assert_eq!(result["data"]["totalBranches"], 2);
        assert_eq!(result["data"]["totalRecords"], 6);
        assert_eq!(result["formatted"]["totalRevenue"], "Rp 936,000");
    }

    #[test]
    fn dashboard_and_insights_and_ai_context() {
        let state = loaded_state();
        let dashboard = report_get_dashboard(&state).expect("dashboard");
        assert_eq!(dashboard["success"], true);
        assert!(
            dashboard["data"]["charts"]["topProducts"]["points"]
                .as_array()
                .unwrap()
                .len()
                <= 10
        );

        let insights = report_get_insights(&state).expect("insights");
        assert_eq!(insights["success"], true);

        let context = report_get_ai_context(&state).expect("context");
        assert_eq!(
            context["data"]["branchPerformance"]["bestBranch"]["name"],
            "Kemang"
        );
    }
}
