//! Selection commands: the UI's branch/product/sort/limit events.
//!
//! Each event mutates the adapter-owned state machine and echoes the
//! resulting state back, so the frontend re-renders from the response
//! instead of tracking its own copy.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::commands::AppState;
use crate::product_analysis::SortKey;
use crate::selection::SelectionState;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SelectBranchPayload {
    #[serde(default, alias = "branch_id", alias = "branch")]
    branch_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectProductPayload {
    #[serde(alias = "menu_name", alias = "product")]
    menu: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetSortPayload {
    #[serde(alias = "sort_by", alias = "sortKey", alias = "sort_key")]
    sort_by: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SetLimitPayload {
    #[serde(default)]
    limit: Option<Value>,
}

fn normalize_payload_with_key(arg0: Option<Value>, key: &str) -> Value {
    match arg0 {
        Some(Value::String(s)) => json!({ key: s }),
        Some(v) => v,
        None => json!({}),
    }
}

fn state_json(state: &SelectionState) -> Value {
    json!({
        "selection": state.selection(),
        "sortBy": state.sort_key().as_str(),
        "limit": state.limit(),
    })
}

/// Parse the result-count limit: a positive integer, or the "all"
/// sentinel (also accepted as 0 or null) meaning unbounded.
pub(crate) fn parse_limit_value(raw: &Value) -> Result<Option<usize>, String> {
    match raw {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().eq_ignore_ascii_case("all") => Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(None),
            Some(v) if v > 0 => Ok(Some(v as usize)),
            _ => Err(format!("Invalid limit: {n}")),
        },
        other => Err(format!("Invalid limit: {other}")),
    }
}

fn parse_limit(raw: Option<&Value>) -> Result<Option<usize>, String> {
    match raw {
        None => Ok(None),
        Some(v) => parse_limit_value(v),
    }
}

/// Branch changed (or cleared). An empty/absent branch returns the
/// machine to its initial state; any branch resets the product.
pub fn selection_select_branch(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_key(arg0, "branchId");
    let parsed: SelectBranchPayload = serde_json::from_value(payload).unwrap_or_default();

    let mut selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    selection.select_branch(parsed.branch_id.as_deref());
    Ok(json!({ "success": true, "data": state_json(&selection) }))
}

/// Product changed within the active branch.
pub fn selection_select_product(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_key(arg0, "menu");
    let parsed: SelectProductPayload =
        serde_json::from_value(payload).map_err(|e| format!("Invalid product payload: {e}"))?;

    let mut selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    match selection.select_product(&parsed.menu) {
        Ok(()) => Ok(json!({ "success": true, "data": state_json(&selection) })),
        Err(error) => Ok(json!({
            "success": false,
            "error": error.to_string(),
        })),
    }
}

/// Sort key changed. Unknown keys fail loudly; a valid key in the
/// NoBranch state is recorded as not applied.
pub fn selection_set_sort(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = normalize_payload_with_key(arg0, "sortBy");
    let parsed: SetSortPayload =
        serde_json::from_value(payload).map_err(|e| format!("Invalid sort payload: {e}"))?;
    let key = SortKey::parse(&parsed.sort_by).map_err(|e| e.to_string())?;

    let mut selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    let applied = selection.set_sort_key(key);
    Ok(json!({
        "success": true,
        "applied": applied,
        "data": state_json(&selection),
    }))
}

/// Result-count limit changed.
pub fn selection_set_limit(state: &AppState, arg0: Option<Value>) -> Result<Value, String> {
    let payload = match arg0 {
        Some(v @ Value::Number(_)) | Some(v @ Value::String(_)) => json!({ "limit": v }),
        Some(v) => v,
        None => json!({}),
    };
    let parsed: SetLimitPayload = serde_json::from_value(payload).unwrap_or_default();
    let limit = parse_limit(parsed.limit.as_ref())?;

    let mut selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    let applied = selection.set_limit(limit);
    Ok(json!({
        "success": true,
        "applied": applied,
        "data": state_json(&selection),
    }))
}

/// Current selection state.
pub fn selection_get_state(state: &AppState) -> Result<Value, String> {
    let selection = state.selection.lock().unwrap_or_else(|e| e.into_inner());
    Ok(json!({ "success": true, "data": state_json(&selection) }))
}
