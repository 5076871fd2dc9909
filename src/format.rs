//! Display formatting and qualitative classification.
//!
//! Currency/number/percentage formatting mirrors the dashboard's
//! original filters (integer rupiah with thousand grouping, one
//! decimal for percentages, absent values render as zero). The tier
//! and status tables are classification rules, not cosmetics; the
//! thresholds and their evaluation order are part of the product
//! contract.

/// Product-name truncation limit in the Top Performers table.
pub const TABLE_LABEL_LIMIT: usize = 50;
/// Product-name truncation limit in the top-3 summary list.
pub const SUMMARY_LABEL_LIMIT: usize = 35;
/// Product-name truncation limit in selection dropdowns.
pub const DROPDOWN_LABEL_LIMIT: usize = 60;

/// "Rp 1,234,567" - integer-rounded, comma-grouped. Absent values
/// format as "Rp 0".
pub fn format_currency(value: Option<f64>) -> String {
    format!("Rp {}", group_thousands(value.unwrap_or(0.0)))
}

/// Comma-grouped integer count, absent as "0".
pub fn format_number(value: Option<f64>) -> String {
    group_thousands(value.unwrap_or(0.0))
}

/// One decimal plus "%", absent as "0.0%".
pub fn format_percentage(value: Option<f64>) -> String {
    format!("{:.1}%", value.unwrap_or(0.0))
}

fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    // Guard against payloads that smuggled a NaN/inf through arithmetic.
    let as_int = if rounded.is_finite() {
        rounded as i64
    } else {
        0
    };
    let digits = as_int.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if as_int < 0 {
        grouped.push('-');
    }
    let lead = digits.len() % 3;
    if lead > 0 {
        grouped.push_str(&digits[..lead]);
    }
    for (i, chunk) in digits[lead..].as_bytes().chunks(3).enumerate() {
        if lead > 0 || i > 0 {
            grouped.push(',');
        }
        grouped.push_str(std::str::from_utf8(chunk).unwrap_or(""));
    }
    if grouped.is_empty() || grouped == "-" {
        "0".to_string()
    } else {
        grouped
    }
}

/// Truncate a label to `max` characters plus an ellipsis. Each call
/// site passes its own limit; the three limits are independent.
pub fn truncate_label(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max).collect();
        format!("{cut}...")
    }
}

/// Rank badge tier. Three levels only - positions 11+ stay "fair";
/// there is deliberately no "poor" rank tier.
pub fn rank_tier(rank: usize) -> &'static str {
    match rank {
        1..=3 => "excellent",
        4..=10 => "good",
        _ => "fair",
    }
}

/// Margin badge tier, four levels.
pub fn margin_tier(margin_pct: f64) -> &'static str {
    if margin_pct > 30.0 {
        "excellent"
    } else if margin_pct > 20.0 {
        "good"
    } else if margin_pct > 10.0 {
        "fair"
    } else {
        "poor"
    }
}

/// Composite status combining rank position and margin percentage.
/// Evaluated in priority order, first match wins; the rank-gated
/// rules run before the margin-only "Average" rule.
pub fn composite_status(rank: usize, margin_pct: f64) -> &'static str {
    if rank <= 3 && margin_pct > 20.0 {
        "Star Product"
    } else if rank <= 10 && margin_pct > 15.0 {
        "Good Performer"
    } else if margin_pct > 10.0 {
        "Average"
    } else {
        "Needs Review"
    }
}
