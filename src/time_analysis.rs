//! Time-based sales analyses for the Branch Trends view.
//!
//! Hourly profile, day-of-week pattern, daily trend (with a 7-day
//! trailing moving average), ISO-week totals, and monthly totals.
//! Only records with a sale timestamp participate here; everything
//! else in the crate ignores timestamps entirely.

use chrono::{Datelike, NaiveDate, Timelike};
use serde::Serialize;

use crate::records::SalesRecord;
use crate::safe_divide;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    pub hour: u32,
    pub revenue: f64,
    pub qty: f64,
    pub margin: f64,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOfWeekPoint {
    pub day: &'static str,
    pub total_revenue: f64,
    pub avg_revenue: f64,
    pub total_qty: f64,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub qty: f64,
    pub margin: f64,
    /// Trailing 7-day moving average of revenue (shorter at the head).
    pub revenue_ma_7: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPoint {
    pub week: u32,
    pub revenue: f64,
    pub qty: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    pub month: u32,
    pub revenue: f64,
    pub qty: f64,
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeAnalysis {
    /// All 24 hours, zero-filled where nothing sold.
    pub hourly: Vec<HourlyPoint>,
    /// Monday-first, all 7 days, zero-filled.
    pub daily_pattern: Vec<DayOfWeekPoint>,
    /// Date-ascending.
    pub daily_trend: Vec<DailyPoint>,
    /// ISO-week ascending.
    pub weekly: Vec<WeeklyPoint>,
    /// Calendar-month ascending.
    pub monthly: Vec<MonthlyPoint>,
    /// Records that carried no timestamp and were excluded here.
    pub undated_records: usize,
}

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Run every time analysis over the record sequence, optionally
/// narrowed to one branch (exact match). `None` analyzes all branches
/// combined.
pub fn analyze(records: &[SalesRecord], branch: Option<&str>) -> TimeAnalysis {
    let scoped: Vec<&SalesRecord> = records
        .iter()
        .filter(|r| branch.map_or(true, |b| r.branch == b))
        .collect();
    let undated_records = scoped.iter().filter(|r| r.sold_at.is_none()).count();
    let dated: Vec<(&SalesRecord, chrono::NaiveDateTime)> = scoped
        .iter()
        .filter_map(|r| r.sold_at.map(|dt| (*r, dt)))
        .collect();

    // Hourly: fixed 24-slot accumulation.
    let mut hourly: Vec<HourlyPoint> = (0..24)
        .map(|hour| HourlyPoint {
            hour,
            revenue: 0.0,
            qty: 0.0,
            margin: 0.0,
            orders: 0,
        })
        .collect();
    for (record, dt) in &dated {
        let slot = &mut hourly[dt.hour() as usize];
        slot.revenue += record.total;
        slot.qty += record.qty;
        slot.margin += record.margin;
        slot.orders += 1;
    }

    // Day-of-week pattern, Monday-first regardless of data order.
    let mut daily_pattern: Vec<DayOfWeekPoint> = DAY_NAMES
        .iter()
        .map(|&day| DayOfWeekPoint {
            day,
            total_revenue: 0.0,
            avg_revenue: 0.0,
            total_qty: 0.0,
            orders: 0,
        })
        .collect();
    for (record, dt) in &dated {
        let slot = &mut daily_pattern[dt.weekday().num_days_from_monday() as usize];
        slot.total_revenue += record.total;
        slot.total_qty += record.qty;
        slot.orders += 1;
    }
    for slot in &mut daily_pattern {
        slot.avg_revenue = safe_divide(slot.total_revenue, slot.orders as f64);
    }

    // Daily trend, date-ascending, then the trailing moving average.
    let mut daily_trend: Vec<DailyPoint> = Vec::new();
    for (record, dt) in &dated {
        let date = dt.date();
        let idx = match daily_trend.iter().position(|p| p.date == date) {
            Some(i) => i,
            None => {
                daily_trend.push(DailyPoint {
                    date,
                    revenue: 0.0,
                    qty: 0.0,
                    margin: 0.0,
                    revenue_ma_7: 0.0,
                });
                daily_trend.len() - 1
            }
        };
        let slot = &mut daily_trend[idx];
        slot.revenue += record.total;
        slot.qty += record.qty;
        slot.margin += record.margin;
    }
    daily_trend.sort_by_key(|p| p.date);
    for i in 0..daily_trend.len() {
        let window_start = i.saturating_sub(6);
        let window_len = (i - window_start + 1) as f64;
        let sum: f64 = daily_trend[window_start..=i].iter().map(|p| p.revenue).sum();
        daily_trend[i].revenue_ma_7 = sum / window_len;
    }

    // ISO-week totals.
    let mut weekly: Vec<WeeklyPoint> = Vec::new();
    for (record, dt) in &dated {
        let week = dt.iso_week().week();
        let idx = match weekly.iter().position(|p| p.week == week) {
            Some(i) => i,
            None => {
                weekly.push(WeeklyPoint {
                    week,
                    revenue: 0.0,
                    qty: 0.0,
                    margin: 0.0,
                });
                weekly.len() - 1
            }
        };
        let slot = &mut weekly[idx];
        slot.revenue += record.total;
        slot.qty += record.qty;
        slot.margin += record.margin;
    }
    weekly.sort_by_key(|p| p.week);

    // Monthly totals.
    let mut monthly: Vec<MonthlyPoint> = Vec::new();
    for (record, dt) in &dated {
        let month = dt.month();
        let idx = match monthly.iter().position(|p| p.month == month) {
            Some(i) => i,
            None => {
                monthly.push(MonthlyPoint {
                    month,
                    revenue: 0.0,
                    qty: 0.0,
                    margin: 0.0,
                });
                monthly.len() - 1
            }
        };
        let slot = &mut monthly[idx];
        slot.revenue += record.total;
        slot.qty += record.qty;
        slot.margin += record.margin;
    }
    monthly.sort_by_key(|p| p.month);

    TimeAnalysis {
        hourly,
        daily_pattern,
        daily_trend,
        weekly,
        monthly,
        undated_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_sales_date;

    fn record(branch: &str, total: f64, date: &str) -> SalesRecord {
        SalesRecord {
            branch: branch.to_string(),
            menu: "Sate".to_string(),
            qty: 1.0,
            total,
            margin: total * 0.3,
            cogs_total: total * 0.7,
            cogs_pct: 70.0,
            sold_at: parse_sales_date(date),
        }
    }

    #[test]
    fn hourly_profile_has_all_24_slots() {
        let records = vec![
            record("Kemang", 100.0, "2025-06-02 11:15:00"),
            record("Kemang", 50.0, "2025-06-02 11:45:00"),
            record("Kemang", 80.0, "2025-06-02 19:05:00"),
        ];
        let analysis = analyze(&records, None);
        assert_eq!(analysis.hourly.len(), 24);
        assert_eq!(analysis.hourly[11].revenue, 150.0);
        assert_eq!(analysis.hourly[11].orders, 2);
        assert_eq!(analysis.hourly[19].revenue, 80.0);
        assert_eq!(analysis.hourly[0].orders, 0);
    }

    #[test]
    fn day_of_week_pattern_is_monday_first() {
        // 2025-06-01 is a Sunday, 2025-06-02 a Monday.
        let records = vec![
            record("Kemang", 40.0, "2025-06-01 12:00:00"),
            record("Kemang", 100.0, "2025-06-02 12:00:00"),
            record("Kemang", 60.0, "2025-06-02 18:00:00"),
        ];
        let analysis = analyze(&records, None);
        let days: Vec<&str> = analysis.daily_pattern.iter().map(|p| p.day).collect();
        assert_eq!(days[0], "Monday");
        assert_eq!(days[6], "Sunday");

        let monday = &analysis.daily_pattern[0];
        assert_eq!(monday.total_revenue, 160.0);
        assert_eq!(monday.avg_revenue, 80.0);
        let sunday = &analysis.daily_pattern[6];
        assert_eq!(sunday.total_revenue, 40.0);
    }

    #[test]
    fn daily_trend_is_sorted_with_trailing_moving_average() {
        // Deliberately out of order.
        let records = vec![
            record("Kemang", 30.0, "2025-06-03 12:00:00"),
            record("Kemang", 10.0, "2025-06-01 12:00:00"),
            record("Kemang", 20.0, "2025-06-02 12:00:00"),
        ];
        let analysis = analyze(&records, None);
        let revenues: Vec<f64> = analysis.daily_trend.iter().map(|p| p.revenue).collect();
        assert_eq!(revenues, vec![10.0, 20.0, 30.0]);

        // min(window, available): 10, (10+20)/2, (10+20+30)/3.
        let ma: Vec<f64> = analysis.daily_trend.iter().map(|p| p.revenue_ma_7).collect();
        assert_eq!(ma, vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn weekly_and_monthly_totals() {
        let records = vec![
            record("Kemang", 10.0, "2025-06-02 12:00:00"), // ISO week 23
            record("Kemang", 20.0, "2025-06-09 12:00:00"), // ISO week 24
            record("Kemang", 40.0, "2025-07-01 12:00:00"),
        ];
        let analysis = analyze(&records, None);
        assert_eq!(analysis.weekly.len(), 3);
        assert_eq!(analysis.weekly[0].week, 23);
        assert_eq!(analysis.weekly[0].revenue, 10.0);

        assert_eq!(analysis.monthly.len(), 2);
        assert_eq!(analysis.monthly[0].month, 6);
        assert_eq!(analysis.monthly[0].revenue, 30.0);
        assert_eq!(analysis.monthly[1].month, 7);
        assert_eq!(analysis.monthly[1].revenue, 40.0);
    }

    #[test]
    fn branch_scope_and_undated_records() {
        let records = vec![
            record("Kemang", 100.0, "2025-06-02 12:00:00"),
            record("Senopati", 900.0, "2025-06-02 12:00:00"),
            record("Kemang", 50.0, "not a date"),
        ];
        let kemang = analyze(&records, Some("Kemang"));
        assert_eq!(kemang.hourly[12].revenue, 100.0);
        assert_eq!(kemang.undated_records, 1);

        let all = analyze(&records, None);
        assert_eq!(all.hourly[12].revenue, 1000.0);
    }
}
