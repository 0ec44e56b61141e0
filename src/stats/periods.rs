use std::collections::HashMap;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::models::SessionRecord;

/// Minutes studied today, this week (from Sunday) and this month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PeriodTotals {
    pub day: u32,
    pub week: u32,
    pub month: u32,
}

/// Minutes studied on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub minutes: u32,
}

/// Minutes studied in one calendar month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    /// First day of the month
    pub month: NaiveDate,
    /// Short month name, e.g. "Jan"
    pub label: String,
    pub minutes: u32,
}

impl MonthBucket {
    pub fn hours(&self) -> f64 {
        f64::from(self.minutes) / 60.0
    }
}

/// The most recent Sunday on or before `today`
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let offset = today.weekday().num_days_from_sunday();
    today - Days::new(u64::from(offset))
}

/// The first day of `today`'s month
pub fn month_start(today: NaiveDate) -> NaiveDate {
    today - Days::new(u64::from(today.day0()))
}

fn sum_where(log: &[SessionRecord], keep: impl Fn(NaiveDate) -> bool) -> u32 {
    log.iter()
        .filter(|r| keep(r.date))
        .fold(0u32, |acc, r| acc.saturating_add(r.minutes))
}

/// Day, week and month totals relative to `today`
pub fn period_totals(log: &[SessionRecord], today: NaiveDate) -> PeriodTotals {
    let week = week_start(today);
    let month = month_start(today);

    PeriodTotals {
        day: sum_where(log, |d| d == today),
        week: sum_where(log, |d| d >= week),
        month: sum_where(log, |d| d >= month),
    }
}

/// One bucket per day for the `window_days` days ending at `today`, oldest first.
///
/// Days without sessions are present with zero minutes.
pub fn daily_buckets(log: &[SessionRecord], today: NaiveDate, window_days: u32) -> Vec<DayBucket> {
    let mut per_day: HashMap<NaiveDate, u32> = HashMap::new();
    for record in log {
        let minutes = per_day.entry(record.date).or_default();
        *minutes = minutes.saturating_add(record.minutes);
    }

    (0..window_days)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
        .map(|date| DayBucket {
            date,
            minutes: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// Totals for the current month and the `months - 1` before it, oldest first
pub fn monthly_trend(log: &[SessionRecord], today: NaiveDate, months: u32) -> Vec<MonthBucket> {
    let current = month_start(today);

    (0..months)
        .rev()
        .filter_map(|back| {
            let first = current.checked_sub_months(Months::new(back))?;
            let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
            Some(MonthBucket {
                month: first,
                label: first.format("%b").to_string(),
                minutes: sum_where(log, |d| d >= first && d <= last),
            })
        })
        .collect()
}

/// Share of the daily goal reached today; 0.0 when no goal is set
pub fn daily_goal_progress(day_minutes: u32, goal_hours: f64) -> f64 {
    if goal_hours.is_nan() || goal_hours <= 0.0 {
        return 0.0;
    }
    f64::from(day_minutes) / (goal_hours * 60.0)
}
