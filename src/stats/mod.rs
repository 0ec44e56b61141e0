//! Statistics derived from the session log.
//!
//! Every function here is pure: it reads the log (and topics) for a reference
//! day and returns a fresh value. Nothing is cached and the log is never
//! mutated, so results can be recomputed at any time. All comparisons are on
//! local calendar dates.

mod periods;
mod streak;
mod topics;

pub use periods::{
    DayBucket, MonthBucket, daily_buckets, daily_goal_progress, month_start,
    monthly_trend, period_totals, week_start,
};
pub use streak::{current_streak, streak_summary};
pub use topics::{
    TopicMinutes, TopicTotals, topic_monthly_breakdown, topic_totals, weekly_goal_progress,
};

/// Largest value of `series`, never below `floor`.
///
/// Used to scale chart bars without dividing by zero.
pub fn max_of<T: Copy + PartialOrd>(series: &[T], floor: T) -> T {
    series
        .iter()
        .copied()
        .fold(floor, |max, v| if v > max { v } else { max })
}

/// Format minutes as hours with one decimal, e.g. "1.5h"
pub fn format_hours(minutes: u32) -> String {
    format!("{:.1}h", f64::from(minutes) / 60.0)
}
