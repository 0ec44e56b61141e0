use super::DayBucket;

/// Streak of qualifying days ending at the most recent bucket.
///
/// Today is still in progress, so it is judged on its own: it adds a day once
/// it reaches the threshold but never breaks the streak while below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakSummary {
    /// Consecutive qualifying days before today
    pub committed: u32,
    /// Whether today already reached the threshold
    pub today_counted: bool,
}

impl StreakSummary {
    /// Total streak including today when it counts
    pub fn days(&self) -> u32 {
        self.committed + u32::from(self.today_counted)
    }
}

/// Walk `buckets` (oldest first, last one is today) backward
pub fn streak_summary(buckets: &[DayBucket], threshold_minutes: u32) -> StreakSummary {
    let Some((today, past)) = buckets.split_last() else {
        return StreakSummary::default();
    };

    let committed = past
        .iter()
        .rev()
        .take_while(|b| b.minutes >= threshold_minutes)
        .count() as u32;

    StreakSummary {
        committed,
        today_counted: today.minutes >= threshold_minutes,
    }
}

/// Number of streak days, today included once it qualifies
pub fn current_streak(buckets: &[DayBucket], threshold_minutes: u32) -> u32 {
    streak_summary(buckets, threshold_minutes).days()
}
