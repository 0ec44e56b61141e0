mod session;
mod settings;
mod topic;

pub use session::{SessionCredit, SessionId, SessionLog, SessionRecord};
pub use settings::{Settings, Theme};
pub use topic::{Topic, TopicId, parse_hex_color};

/// Next wall-clock derived id: the current millisecond, bumped past `last` so
/// ids stay unique and strictly increasing even within one millisecond.
pub(crate) fn next_id(now_millis: i64, last: Option<i64>) -> i64 {
    match last {
        Some(last) if last >= now_millis => last + 1,
        _ => now_millis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id_uses_clock_when_ahead() {
        assert_eq!(next_id(1_000, Some(500)), 1_000);
        assert_eq!(next_id(1_000, None), 1_000);
    }

    #[test]
    fn test_next_id_bumps_past_last() {
        assert_eq!(next_id(1_000, Some(1_000)), 1_001);
        assert_eq!(next_id(1_000, Some(2_000)), 2_001);
    }
}
