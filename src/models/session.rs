use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{TopicId, next_id};

/// Unique, creation-ordered identifier of a session record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

/// Time credited to a topic by the timer, not yet stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCredit {
    pub topic_id: TopicId,
    pub minutes: u32,
    pub date: NaiveDate,
}

/// A completed (or paused) focus session: `minutes` spent on a topic on a
/// local calendar date. Records are immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: SessionId,
    pub topic_id: TopicId,
    pub minutes: u32,
    pub date: NaiveDate, // serialized as YYYY-MM-DD
}

impl SessionRecord {
    /// Format minutes as "Xh Ym" or "Xm"
    pub fn format_duration(&self) -> String {
        let hours = self.minutes / 60;
        let remaining_minutes = self.minutes % 60;

        if hours > 0 {
            format!("{}h {}m", hours, remaining_minutes)
        } else {
            format!("{}m", self.minutes)
        }
    }
}

/// Append-only session history, the single source of truth for statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLog {
    records: Vec<SessionRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from loaded records, dropping any that credit no time
    pub fn from_records(records: Vec<SessionRecord>) -> Self {
        let records = records.into_iter().filter(|r| r.minutes > 0).collect();
        Self { records }
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Store a credit as a new record.
    ///
    /// Returns `None` without touching the log when the credit has no minutes.
    pub fn record(&mut self, credit: SessionCredit, now: DateTime<Local>) -> Option<&SessionRecord> {
        if credit.minutes == 0 {
            return None;
        }

        let last = self.records.iter().map(|r| r.id.0).max();
        self.records.push(SessionRecord {
            id: SessionId(next_id(now.timestamp_millis(), last)),
            topic_id: credit.topic_id,
            minutes: credit.minutes,
            date: credit.date,
        });
        self.records.last()
    }

    /// Drop every record (full data reset only)
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credit(minutes: u32) -> SessionCredit {
        SessionCredit {
            topic_id: TopicId(1),
            minutes,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }
    }

    #[test]
    fn test_record_appends_with_increasing_ids() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let mut log = SessionLog::new();

        let first = log.record(credit(25), now).unwrap().id;
        let second = log.record(credit(10), now).unwrap().id;

        assert_eq!(log.len(), 2);
        assert!(second > first);
        assert_eq!(log.records()[1].minutes, 10);
    }

    #[test]
    fn test_record_refuses_zero_minutes() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let mut log = SessionLog::new();
        assert!(log.record(credit(0), now).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_from_records_drops_empty_sessions() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let log = SessionLog::from_records(vec![
            SessionRecord {
                id: SessionId(1),
                topic_id: TopicId(1),
                minutes: 0,
                date,
            },
            SessionRecord {
                id: SessionId(2),
                topic_id: TopicId(1),
                minutes: 30,
                date,
            },
        ]);
        assert_eq!(log.len(), 1);
        assert_eq!(log.records()[0].id, SessionId(2));
    }

    #[test]
    fn test_format_duration() {
        let record = SessionRecord {
            id: SessionId(1),
            topic_id: TopicId(1),
            minutes: 95,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        assert_eq!(record.format_duration(), "1h 35m");
    }

    #[test]
    fn test_date_serializes_as_calendar_day() {
        let record = SessionRecord {
            id: SessionId(1704189600000),
            topic_id: TopicId(3),
            minutes: 25,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2024-01-02");
        assert_eq!(json["topicId"], 3);
    }
}
