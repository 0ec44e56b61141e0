use chrono::NaiveDate;

use super::{month_start, week_start};
use crate::models::{SessionRecord, Topic, TopicId};

/// Minutes credited to one topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicMinutes {
    pub topic_id: TopicId,
    pub name: String,
    pub minutes: u32,
}

/// The derived minute fields of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicTotals {
    pub topic_id: TopicId,
    pub weekly: u32,
    pub monthly: u32,
    pub total: u32,
}

fn minutes_for(log: &[SessionRecord], topic: TopicId, since: Option<NaiveDate>) -> u32 {
    log.iter()
        .filter(|r| r.topic_id == topic && since.is_none_or(|start| r.date >= start))
        .fold(0u32, |acc, r| acc.saturating_add(r.minutes))
}

/// Minutes per topic since the first of the current month, in topic order.
///
/// Topics without sessions are listed with zero; sessions of deleted topics
/// are left out.
pub fn topic_monthly_breakdown(
    log: &[SessionRecord],
    topics: &[Topic],
    today: NaiveDate,
) -> Vec<TopicMinutes> {
    let since = month_start(today);
    topics
        .iter()
        .map(|topic| TopicMinutes {
            topic_id: topic.id,
            name: topic.name.clone(),
            minutes: minutes_for(log, topic.id, Some(since)),
        })
        .collect()
}

/// Weekly, monthly and all-time minutes for every topic
pub fn topic_totals(log: &[SessionRecord], topics: &[Topic], today: NaiveDate) -> Vec<TopicTotals> {
    let week = week_start(today);
    let month = month_start(today);
    topics
        .iter()
        .map(|topic| TopicTotals {
            topic_id: topic.id,
            weekly: minutes_for(log, topic.id, Some(week)),
            monthly: minutes_for(log, topic.id, Some(month)),
            total: minutes_for(log, topic.id, None),
        })
        .collect()
}

/// Share of the topic's weekly goal reached, `None` when it has no active goal
pub fn weekly_goal_progress(topic: &Topic, weekly_minutes: u32) -> Option<f64> {
    topic
        .weekly_goal_minutes()
        .filter(|&goal| goal > 0)
        .map(|goal| f64::from(weekly_minutes) / f64::from(goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: i64, topic: i64, date: NaiveDate, minutes: u32) -> SessionRecord {
        SessionRecord {
            id: SessionId(id),
            topic_id: TopicId(topic),
            minutes,
            date,
        }
    }

    fn topics() -> Vec<Topic> {
        vec![
            Topic::new(TopicId(1), "Math", "#60A5FA"),
            Topic::new(TopicId(2), "History", "#F87171"),
            Topic::new(TopicId(3), "Biology", "#34D399"),
        ]
    }

    #[test]
    fn test_breakdown_lists_every_topic() {
        let today = date(2024, 5, 15);
        let log = vec![
            record(1, 1, date(2024, 5, 2), 25),
            record(2, 1, date(2024, 5, 14), 50),
            record(3, 2, date(2024, 4, 30), 45), // last month
            record(4, 9, date(2024, 5, 14), 60), // deleted topic
        ];

        let breakdown = topic_monthly_breakdown(&log, &topics(), today);
        let minutes: Vec<_> = breakdown.iter().map(|t| (t.name.as_str(), t.minutes)).collect();
        assert_eq!(minutes, vec![("Math", 75), ("History", 0), ("Biology", 0)]);
    }

    #[test]
    fn test_breakdown_without_topics_is_empty() {
        let log = vec![record(1, 1, date(2024, 5, 2), 25)];
        assert!(topic_monthly_breakdown(&log, &[], date(2024, 5, 15)).is_empty());
    }

    #[test]
    fn test_topic_totals() {
        let today = date(2024, 5, 15); // week starts 2024-05-12
        let log = vec![
            record(1, 2, date(2024, 5, 13), 30),
            record(2, 2, date(2024, 5, 3), 20),
            record(3, 2, date(2023, 11, 3), 100),
        ];

        let totals = topic_totals(&log, &topics(), today);
        assert_eq!(
            totals[1],
            TopicTotals {
                topic_id: TopicId(2),
                weekly: 30,
                monthly: 50,
                total: 150,
            }
        );
        assert_eq!(totals[0].total, 0);
    }

    #[test]
    fn test_topic_totals_saturate() {
        let today = date(2024, 5, 15);
        let log = vec![
            record(1, 1, today, 3_000_000_000),
            record(2, 1, today, 3_000_000_000),
        ];

        let totals = topic_totals(&log, &topics(), today);
        assert_eq!(totals[0].weekly, u32::MAX);
        assert_eq!(totals[0].total, u32::MAX);
        assert_eq!(topic_monthly_breakdown(&log, &topics(), today)[0].minutes, u32::MAX);
    }

    #[test]
    fn test_weekly_goal_progress() {
        let topic = Topic::new(TopicId(1), "Math", "#60A5FA").with_goal(Some(2.0));
        assert_eq!(weekly_goal_progress(&topic, 60), Some(0.5));

        let no_goal = Topic::new(TopicId(2), "Art", "#60A5FA");
        assert_eq!(weekly_goal_progress(&no_goal, 60), None);
    }
}
