use chrono::{DateTime, Local};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use super::next_id;

/// Stable identifier of a topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(pub i64);

impl TopicId {
    /// Allocate an id that is unique among `existing`
    pub fn next(existing: &[Topic], now: DateTime<Local>) -> Self {
        let last = existing.iter().map(|t| t.id.0).max();
        Self(next_id(now.timestamp_millis(), last))
    }
}

impl std::fmt::Display for TopicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_color() -> String {
    "#A1A1AA".to_string()
}

/// A subject of study that sessions are credited to.
///
/// Weekly, monthly and total minutes are not stored here; they are derived
/// from the session log on read (see `stats::topic_totals`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String, // Hex color like "#60A5FA"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_hours: Option<f64>,
    #[serde(default)]
    pub has_goal: bool,
}

impl Topic {
    /// Create a new topic without a weekly goal
    pub fn new(id: TopicId, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            goal_hours: None,
            has_goal: false,
        }
    }

    /// Set or clear the weekly goal
    pub fn with_goal(mut self, goal_hours: Option<f64>) -> Self {
        self.set_goal(goal_hours);
        self
    }

    pub fn set_goal(&mut self, goal_hours: Option<f64>) {
        self.has_goal = goal_hours.is_some_and(|h| h > 0.0);
        self.goal_hours = goal_hours;
    }

    /// Weekly target in minutes, only while the goal is active
    pub fn weekly_goal_minutes(&self) -> Option<u32> {
        match self.goal_hours {
            Some(hours) if self.has_goal && hours > 0.0 => Some((hours * 60.0).round() as u32),
            _ => None,
        }
    }

    /// Display color for the terminal
    pub fn display_color(&self) -> Color {
        parse_hex_color(&self.color)
    }
}

/// Parse a `#RRGGBB` string, falling back to gray
pub fn parse_hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::Gray;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF6B6B"), Color::Rgb(255, 107, 107));
        assert_eq!(parse_hex_color("4ECDC4"), Color::Rgb(78, 205, 196));
    }

    #[test]
    fn test_parse_hex_color_invalid_is_gray() {
        assert_eq!(parse_hex_color("#FFF"), Color::Gray);
        assert_eq!(parse_hex_color("#GGGGGG"), Color::Gray);
        assert_eq!(parse_hex_color("purple"), Color::Gray);
    }

    #[test]
    fn test_goal_activation() {
        let topic = Topic::new(TopicId(1), "Math", "#60A5FA");
        assert_eq!(topic.weekly_goal_minutes(), None);

        let topic = topic.with_goal(Some(2.5));
        assert!(topic.has_goal);
        assert_eq!(topic.weekly_goal_minutes(), Some(150));

        let topic = topic.with_goal(Some(0.0));
        assert!(!topic.has_goal);
        assert_eq!(topic.weekly_goal_minutes(), None);
    }

    #[test]
    fn test_next_topic_id_is_unique() {
        let now = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let first = TopicId::next(&[], now);
        let topics = vec![Topic::new(first, "A", "#000000")];
        let second = TopicId::next(&topics, now);
        assert!(second > first);
    }

    #[test]
    fn test_deserialize_tolerates_missing_optional_fields() {
        let topic: Topic = serde_json::from_str(r#"{"id": 7, "name": "History"}"#).unwrap();
        assert_eq!(topic.id, TopicId(7));
        assert_eq!(topic.color, "#A1A1AA");
        assert!(!topic.has_goal);
    }

    #[test]
    fn test_serialize_camel_case() {
        let topic = Topic::new(TopicId(3), "Physics", "#34D399").with_goal(Some(5.0));
        let json = serde_json::to_value(&topic).unwrap();
        assert_eq!(json["goalHours"], 5.0);
        assert_eq!(json["hasGoal"], true);
    }
}
