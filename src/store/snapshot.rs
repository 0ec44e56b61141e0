use chrono::{DateTime, Local, NaiveDate};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::StoreError;
use crate::config::MAX_RECORD_MINUTES;
use crate::models::{SessionRecord, Settings, Topic};
use crate::validation::validate_session_minutes;

/// Everything the app persists: topics, history and settings
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub topics: Vec<Topic>,
    pub history: Vec<SessionRecord>,
    #[serde(flatten)]
    pub settings: Settings,
}

/// A snapshot as written to an export file
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    export_date: DateTime<Local>,
}

/// Name of the export file written on `today`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("studydash-{}.json", today.format("%Y-%m-%d"))
}

impl Snapshot {
    /// Parse a snapshot, tolerating partial matches.
    ///
    /// Missing or mistyped fields fall back to their defaults and malformed
    /// topics or history entries are dropped. Only input that is not a JSON
    /// object is an error.
    pub fn from_json(bytes: &[u8]) -> Result<Self, StoreError> {
        let Value::Object(map) = serde_json::from_slice::<Value>(bytes)? else {
            return Err(StoreError::NotAnObject);
        };

        let defaults = Settings::default();
        let history = list::<SessionRecord>(&map, "history")
            .into_iter()
            .filter(|record| {
                let valid = (1..=MAX_RECORD_MINUTES).contains(&record.minutes);
                if !valid {
                    warn!(
                        "Dropping history entry {:?} with {} minutes",
                        record.id, record.minutes
                    );
                }
                valid
            })
            .collect();

        Ok(Self {
            topics: list(&map, "topics"),
            history,
            settings: Settings {
                alarm_duration: field(&map, "alarmDuration").unwrap_or(defaults.alarm_duration),
                infinite_alarm: field(&map, "infiniteAlarm").unwrap_or(defaults.infinite_alarm),
                daily_goal_hours: field(&map, "dailyGoalHours")
                    .unwrap_or(defaults.daily_goal_hours),
                selected_sound_id: field(&map, "selectedSoundId")
                    .unwrap_or(defaults.selected_sound_id),
                theme: field(&map, "theme").unwrap_or(defaults.theme),
                focus_minutes: field(&map, "focusMinutes")
                    .filter(|&m: &u32| validate_session_minutes(m).is_ok())
                    .unwrap_or(defaults.focus_minutes),
                break_minutes: field(&map, "breakMinutes")
                    .filter(|&m: &u32| validate_session_minutes(m).is_ok())
                    .unwrap_or(defaults.break_minutes),
            },
        })
    }

    /// Serialize for the data file
    pub fn to_json(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Serialize for an export file, stamped with `exportDate`
    pub fn export(&self, now: DateTime<Local>) -> Result<Vec<u8>, StoreError> {
        let document = ExportDocument {
            snapshot: self,
            export_date: now,
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    /// Read an export file (or any snapshot-shaped JSON)
    pub fn import(bytes: &[u8]) -> Result<Self, StoreError> {
        Self::from_json(bytes)
    }
}

fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring malformed field `{}`: {}", key, e);
            None
        }
    }
}

fn list<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(value) = map.get(key) else {
        return Vec::new();
    };
    let Value::Array(items) = value else {
        warn!("Ignoring `{}`: expected an array", key);
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Dropping malformed `{}` entry {}: {}", key, i, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionId, Theme, TopicId};
    use crate::timer::SessionEngine;
    use chrono::TimeZone;

    fn sample() -> Snapshot {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        Snapshot {
            topics: vec![
                Topic::new(TopicId(1), "Math", "#60A5FA").with_goal(Some(3.0)),
                Topic::new(TopicId(2), "History", "#F87171"),
            ],
            history: vec![SessionRecord {
                id: SessionId(1704189600000),
                topic_id: TopicId(1),
                minutes: 25,
                date,
            }],
            settings: Settings {
                alarm_duration: 30,
                infinite_alarm: true,
                daily_goal_hours: 2.5,
                selected_sound_id: "alarm".to_string(),
                theme: Theme::Light,
                focus_minutes: 50,
                break_minutes: 10,
            },
        }
    }

    #[test]
    fn test_export_then_import_preserves_snapshot() {
        let snapshot = sample();
        let now = Local.with_ymd_and_hms(2024, 1, 2, 18, 0, 0).unwrap();

        let bytes = snapshot.export(now).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["exportDate"].as_str().unwrap().starts_with("2024-01-02T18:00:00"));

        assert_eq!(Snapshot::import(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_flat_settings_layout() {
        let value: Value = serde_json::from_slice(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["alarmDuration"], 30);
        assert_eq!(value["infiniteAlarm"], true);
        assert_eq!(value["selectedSoundId"], "alarm");
        assert_eq!(value["theme"], "light");
        assert_eq!(value["history"][0]["date"], "2024-01-02");
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot = Snapshot::from_json(b"{}").unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn test_original_layout_is_accepted() {
        let json = br##"{
            "topics": [{"id": 1700000000000, "name": "Chemistry", "color": "#FF0000",
                        "weeklyMinutes": 120, "monthlyMinutes": 300}],
            "history": [{"id": 1700000000001, "topicId": 1700000000000,
                         "minutes": 25, "date": "2023-11-14"}]
        }"##;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.topics.len(), 1);
        assert_eq!(snapshot.topics[0].name, "Chemistry");
        assert_eq!(snapshot.history[0].minutes, 25);
        assert_eq!(snapshot.settings, Settings::default());
    }

    #[test]
    fn test_malformed_fields_fall_back_individually() {
        let json = br#"{
            "topics": "not a list",
            "history": [
                {"id": 1, "topicId": 1, "minutes": 25, "date": "2024-01-02"},
                {"id": 2, "topicId": 1, "minutes": 0, "date": "2024-01-02"},
                {"id": 3, "topicId": 1, "minutes": -5, "date": "2024-01-02"},
                {"id": 4, "topicId": 1, "minutes": 10, "date": "yesterday"}
            ],
            "alarmDuration": "loud",
            "dailyGoalHours": 6,
            "theme": "sepia"
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert!(snapshot.topics.is_empty());
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].id, SessionId(1));
        assert_eq!(snapshot.settings.alarm_duration, Settings::default().alarm_duration);
        assert_eq!(snapshot.settings.daily_goal_hours, 6.0);
        assert_eq!(snapshot.settings.theme, Theme::Dark);
    }

    #[test]
    fn test_out_of_range_session_lengths_fall_back() {
        let json = br#"{"focusMinutes": 100000000, "breakMinutes": 601}"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.settings.focus_minutes, Settings::default().focus_minutes);
        assert_eq!(snapshot.settings.break_minutes, Settings::default().break_minutes);

        let mut engine = SessionEngine::default();
        engine.apply_defaults(snapshot.settings.session_defaults());
        assert_eq!(engine.configured_minutes(), 25);
        assert_eq!(engine.remaining_seconds(), 25 * 60);
    }

    #[test]
    fn test_oversized_history_entries_dropped() {
        let json = br#"{
            "history": [
                {"id": 1, "topicId": 1, "minutes": 3000000000, "date": "2024-01-02"},
                {"id": 2, "topicId": 1, "minutes": 1441, "date": "2024-01-02"},
                {"id": 3, "topicId": 1, "minutes": 1440, "date": "2024-01-02"}
            ]
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].id, SessionId(3));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            Snapshot::import(b"{ not json"),
            Err(StoreError::Parse(_))
        ));
        assert!(matches!(
            Snapshot::import(b"[1, 2, 3]"),
            Err(StoreError::NotAnObject)
        ));
    }

    #[test]
    fn test_export_file_name() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(today), "studydash-2024-03-09.json");
    }
}
