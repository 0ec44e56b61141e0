use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_ALARM_SECONDS, DEFAULT_BREAK_MINUTES, DEFAULT_DAILY_GOAL_HOURS, DEFAULT_FOCUS_MINUTES,
    DEFAULT_SOUND_ID,
};
use crate::timer::{AlarmDuration, SessionDefaults};

/// Color scheme of the terminal UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// User settings persisted alongside topics and history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Alarm length in seconds, ignored when `infinite_alarm` is set
    pub alarm_duration: u32,
    pub infinite_alarm: bool,
    pub daily_goal_hours: f64,
    pub selected_sound_id: String,
    pub theme: Theme,
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alarm_duration: DEFAULT_ALARM_SECONDS,
            infinite_alarm: false,
            daily_goal_hours: DEFAULT_DAILY_GOAL_HOURS,
            selected_sound_id: DEFAULT_SOUND_ID.to_string(),
            theme: Theme::Dark,
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl Settings {
    pub fn alarm(&self) -> AlarmDuration {
        if self.infinite_alarm {
            AlarmDuration::Infinite
        } else {
            AlarmDuration::Seconds(self.alarm_duration)
        }
    }

    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            focus_minutes: self.focus_minutes,
            break_minutes: self.break_minutes,
        }
    }
}
