use directories::{ProjectDirs, UserDirs};
use std::path::PathBuf;
use std::time::Duration;

use crate::store::StoreError;

/// Tick rate for the countdown callback (1s)
pub const TICK_RATE: Duration = Duration::from_secs(1);

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_ALARM_SECONDS: u32 = 10;
pub const DEFAULT_DAILY_GOAL_HOURS: f64 = 4.0;

/// Longest focus or break session in minutes
pub const MAX_SESSION_MINUTES: u32 = 600;

/// Longest plausible single history record
pub const MAX_RECORD_MINUTES: u32 = 24 * 60;

/// Minutes a day needs before it counts towards the streak
pub const STREAK_THRESHOLD_MINUTES: u32 = 60;

/// Number of days shown in the daily chart
pub const DAILY_WINDOW_DAYS: u32 = 30;

/// Number of months shown in the trend chart
pub const TREND_MONTHS: u32 = 6;

/// How far back the streak is counted
pub const STREAK_WINDOW_DAYS: u32 = 365;

/// An alarm sound. The terminal can only ring its bell, so a sound is a
/// number of bell pulses per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sound {
    pub id: &'static str,
    pub label: &'static str,
    pub pulses: u8,
}

pub const SOUNDS: &[Sound] = &[
    Sound {
        id: "bell",
        label: "Bell",
        pulses: 1,
    },
    Sound {
        id: "double",
        label: "Double chime",
        pulses: 2,
    },
    Sound {
        id: "alarm",
        label: "Alarm clock",
        pulses: 3,
    },
];

pub const DEFAULT_SOUND_ID: &str = "bell";

/// Look up a sound by id, falling back to the first catalog entry
pub fn find_sound(id: &str) -> Sound {
    SOUNDS
        .iter()
        .copied()
        .find(|s| s.id == id)
        .unwrap_or(SOUNDS[0])
}

/// Palette offered when creating a topic
pub const TOPIC_COLORS: &[&str] = &[
    "#60A5FA", "#F87171", "#34D399", "#FBBF24", "#A78BFA", "#F472B6", "#2DD4BF", "#A1A1AA",
];

fn project_dirs() -> Result<ProjectDirs, StoreError> {
    ProjectDirs::from("", "", "studydash").ok_or(StoreError::NoDataDirectory)
}

/// Get the path to the snapshot file.
///
/// Returns the path to `studydash.json` in the appropriate data directory:
/// - Linux: `~/.local/share/studydash/studydash.json`
/// - macOS: `~/Library/Application Support/studydash/studydash.json`
/// - Windows: `C:\Users\<User>\AppData\Roaming\studydash\studydash.json`
pub fn get_data_path() -> Result<PathBuf, StoreError> {
    let proj_dirs = project_dirs()?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("studydash.json"))
}

/// Get the path to the log file.
///
/// Returns the path to `studydash.log` in the same data directory as the snapshot.
pub fn get_log_path() -> Result<PathBuf, StoreError> {
    let proj_dirs = project_dirs()?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("studydash.log"))
}

/// Get the directory exports are written to.
///
/// Prefers the user's download directory and falls back to the data directory.
pub fn get_export_dir() -> Result<PathBuf, StoreError> {
    if let Some(dir) = UserDirs::new().and_then(|u| u.download_dir().map(PathBuf::from))
        && dir.is_dir()
    {
        return Ok(dir);
    }

    let proj_dirs = project_dirs()?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;
    Ok(data_dir.to_path_buf())
}
