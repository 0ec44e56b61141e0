use chrono::{DateTime, Local};

/// How long the alarm plays after a phase completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmDuration {
    Seconds(u32),
    /// Play until explicitly stopped
    Infinite,
}

impl Default for AlarmDuration {
    fn default() -> Self {
        AlarmDuration::Seconds(crate::config::DEFAULT_ALARM_SECONDS)
    }
}

/// The "alarm playing" indicator, independent of whether the timer runs.
///
/// Tone generation is left to the caller; this only tracks whether the alarm
/// should currently be audible.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alarm {
    duration: AlarmDuration,
    started: Option<DateTime<Local>>,
}

impl Alarm {
    pub fn new(duration: AlarmDuration) -> Self {
        Self {
            duration,
            started: None,
        }
    }

    pub fn duration(&self) -> AlarmDuration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: AlarmDuration) {
        self.duration = duration;
    }

    pub fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    /// Start playing (restarts the duration if already playing)
    pub fn ring(&mut self, now: DateTime<Local>) {
        self.started = Some(now);
    }

    pub fn stop(&mut self) {
        self.started = None;
    }

    /// Stop the alarm once its duration has elapsed.
    ///
    /// Returns `true` only on the call that stopped it.
    pub fn poll(&mut self, now: DateTime<Local>) -> bool {
        let (Some(started), AlarmDuration::Seconds(secs)) = (self.started, self.duration) else {
            return false;
        };

        if (now - started).num_seconds() >= i64::from(secs) {
            self.started = None;
            return true;
        }
        false
    }
}
