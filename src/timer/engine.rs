use chrono::{DateTime, Duration, Local};
use log::{debug, info};
use thiserror::Error;

use super::alarm::{Alarm, AlarmDuration};
use crate::config::{DEFAULT_BREAK_MINUTES, DEFAULT_FOCUS_MINUTES, MAX_SESSION_MINUTES};
use crate::models::{SessionCredit, TopicId};

/// The phase the countdown belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Focus,
    Break,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "FOCUS",
            Mode::Break => "BREAK",
        }
    }

    /// The phase that follows this one
    pub fn opposite(&self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }
}

/// Session lengths the engine falls back to when switching phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDefaults {
    pub focus_minutes: u32,
    pub break_minutes: u32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl SessionDefaults {
    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.focus_minutes,
            Mode::Break => self.break_minutes,
        }
    }
}

/// Rejected timer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Select a topic before starting a focus session")]
    MissingTopic,

    #[error("Stop the timer first")]
    Running,

    #[error("The timer is not running")]
    NotRunning,

    #[error("Session length must be at least one minute")]
    InvalidDuration,
}

/// The current state of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running {
        deadline: DateTime<Local>,
    },
    /// The last phase ran out; ticks are ignored until the timer is restarted
    /// or reconfigured.
    Completed,
}

/// Outcome of a phase running out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub finished: Mode,
    /// Time to credit; only focus phases with a topic produce one
    pub credit: Option<SessionCredit>,
}

/// The focus/break countdown state machine.
///
/// Remaining time is always recomputed from an absolute deadline, so missed
/// or late ticks never make the display drift from real elapsed time.
#[derive(Debug)]
pub struct SessionEngine {
    mode: Mode,
    state: TimerState,
    configured_minutes: u32,
    remaining_secs: u32,
    topic: Option<TopicId>,
    defaults: SessionDefaults,
    alarm: Alarm,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new(SessionDefaults::default(), AlarmDuration::default())
    }
}

impl SessionEngine {
    /// Create an idle engine in focus mode
    pub fn new(defaults: SessionDefaults, alarm: AlarmDuration) -> Self {
        let configured_minutes = defaults.focus_minutes;
        Self {
            mode: Mode::Focus,
            state: TimerState::Idle,
            configured_minutes,
            remaining_secs: seconds(configured_minutes),
            topic: None,
            defaults,
            alarm: Alarm::new(alarm),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn configured_minutes(&self) -> u32 {
        self.configured_minutes
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_secs
    }

    pub fn defaults(&self) -> SessionDefaults {
        self.defaults
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, TimerState::Completed)
    }

    pub fn deadline(&self) -> Option<DateTime<Local>> {
        match self.state {
            TimerState::Running { deadline } => Some(deadline),
            _ => None,
        }
    }

    /// The topic credited by the current phase, only set in focus mode
    pub fn active_topic(&self) -> Option<TopicId> {
        match self.mode {
            Mode::Focus => self.topic,
            Mode::Break => None,
        }
    }

    /// The selected topic regardless of phase
    pub fn selected_topic(&self) -> Option<TopicId> {
        self.topic
    }

    /// Get the progress as a ratio (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let total = f64::from(seconds(self.configured_minutes));
        if total == 0.0 {
            return 1.0;
        }
        let elapsed = total - f64::from(self.remaining_secs);
        (elapsed / total).clamp(0.0, 1.0)
    }

    /// Set the phase and its length. Only allowed while stopped.
    pub fn configure(&mut self, mode: Mode, minutes: u32) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        if minutes == 0 || minutes > MAX_SESSION_MINUTES {
            return Err(TimerError::InvalidDuration);
        }

        self.mode = mode;
        self.configured_minutes = minutes;
        self.remaining_secs = seconds(minutes);
        self.state = TimerState::Idle;
        Ok(())
    }

    /// Choose the topic focus sessions are credited to. Only allowed while stopped.
    pub fn select_topic(&mut self, topic: Option<TopicId>) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        self.topic = topic;
        Ok(())
    }

    /// Replace the per-phase defaults; the current phase picks them up when stopped
    pub fn apply_defaults(&mut self, defaults: SessionDefaults) {
        self.defaults = defaults;
        if !self.is_running() {
            let minutes = defaults.minutes_for(self.mode);
            // Out-of-range defaults leave the current length alone
            if (1..=MAX_SESSION_MINUTES).contains(&minutes) {
                self.configured_minutes = minutes;
                self.remaining_secs = seconds(minutes);
            }
        }
    }

    pub fn set_alarm_duration(&mut self, duration: AlarmDuration) {
        self.alarm.set_duration(duration);
    }

    /// Start or resume the countdown
    pub fn start(&mut self, now: DateTime<Local>) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        if self.mode == Mode::Focus && self.topic.is_none() {
            return Err(TimerError::MissingTopic);
        }
        if self.remaining_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }

        let deadline = now + Duration::seconds(i64::from(self.remaining_secs));
        self.state = TimerState::Running { deadline };
        debug!(
            "{} started, {}s remaining",
            self.mode.label(),
            self.remaining_secs
        );
        Ok(())
    }

    /// Recompute the remaining time; completes the phase when it reaches zero.
    ///
    /// Returns the completion exactly once. Ticks while stopped are no-ops.
    pub fn tick(&mut self, now: DateTime<Local>) -> Option<Completion> {
        let TimerState::Running { deadline } = self.state else {
            return None;
        };

        self.remaining_secs = self.seconds_until(deadline, now);
        if self.remaining_secs == 0 {
            return Some(self.finish(now));
        }
        None
    }

    /// Complete the running phase right away (external timeout)
    pub fn complete(&mut self, now: DateTime<Local>) -> Option<Completion> {
        if !self.is_running() {
            return None;
        }
        self.remaining_secs = 0;
        Some(self.finish(now))
    }

    /// Stop the countdown and credit the whole minutes elapsed so far.
    ///
    /// Credited minutes are `configured - ceil(remaining / 60)`, so elapsed
    /// seconds round down and a pause inside the first minute credits
    /// nothing. The banked `ceil(remaining / 60)` becomes the new, shorter
    /// session length.
    /// Pausing after the deadline has passed completes the phase instead.
    pub fn pause(&mut self, now: DateTime<Local>) -> Result<Option<SessionCredit>, TimerError> {
        let TimerState::Running { deadline } = self.state else {
            return Err(TimerError::NotRunning);
        };

        self.remaining_secs = self.seconds_until(deadline, now);
        if self.remaining_secs == 0 {
            return Ok(self.finish(now).credit);
        }

        // Whole minutes still left, a started minute counts as left
        let banked = self.remaining_secs.div_ceil(60);
        let elapsed = self.configured_minutes.saturating_sub(banked);
        let credit = self.credit(elapsed, now);

        self.configured_minutes = banked;
        self.state = TimerState::Idle;
        debug!(
            "{} paused, {}s remaining, {} min credited",
            self.mode.label(),
            self.remaining_secs,
            elapsed
        );
        Ok(credit)
    }

    /// Rewind the countdown to the configured length. Only allowed while stopped.
    pub fn reset(&mut self) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        self.remaining_secs = seconds(self.configured_minutes);
        self.state = TimerState::Idle;
        Ok(())
    }

    pub fn alarm_playing(&self) -> bool {
        self.alarm.is_playing()
    }

    pub fn alarm_duration(&self) -> AlarmDuration {
        self.alarm.duration()
    }

    pub fn stop_alarm(&mut self) {
        self.alarm.stop();
    }

    /// Silence the alarm once its configured duration has elapsed
    pub fn poll_alarm(&mut self, now: DateTime<Local>) -> bool {
        self.alarm.poll(now)
    }

    fn seconds_until(&self, deadline: DateTime<Local>, now: DateTime<Local>) -> u32 {
        let millis = (deadline - now).num_milliseconds();
        let secs = (millis as f64 / 1000.0).round().max(0.0) as u32;
        secs.min(seconds(self.configured_minutes))
    }

    fn credit(&self, minutes: u32, now: DateTime<Local>) -> Option<SessionCredit> {
        match (self.mode, self.topic) {
            (Mode::Focus, Some(topic_id)) if minutes > 0 => Some(SessionCredit {
                topic_id,
                minutes,
                date: now.date_naive(),
            }),
            _ => None,
        }
    }

    fn finish(&mut self, now: DateTime<Local>) -> Completion {
        let finished = self.mode;
        let credit = self.credit(self.configured_minutes, now);

        self.alarm.ring(now);
        self.mode = finished.opposite();
        self.configured_minutes = self.defaults.minutes_for(self.mode);
        self.remaining_secs = seconds(self.configured_minutes);
        self.state = TimerState::Completed;

        info!(
            "{} phase completed, switching to {}",
            finished.label(),
            self.mode.label()
        );
        Completion { finished, credit }
    }
}

fn seconds(minutes: u32) -> u32 {
    minutes.saturating_mul(60)
}
