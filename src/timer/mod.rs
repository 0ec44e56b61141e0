mod alarm;
mod engine;

pub use alarm::AlarmDuration;
pub use engine::{Completion, Mode, SessionDefaults, SessionEngine, TimerError, TimerState};
