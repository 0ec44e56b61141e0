use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};

/// Application events
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// The countdown callback fired
    Tick,
}

/// Polls terminal input and emits a tick every `tick_rate`, even while keys
/// keep arriving.
pub struct EventSource {
    tick_rate: Duration,
    last_tick: Instant,
}

impl EventSource {
    pub fn new(tick_rate: Duration) -> Self {
        Self {
            tick_rate,
            last_tick: Instant::now(),
        }
    }

    /// Wait for the next event.
    ///
    /// Returns `Some(AppEvent)` if an event occurred, or `None` if no relevant event.
    pub fn next(&mut self) -> color_eyre::Result<Option<AppEvent>> {
        let elapsed = self.last_tick.elapsed();
        if elapsed >= self.tick_rate {
            self.last_tick = Instant::now();
            return Ok(Some(AppEvent::Tick));
        }

        if event::poll(self.tick_rate - elapsed)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(Some(AppEvent::Key(key)));
                }
                _ => return Ok(None),
            }
        }
        Ok(None)
    }
}
