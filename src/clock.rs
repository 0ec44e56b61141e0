use chrono::{DateTime, Local, NaiveDate};

/// Trait for abstracting time operations, enabling testability
pub trait Clock {
    /// Get the current local datetime
    fn now(&self) -> DateTime<Local>;

    /// Get the current local calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// System clock implementation using real time
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to a settable instant
#[cfg(test)]
#[derive(Clone)]
pub struct FixedClock(pub std::rc::Rc<std::cell::Cell<DateTime<Local>>>);

#[cfg(test)]
impl FixedClock {
    pub fn at(now: DateTime<Local>) -> Self {
        Self(std::rc::Rc::new(std::cell::Cell::new(now)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.0.set(self.0.get() + by);
    }
}

#[cfg(test)]
impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0.get()
    }
}
