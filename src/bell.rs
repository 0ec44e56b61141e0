use std::io::{self, Write};

use log::warn;

/// Somewhere to ring the alarm
pub trait Bell {
    /// Ring `pulses` times
    fn ring(&mut self, pulses: u8);
}

/// Rings the terminal bell by writing BEL to stdout
#[derive(Clone, Copy, Default)]
pub struct TerminalBell;

impl Bell for TerminalBell {
    fn ring(&mut self, pulses: u8) {
        let bells = vec![0x07; usize::from(pulses)];
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(&bells).and_then(|()| out.flush()) {
            warn!("Could not ring the terminal bell: {}", e);
        }
    }
}

/// Counts pulses instead of making noise
#[cfg(test)]
#[derive(Clone, Default)]
pub struct RecordingBell(pub std::rc::Rc<std::cell::Cell<u32>>);

#[cfg(test)]
impl RecordingBell {
    pub fn pulses(&self) -> u32 {
        self.0.get()
    }
}

#[cfg(test)]
impl Bell for RecordingBell {
    fn ring(&mut self, pulses: u8) {
        self.0.set(self.0.get() + u32::from(pulses));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_bell_shares_count() {
        let bell = RecordingBell::default();
        let mut handle = bell.clone();
        handle.ring(2);
        handle.ring(1);
        assert_eq!(bell.pulses(), 3);
    }
}
