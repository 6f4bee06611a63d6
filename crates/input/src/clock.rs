use std::cell::Cell;
use std::time::Instant;

/// Monotonic time source with microsecond resolution.
pub trait Clock {
    fn now_micros(&self) -> u64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}

/// Clock that only moves when told to. Used to drive the controller deterministically.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_micros: u64) -> Self {
        Self {
            now: Cell::new(start_micros),
        }
    }

    pub fn advance(&self, micros: u64) {
        self.now.set(self.now.get().saturating_add(micros));
    }

    pub fn set(&self, micros: u64) {
        self.now.set(micros);
    }
}

impl Clock for ManualClock {
    fn now_micros(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_micros();
        let b = clock.now_micros();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(10);
        clock.advance(16_000);
        assert_eq!(clock.now_micros(), 16_010);
        clock.set(5);
        assert_eq!(clock.now_micros(), 5);
    }
}
