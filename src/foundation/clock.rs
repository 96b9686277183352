use std::{cell::Cell, rc::Rc, time::Instant};

use crate::foundation::core::Millis;

/// Source of session time.
///
/// Components never sleep; they read the clock (or take `now` explicitly) and
/// are driven by the embedding event loop.
pub trait Clock {
    fn now(&self) -> Millis;
}

/// Monotonic wall clock, zero at construction.
#[derive(Clone, Debug)]
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
    fn now(&self) -> Millis {
        let ms = self.origin.elapsed().as_millis();
        Millis(u64::try_from(ms).unwrap_or(u64::MAX))
    }
}

/// Hand-driven clock. Clones share the same time cell.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Rc::new(Cell::new(start.0)),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now.0);
    }

    pub fn advance(&self, ms: u64) -> Millis {
        let next = self.now.get().saturating_add(ms);
        self.now.set(next);
        Millis(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Millis {
        Millis(self.now.get())
    }
}
