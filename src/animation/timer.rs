use crate::foundation::core::Millis;

/// A single-slot deadline timer.
///
/// Arming always replaces the pending deadline, so at most one deadline is
/// ever outstanding.
#[derive(Clone, Debug, Default)]
pub struct SingleSlotTimer {
    deadline: Option<Millis>,
}

impl SingleSlotTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending deadline and arm a new one `delay_ms` after `now`.
    pub fn arm(&mut self, now: Millis, delay_ms: u64) {
        self.deadline = Some(now.after(delay_ms));
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    /// Disarm and return `true` if the deadline has been reached at `now`.
    pub fn fire_if_due(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
