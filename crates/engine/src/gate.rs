//! Failure-alert deduplication.
//!
//! When the same failure repeats every cycle, only the first occurrence is
//! delivered. A different error text, or a clean cycle, re-arms the gate.

/// Remembers the last failure message that reached the chat.
#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    last_error: String,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` only when `candidate` repeats `previous` exactly.
    pub fn should_send(candidate: &str, previous: &str) -> bool {
        candidate != previous
    }

    /// Whether `candidate` differs from the last delivered failure.
    pub fn allows(&self, candidate: &str) -> bool {
        let allowed = Self::should_send(candidate, &self.last_error);
        if !allowed {
            tracing::debug!("Failure notification suppressed, identical to the previous one");
        }
        allowed
    }

    /// Record a failure message that was delivered.
    pub fn record_delivered(&mut self, message: impl Into<String>) {
        self.last_error = message.into();
    }

    /// Forget the last failure (after a clean cycle).
    pub fn reset(&mut self) {
        self.last_error.clear();
    }

    pub fn last_error(&self) -> Option<&str> {
        (!self.last_error.is_empty()).then_some(self.last_error.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_send() {
        assert!(!NotificationGate::should_send("boom", "boom"));
        assert!(NotificationGate::should_send("boom", ""));
        assert!(NotificationGate::should_send("boom", "bang"));
    }

    #[test]
    fn test_first_failure_allowed() {
        let gate = NotificationGate::new();
        assert!(gate.allows("Сбой в работе программы: timeout"));
        assert_eq!(gate.last_error(), None);
    }

    #[test]
    fn test_repeat_suppressed_until_text_changes() {
        let mut gate = NotificationGate::new();
        gate.record_delivered("a");
        assert!(!gate.allows("a"));
        assert!(gate.allows("b"));
        gate.record_delivered("b");
        assert!(!gate.allows("b"));
        assert!(gate.allows("a"));
    }

    #[test]
    fn test_reset_rearms() {
        let mut gate = NotificationGate::new();
        gate.record_delivered("a");
        gate.reset();
        assert!(gate.allows("a"));
        assert_eq!(gate.last_error(), None);
    }
}
