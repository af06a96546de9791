//! Keystroke debouncing for suggestion requests.
//!
//! Time is passed in explicitly, so the behavior is a pure function of the
//! call sequence: a newer input supersedes a pending one, and input is
//! released only after `interval` has passed since it was submitted.

use std::time::{Duration, Instant};

use crate::config::SuggestionConfig;

/// Identifies one submitted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    generation: u64,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            pending: None,
        }
    }

    pub fn from_config(config: &SuggestionConfig) -> Self {
        Self::new(Duration::from_millis(config.debounce_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Submit new input, discarding anything still pending.
    pub fn submit(&mut self, input: impl Into<String>, now: Instant) -> Ticket {
        self.generation += 1;
        self.pending = Some((input.into(), now));
        Ticket(self.generation)
    }

    /// Release the pending input once its interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<(Ticket, String)> {
        let (_, submitted_at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*submitted_at) < self.interval {
            return None;
        }
        self.pending
            .take()
            .map(|(input, _)| (Ticket(self.generation), input))
    }

    /// Whether `ticket` belongs to the newest submission.
    ///
    /// Results computed for an older ticket should be dropped.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop pending input and invalidate outstanding tickets.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(150);

    #[test]
    fn test_poll_before_interval_is_empty() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(INTERVAL);
        debouncer.submit("ne", start);

        assert!(debouncer.poll(start + Duration::from_millis(100)).is_none());
        assert!(debouncer.is_pending());
    }

    #[test]
    fn test_poll_after_interval_releases_input() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(INTERVAL);
        let ticket = debouncer.submit("nev", start);

        let (released, input) = debouncer.poll(start + INTERVAL).unwrap();
        assert_eq!(released, ticket);
        assert_eq!(input, "nev");
        assert!(!debouncer.is_pending());
        assert!(debouncer.poll(start + INTERVAL * 2).is_none());
    }

    #[test]
    fn test_newer_input_supersedes_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(INTERVAL);
        let first = debouncer.submit("ne", start);
        let second = debouncer.submit("nev", start + Duration::from_millis(100));

        assert!(!debouncer.is_current(first));
        assert!(debouncer.is_current(second));

        // The interval restarts with the newer input
        assert!(debouncer.poll(start + Duration::from_millis(200)).is_none());
        let (_, input) = debouncer.poll(start + Duration::from_millis(250)).unwrap();
        assert_eq!(input, "nev");
    }

    #[test]
    fn test_cancel_invalidates_ticket() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(INTERVAL);
        let ticket = debouncer.submit("hotel", start);

        debouncer.cancel();
        assert!(!debouncer.is_current(ticket));
        assert!(debouncer.poll(start + INTERVAL).is_none());
    }

    #[test]
    fn test_from_config() {
        let debouncer = Debouncer::from_config(&SuggestionConfig::default());
        assert_eq!(debouncer.interval(), INTERVAL);
    }
}
