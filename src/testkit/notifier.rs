//! Event collector for notification assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::SequenceEnd;
use crate::port::{Event, Notifier};

/// Thread-safe event recorder. Clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Terminal transitions seen so far, in order.
    #[must_use]
    pub fn finished(&self) -> Vec<SequenceEnd> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::SequenceFinished { end, .. } => Some(*end),
                _ => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: Event) {
        self.events.lock().push(event);
    }
}
