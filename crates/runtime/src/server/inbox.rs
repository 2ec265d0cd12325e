use std::collections::VecDeque;

use game_core::Event;

/// Per-client queue of submitted events, oldest first.
///
/// Actions and non-action events share one queue but are drained by
/// different rules: non-action events stay queued until they execute, while
/// actions are taken out for a single attempt.
#[derive(Clone, Debug, Default)]
pub struct ClientInbox {
    events: VecDeque<Event>,
}

impl ClientInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Removes and returns the oldest queued action, skipping over any
    /// non-action events queued in front of it.
    pub fn take_oldest_action(&mut self) -> Option<Event> {
        let index = self.events.iter().position(Event::is_action)?;
        self.events.remove(index)
    }

    /// Offers every queued non-action event to `keep`, in order, and drops
    /// those it returns false for. Actions are left in place.
    pub fn retain_non_actions(&mut self, mut keep: impl FnMut(&Event) -> bool) {
        self.events.retain(|event| event.is_action() || keep(event));
    }
}
