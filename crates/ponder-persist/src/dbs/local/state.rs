use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeSet, HashMap};

use super::models::{Snapshot, SCHEMA_VERSION};
use crate::error::{PersistError, Result};
use crate::models::{Message, MessageId, NewMessage, Thread, ThreadId};

/// Hands out strictly increasing timestamps, even within one clock tick
#[derive(Debug, Clone, Default)]
pub(crate) struct MonotonicClock {
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub(crate) fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last = Some(next);
        next
    }

    fn observe(&mut self, instant: DateTime<Utc>) {
        if self.last.map_or(true, |last| instant > last) {
            self.last = Some(instant);
        }
    }
}

/// In-memory dataset with its indexes
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    threads: HashMap<ThreadId, Thread>,
    /// (updated_at, id) ascending; iterate in reverse for recency
    recency: BTreeSet<(DateTime<Utc>, ThreadId)>,
    /// Messages per thread in `created_at` order
    messages: HashMap<ThreadId, Vec<Message>>,
    clock: MonotonicClock,
}

impl StoreState {
    pub(crate) fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        snapshot.check_version()?;
        let mut state = Self::default();

        for thread in snapshot.threads {
            state.clock.observe(thread.updated_at);
            state.recency.insert((thread.updated_at, thread.id.clone()));
            state.threads.insert(thread.id.clone(), thread);
        }

        for message in snapshot.messages {
            if !state.threads.contains_key(&message.thread_id) {
                tracing::warn!(
                    message_id = %message.id,
                    thread_id = %message.thread_id,
                    "Dropping stored message that references a missing thread"
                );
                continue;
            }
            state.clock.observe(message.created_at);
            state
                .messages
                .entry(message.thread_id.clone())
                .or_default()
                .push(message);
        }

        for messages in state.messages.values_mut() {
            messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }

        Ok(state)
    }

    pub(crate) fn to_snapshot(&self) -> Snapshot {
        let mut threads: Vec<Thread> = self.threads.values().cloned().collect();
        threads.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut messages: Vec<Message> = self.messages.values().flatten().cloned().collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Snapshot {
            schema_version: SCHEMA_VERSION,
            threads,
            messages,
        }
    }

    pub(crate) fn insert_thread(&mut self, title: &str) -> ThreadId {
        let now = self.clock.tick();
        let thread = Thread {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = thread.id.clone();

        self.recency.insert((now, id.clone()));
        self.threads.insert(id.clone(), thread);
        id
    }

    /// Insert the message and touch its thread. Both or neither.
    pub(crate) fn insert_message(&mut self, new: NewMessage) -> Result<MessageId> {
        let thread = self
            .threads
            .get_mut(&new.thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(new.thread_id.clone()))?;

        let now = self.clock.tick();
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: new.thread_id,
            role: new.role,
            content: new.content,
            thought: new.thought,
            created_at: now,
        };
        let id = message.id.clone();

        self.recency.remove(&(thread.updated_at, thread.id.clone()));
        thread.updated_at = now;
        self.recency.insert((now, thread.id.clone()));

        self.messages
            .entry(message.thread_id.clone())
            .or_default()
            .push(message);
        Ok(id)
    }

    pub(crate) fn thread(&self, thread_id: &str) -> Option<Thread> {
        self.threads.get(thread_id).cloned()
    }

    pub(crate) fn threads_by_recency(&self) -> Vec<Thread> {
        self.recency
            .iter()
            .rev()
            .filter_map(|(_, id)| self.threads.get(id).cloned())
            .collect()
    }

    pub(crate) fn messages_of(&self, thread_id: &str) -> Vec<Message> {
        self.messages.get(thread_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    #[test]
    fn test_clock_is_strictly_increasing() {
        let mut clock = MonotonicClock::default();
        let mut previous = clock.tick();
        for _ in 0..1000 {
            let next = clock.tick();
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_clock_never_goes_behind_observed() {
        let mut clock = MonotonicClock::default();
        let future = Utc::now() + Duration::hours(1);
        clock.observe(future);
        assert!(clock.tick() > future);
    }

    #[test]
    fn test_message_moves_thread_to_front() {
        let mut state = StoreState::default();
        let first = state.insert_thread("first");
        let second = state.insert_thread("second");
        assert_eq!(state.threads_by_recency()[0].id, second);

        state.insert_message(NewMessage::user(first.clone(), "Hi")).unwrap();

        let threads = state.threads_by_recency();
        assert_eq!(threads[0].id, first);
        assert!(threads[0].updated_at > threads[0].created_at);
        assert_eq!(state.recency.len(), 2);
    }

    #[test]
    fn test_unknown_thread_leaves_state_untouched() {
        let mut state = StoreState::default();
        let err = state.insert_message(NewMessage::user("missing", "Hi")).unwrap_err();

        assert!(err.is_validation());
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_snapshot_roundtrip_restores_indexes() {
        let mut state = StoreState::default();
        let id = state.insert_thread("Test");
        state.insert_message(NewMessage::user(id.clone(), "Hi")).unwrap();
        state
            .insert_message(NewMessage::assistant(id.clone(), "Hello!", "because"))
            .unwrap();

        let restored = StoreState::from_snapshot(state.to_snapshot()).unwrap();

        assert_eq!(restored.threads_by_recency(), state.threads_by_recency());
        let messages = restored.messages_of(&id);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].thought, "because");
    }

    #[test]
    fn test_orphan_messages_are_dropped_on_load() {
        let mut snapshot = Snapshot::empty();
        snapshot.messages.push(Message {
            id: "m1".to_string(),
            thread_id: "gone".to_string(),
            role: MessageRole::User,
            content: "Hi".to_string(),
            thought: String::new(),
            created_at: Utc::now(),
        });

        let state = StoreState::from_snapshot(snapshot).unwrap();
        assert!(state.messages_of("gone").is_empty());
    }
}
