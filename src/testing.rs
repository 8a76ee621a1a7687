//! In-process stand-in for the messaging core, used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::directory::{ConversationDirectory, DeletionService};
use crate::models::{ConversationId, ConversationSummary, LastMessagePreview};
use crate::notify::{ChangeEvent, ChangeNotifier, Listener, ListenerId};

#[derive(Default)]
struct Inner {
    conversations: Vec<ConversationSummary>,
    /// Ids listed by the directory that no longer resolve.
    stale: Vec<ConversationId>,
    failing: HashSet<ConversationId>,
    delete_calls: Vec<ConversationId>,
    list_calls: usize,
    listeners: HashMap<ListenerId, Listener>,
    subscribe_calls: usize,
    unsubscribed: Vec<ListenerId>,
}

#[derive(Default)]
pub(crate) struct FakeCore {
    inner: Mutex<Inner>,
}

pub(crate) fn summary(id: &str, unread: u32) -> ConversationSummary {
    ConversationSummary {
        id: id.into(),
        display_name: String::new(),
        last_message_preview: LastMessagePreview::Text(format!("hello from {id}")),
        last_message_timestamp: 1_700_000_000,
        unread_count: unread,
        participant_count: 1,
    }
}

impl FakeCore {
    pub(crate) fn with_ids(ids: &[&str]) -> Self {
        let core = FakeCore::default();
        for id in ids {
            core.push(summary(id, 0));
        }
        core
    }

    pub(crate) fn push(&self, summary: ConversationSummary) {
        self.inner.lock().unwrap().conversations.push(summary);
    }

    pub(crate) fn add_stale(&self, id: &str) {
        self.inner.lock().unwrap().stale.push(id.into());
    }

    pub(crate) fn fail_on(&self, id: &str) {
        self.inner.lock().unwrap().failing.insert(id.into());
    }

    pub(crate) fn delete_calls(&self) -> Vec<ConversationId> {
        self.inner.lock().unwrap().delete_calls.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.inner.lock().unwrap().list_calls
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }

    pub(crate) fn subscribe_calls(&self) -> usize {
        self.inner.lock().unwrap().subscribe_calls
    }

    pub(crate) fn unsubscribed(&self) -> Vec<ListenerId> {
        self.inner.lock().unwrap().unsubscribed.clone()
    }

    /// Invoke every registered listener, as the core would from its own thread.
    pub(crate) fn emit(&self, event: ChangeEvent) {
        let listeners: Vec<Listener> = self.inner.lock().unwrap().listeners.values().cloned().collect();
        for listener in listeners {
            listener(event.clone());
        }
    }
}

impl ConversationDirectory for FakeCore {
    fn list_conversation_ids(&self) -> Vec<ConversationId> {
        let mut inner = self.inner.lock().unwrap();
        inner.list_calls += 1;
        let mut ids: Vec<ConversationId> = inner.conversations.iter().map(|c| c.id.clone()).collect();
        ids.extend(inner.stale.iter().cloned());
        ids
    }

    fn resolve_summary(&self, id: &ConversationId) -> Option<ConversationSummary> {
        let inner = self.inner.lock().unwrap();
        inner.conversations.iter().find(|c| &c.id == id).cloned()
    }
}

impl DeletionService for FakeCore {
    fn delete_conversation(&self, id: &ConversationId) -> Result<(), String> {
        let mut inner = self.inner.lock().unwrap();
        inner.delete_calls.push(id.clone());
        if inner.failing.contains(id) {
            return Err(format!("chat room {id} is busy"));
        }
        inner.conversations.retain(|c| &c.id != id);
        Ok(())
    }
}

impl ChangeNotifier for FakeCore {
    fn subscribe(&self, id: ListenerId, listener: Listener) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribe_calls += 1;
        inner.listeners.insert(id, listener);
    }

    fn unsubscribe(&self, id: ListenerId) {
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.remove(&id);
        inner.unsubscribed.push(id);
    }
}
