use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::ConversationId;

/// Something changed in the messaging core or the contacts directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    MessageReceived { id: ConversationId },
    MessageSent { id: ConversationId },
    ConversationCreated { id: ConversationId },
    ConversationDeleted { id: ConversationId },
    ConversationRead { id: ConversationId },
    ContactsChanged,
}

pub type Listener = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(uuid::Uuid);

impl ListenerId {
    pub fn new() -> Self {
        ListenerId(uuid::Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Push side of the messaging core. Listeners may be invoked from any thread.
pub trait ChangeNotifier: Send + Sync {
    fn subscribe(&self, id: ListenerId, listener: Listener);
    fn unsubscribe(&self, id: ListenerId);
}

// ---------------------------------------------------------------------------
// Subscription: unsubscribes on drop
// ---------------------------------------------------------------------------

pub struct Subscription {
    notifier: Arc<dyn ChangeNotifier>,
    id: ListenerId,
}

impl Subscription {
    pub fn new(notifier: Arc<dyn ChangeNotifier>, listener: Listener) -> Self {
        let id = ListenerId::new();
        notifier.subscribe(id, listener);
        log::debug!("Subscribed change listener {}", id);
        Subscription { notifier, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.notifier.unsubscribe(self.id);
        log::debug!("Unsubscribed change listener {}", self.id);
    }
}

// ---------------------------------------------------------------------------
// EventQueue: marshals events onto the owning (UI) thread
// ---------------------------------------------------------------------------

/// Cheap, thread-safe handle that posts events into an [`EventQueue`].
#[derive(Clone)]
pub struct EventPoster {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl EventPoster {
    pub fn post(&self, event: ChangeEvent) {
        // Receiver gone means the screen was torn down; nothing left to refresh.
        let _ = self.tx.send(event);
    }

    /// Listener closure suitable for [`ChangeNotifier::subscribe`].
    pub fn listener(&self) -> Listener {
        let poster = self.clone();
        Arc::new(move |event| poster.post(event))
    }
}

pub struct EventQueue {
    tx: mpsc::UnboundedSender<ChangeEvent>,
    rx: mpsc::UnboundedReceiver<ChangeEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        EventQueue { tx, rx }
    }

    pub fn poster(&self) -> EventPoster {
        EventPoster {
            tx: self.tx.clone(),
        }
    }

    /// Next pending event without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event. The queue keeps its own sender, so this only
    /// resolves when something is posted.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Drop everything pending.
    pub fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCore;

    #[test]
    fn subscription_unsubscribes_once_on_drop() {
        let core = Arc::new(FakeCore::default());
        let queue = EventQueue::new();

        let sub = Subscription::new(core.clone(), queue.poster().listener());
        let id = sub.id();
        assert_eq!(core.listener_count(), 1);
        assert_eq!(core.subscribe_calls(), 1);

        drop(sub);
        assert_eq!(core.listener_count(), 0);
        assert_eq!(core.unsubscribed(), vec![id]);
    }

    #[test]
    fn listener_posts_into_queue() {
        let core = Arc::new(FakeCore::default());
        let mut queue = EventQueue::new();
        let _sub = Subscription::new(core.clone(), queue.poster().listener());

        core.emit(ChangeEvent::ContactsChanged);
        core.emit(ChangeEvent::MessageReceived { id: "sip:a@x".into() });

        assert_eq!(queue.try_next(), Some(ChangeEvent::ContactsChanged));
        assert_eq!(
            queue.try_next(),
            Some(ChangeEvent::MessageReceived { id: "sip:a@x".into() })
        );
        assert_eq!(queue.try_next(), None);
    }

    #[test]
    fn clear_drops_pending_events() {
        let mut queue = EventQueue::new();
        let poster = queue.poster();
        poster.post(ChangeEvent::ContactsChanged);
        poster.post(ChangeEvent::ContactsChanged);

        assert_eq!(queue.clear(), 2);
        assert_eq!(queue.try_next(), None);
    }

    #[tokio::test]
    async fn events_posted_from_another_thread_arrive_in_order() {
        let mut queue = EventQueue::new();
        let poster = queue.poster();

        let worker = std::thread::spawn(move || {
            poster.post(ChangeEvent::MessageSent { id: "sip:a@x".into() });
            poster.post(ChangeEvent::ConversationRead { id: "sip:a@x".into() });
        });
        worker.join().unwrap();

        assert_eq!(
            queue.next().await,
            Some(ChangeEvent::MessageSent { id: "sip:a@x".into() })
        );
        assert_eq!(
            queue.next().await,
            Some(ChangeEvent::ConversationRead { id: "sip:a@x".into() })
        );
    }
}
