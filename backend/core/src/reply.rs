//! Reply router: "wait for the next text from this user in this chat".
//!
//! A flow calls [`ReplyRouter::listen`] and awaits the returned
//! [`PendingReply`]; the transport calls [`ReplyRouter::deliver`] for every
//! inbound text message. The router knows nothing about any chat SDK.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Who a pending reply is expected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyKey {
    pub chat_id: i64,
    pub user_id: u64,
}

impl ReplyKey {
    pub fn new(chat_id: i64, user_id: u64) -> Self {
        Self { chat_id, user_id }
    }
}

struct Slot {
    ticket: u64,
    tx: oneshot::Sender<String>,
    cancel: CancellationToken,
}

type SlotMap = HashMap<ReplyKey, Slot>;

#[derive(Clone, Default)]
pub struct ReplyRouter {
    next_ticket: Arc<AtomicU64>,
    pending: Arc<Mutex<SlotMap>>,
}

impl ReplyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, SlotMap> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register interest in the next message for `key`.
    ///
    /// A listener already waiting on the same key is cancelled.
    pub fn listen(&self, key: ReplyKey) -> PendingReply {
        let (tx, rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);

        let previous = self.slots().insert(
            key,
            Slot {
                ticket,
                tx,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(chat_id = key.chat_id, user_id = key.user_id, "Replacing pending reply listener");
            previous.cancel.cancel();
        }

        PendingReply {
            key,
            ticket,
            rx,
            cancel,
            router: self.clone(),
        }
    }

    /// Hand an inbound text to the listener for `key`, if any.
    /// Returns `true` when the text was consumed.
    pub fn deliver(&self, key: ReplyKey, text: impl Into<String>) -> bool {
        let Some(slot) = self.slots().remove(&key) else {
            return false;
        };
        slot.tx.send(text.into()).is_ok()
    }

    pub fn is_pending(&self, key: ReplyKey) -> bool {
        self.slots().contains_key(&key)
    }

    /// Convenience: listen and wait in one call.
    pub async fn wait_for(&self, key: ReplyKey, timeout: Duration) -> ReplyOutcome {
        self.listen(key).wait(timeout).await
    }

    fn release(&self, key: ReplyKey, ticket: u64) {
        let mut slots = self.slots();
        if slots.get(&key).map(|s| s.ticket) == Some(ticket) {
            slots.remove(&key);
        }
    }
}

/// How a reply wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Text(String),
    TimedOut,
    /// Another listener took over the key, or the wait was cancelled.
    Cancelled,
}

impl ReplyOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A registered, not yet resolved reply.
pub struct PendingReply {
    key: ReplyKey,
    ticket: u64,
    rx: oneshot::Receiver<String>,
    cancel: CancellationToken,
    router: ReplyRouter,
}

impl PendingReply {
    /// Token that aborts the wait when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolve with the delivered text, or report why none arrived.
    pub async fn wait(mut self, timeout: Duration) -> ReplyOutcome {
        let ended = tokio::select! {
            text = &mut self.rx => match text {
                Ok(text) => return ReplyOutcome::Text(text),
                Err(_) => ReplyOutcome::Cancelled,
            },
            _ = self.cancel.cancelled() => ReplyOutcome::Cancelled,
            _ = tokio::time::sleep(timeout) => ReplyOutcome::TimedOut,
        };

        self.router.release(self.key, self.ticket);
        // A delivery can land between the wait ending and the release.
        match self.rx.try_recv() {
            Ok(text) => ReplyOutcome::Text(text),
            Err(_) => ended,
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.router.release(self.key, self.ticket);
    }
}
