use tcbot_core::{ConversationId, Incoming, Outbox, Session};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

/// A reply waiting to be sent.
pub type Reply = (ConversationId, String);

/// Forwards replies to the sender task.
#[derive(Debug, Clone)]
pub struct ChannelOutbox {
    tx: mpsc::UnboundedSender<Reply>,
}

impl ChannelOutbox {
    pub fn new(tx: mpsc::UnboundedSender<Reply>) -> Self {
        Self { tx }
    }
}

impl Outbox for ChannelOutbox {
    fn send(&mut self, conversation: ConversationId, text: String) {
        if self.tx.send((conversation, text)).is_err() {
            warn!(conversation, "reply channel closed, dropping reply");
        }
    }
}

/// Handle to the worker that owns the [`Session`].
///
/// Command handlers block on `tc` and the interface table, so the session lives on the blocking
/// pool. Messages are handled strictly one at a time, in arrival order.
#[derive(Debug)]
pub struct Worker {
    to_worker: mpsc::Sender<Incoming>,
    handle: JoinHandle<Session>,
}

impl Worker {
    /// Spawns the worker. Replies are pushed to `replies`.
    pub fn spawn(
        mut session: Session,
        capacity: usize,
        replies: mpsc::UnboundedSender<Reply>,
    ) -> Self {
        let (to_worker, mut from_poller) = mpsc::channel::<Incoming>(capacity);

        let handle = tokio::task::spawn_blocking(move || {
            let mut outbox = ChannelOutbox::new(replies);
            while let Some(message) = from_poller.blocking_recv() {
                session.handle(&message, &mut outbox);
            }

            debug!("message channel closed, worker exiting");
            session
        });

        Self { to_worker, handle }
    }

    /// Returns a sender for queueing messages.
    pub fn sender(&self) -> mpsc::Sender<Incoming> {
        self.to_worker.clone()
    }

    /// Stops accepting messages and waits for the queued ones to be handled.
    pub async fn shutdown(self) -> Result<Session, tokio::task::JoinError> {
        drop(self.to_worker);
        self.handle.await
    }
}
