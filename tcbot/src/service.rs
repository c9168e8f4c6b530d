//! The bot service: polls the transport, feeds the worker and delivers its replies.

use std::future::Future;

use futures::StreamExt;
use tcbot_core::{Incoming, Session};
use tokio::{sync::mpsc, task::JoinError};
use tracing::{debug, error, info, warn};

use crate::{
    backoff::ExponentialBackoff,
    transport::{Transport, TransportError},
    worker::{Reply, Worker},
};

/// Number of messages that may wait for the worker before polling stalls.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("giving up after {attempts} consecutive failures, last error: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: TransportError,
    },
    #[error("worker stopped unexpectedly")]
    WorkerGone,
    #[error("task failed: {0}")]
    Task(#[from] JoinError),
}

/// Runs the service until `shutdown` resolves or the transport fails more often in a row than
/// `backoff` allows.
///
/// The session is kept across reconnections and returned on shutdown.
pub async fn run<T, F>(
    transport: T,
    session: Session,
    backoff: ExponentialBackoff,
    shutdown: F,
) -> Result<Session, ServiceError>
where
    T: Transport,
    F: Future<Output = ()>,
{
    let (replies_tx, replies_rx) = mpsc::unbounded_channel();
    let worker = Worker::spawn(session, DEFAULT_QUEUE_CAPACITY, replies_tx);
    let sender = tokio::spawn(deliver(transport.clone(), replies_rx));

    let outcome = tokio::select! {
        result = poll(transport, worker.sender(), backoff) => result,
        _ = shutdown => {
            info!("shutdown requested");
            Ok(())
        }
    };

    // Queued messages are still handled, and their replies delivered, before returning.
    let session = worker.shutdown().await?;
    sender.await?;

    outcome.map(|_| session)
}

/// Sends replies in the order they were produced. Failures are logged and the reply dropped.
async fn deliver<T: Transport>(transport: T, mut replies: mpsc::UnboundedReceiver<Reply>) {
    while let Some((conversation, text)) = replies.recv().await {
        if let Err(e) = transport.send(conversation, &text).await {
            error!(conversation, error = %e, "failed to send reply");
        }
    }

    debug!("reply channel closed, sender exiting");
}

/// Connects and polls the transport, reconnecting with backoff on failure. Only a successful
/// receive resets the backoff.
async fn poll<T: Transport>(
    transport: T,
    to_worker: mpsc::Sender<Incoming>,
    mut backoff: ExponentialBackoff,
) -> Result<(), ServiceError> {
    loop {
        match transport.connect().await {
            Ok(name) => info!(%name, "connected"),
            Err(e) => {
                wait(&mut backoff, e).await?;
                continue;
            }
        }

        loop {
            match transport.receive().await {
                Ok(messages) => {
                    backoff.reset();
                    for message in messages {
                        debug!(
                            sender = %message.sender,
                            conversation = message.conversation,
                            "queueing message"
                        );
                        to_worker.send(message).await.map_err(|_| ServiceError::WorkerGone)?;
                    }
                }
                Err(e) => {
                    wait(&mut backoff, e).await?;
                    break;
                }
            }
        }
    }
}

async fn wait(backoff: &mut ExponentialBackoff, error: TransportError) -> Result<(), ServiceError> {
    let attempts = backoff.retry_count() + 1;
    warn!(%error, attempts, "transport failure, backing off");

    match backoff.next().await {
        Some(delay) => {
            debug!(?delay, "retrying");
            Ok(())
        }
        None => Err(ServiceError::RetriesExhausted { attempts, source: error }),
    }
}
