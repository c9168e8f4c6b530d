use futures::{FutureExt, Stream};
use std::{pin::Pin, task::Poll, time::Duration};
use tokio::time::sleep;

/// A stream that sleeps for exponentially increasing durations, yielding each duration once
/// it has elapsed.
#[derive(Debug)]
pub struct ExponentialBackoff {
    /// Current number of retries.
    retry_count: usize,
    /// Maximum number of retries before closing the stream. `0` retries forever.
    max_retries: usize,
    /// The first backoff duration, restored by [`ExponentialBackoff::reset`].
    initial: Duration,
    /// Upper bound for a single backoff duration.
    max_backoff: Duration,
    /// The current backoff duration.
    backoff: Duration,
    /// The current backoff timeout, if any.
    /// We need the timeout to be pinned (`Sleep` is not `Unpin`)
    timeout: Option<Pin<Box<tokio::time::Sleep>>>,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max_backoff: Duration, max_retries: usize) -> Self {
        Self {
            retry_count: 0,
            max_retries,
            initial,
            max_backoff,
            backoff: initial.min(max_backoff),
            timeout: None,
        }
    }

    /// Starts over from the initial duration, e.g. after a successful connection.
    pub fn reset(&mut self) {
        self.retry_count = 0;
        self.backoff = self.initial.min(self.max_backoff);
        self.timeout = None;
    }

    pub const fn retry_count(&self) -> usize {
        self.retry_count
    }

    /// (Re)-set the timeout to the current backoff duration.
    fn reset_timeout(&mut self) {
        self.timeout = Some(Box::pin(sleep(self.backoff)));
    }
}

impl Stream for ExponentialBackoff {
    type Item = Duration;

    /// Polls the exponential backoff stream. Returns `Poll::Ready` with the elapsed backoff
    /// duration once the timeout has fired, otherwise returns `Poll::Pending`.
    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(ref mut timeout) = this.timeout {
                if timeout.poll_unpin(cx).is_ready() {
                    let elapsed = this.backoff;

                    this.timeout = None;
                    this.retry_count += 1;
                    this.backoff = this.backoff.saturating_mul(2).min(this.max_backoff);

                    return Poll::Ready(Some(elapsed));
                } else {
                    // Timeout has not elapsed, so return pending
                    return Poll::Pending;
                }
            } else {
                // Close the stream
                if this.max_retries != 0 && this.retry_count >= this.max_retries {
                    return Poll::Ready(None);
                }

                this.reset_timeout();
            }
        }
    }
}
