//! Trailing-edge debouncing for bursty input events.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Wraps a handler so that rapid repeated calls collapse into a single
/// invocation carrying the most recent value, one quiet period after the
/// last call.
///
/// Each constructed `Debouncer` has independent suppression state: two
/// instances wrapping the same handler do not suppress each other.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(quiet: Duration, mut on_settle: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                let mut deadline = Instant::now() + quiet;
                loop {
                    tokio::select! {
                        _ = time::sleep_until(deadline) => {
                            on_settle(latest);
                            break;
                        }
                        next = rx.recv() => match next {
                            Some(value) => {
                                latest = value;
                                deadline = Instant::now() + quiet;
                            }
                            None => {
                                // Handle dropped with a call pending: the
                                // trailing invocation still fires.
                                time::sleep_until(deadline).await;
                                on_settle(latest);
                                return;
                            }
                        },
                    }
                }
            }
        });

        Self { tx }
    }

    /// Record a call. Non-blocking; within a burst only the most recent
    /// value survives.
    pub fn call(&self, value: T) {
        let _ = self.tx.send(value);
    }
}
