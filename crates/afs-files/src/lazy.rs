//! Memoizing cell for file data.
//!
//! A [`LazyCell`] is in one of three states:
//!
//! ```text
//!   Unevaluated(producer) --Ready--> Cached(data)
//!          |                              ^
//!        Stream                         Ready
//!          v                              |
//!   Uncacheable(producer) ----------------+
//!          ^    |
//!          +----+ Stream
//! ```
//!
//! Ready data is cached and never recomputed. A stream can only be read once,
//! so the producer is kept and invoked again on every read until it returns
//! ready data.

use crate::data::{Data, DataFormat, Payload, collect};
use afs_core::Result;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A function producing file data on demand.
pub type Producer = Arc<dyn Fn(DataFormat) -> BoxFuture<'static, Result<Payload>> + Send + Sync>;

/// Observable state of a [`LazyCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LazyState {
    /// The producer has not run yet.
    Unevaluated,
    /// Data is cached.
    Cached,
    /// The last production was a stream; the producer runs on every read.
    Uncacheable,
}

enum State {
    Unevaluated(Producer),
    Cached(Data),
    Uncacheable(Producer),
}

/// Tri-state cell holding either data or a producer of data.
pub struct LazyCell {
    state: Mutex<State>,
}

impl LazyCell {
    /// Creates a cell that already holds data.
    #[must_use]
    pub fn ready(data: Data) -> Self {
        Self {
            state: Mutex::new(State::Cached(data)),
        }
    }

    /// Creates a cell that runs `producer` on first read.
    pub fn lazy<F, Fut>(f: F) -> Self
    where
        F: Fn(DataFormat) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Payload>> + Send + 'static,
    {
        let producer: Producer =
            Arc::new(move |format| -> BoxFuture<'static, Result<Payload>> { Box::pin(f(format)) });
        Self {
            state: Mutex::new(State::Unevaluated(producer)),
        }
    }

    /// Returns the data, producing it if needed.
    ///
    /// The cell stays locked while the producer runs, so concurrent first
    /// reads evaluate it once.
    ///
    /// # Errors
    ///
    /// Returns the producer's error, or an error raised while draining a
    /// stream. A failed production leaves the state unchanged.
    pub async fn get(&self, format: DataFormat) -> Result<Data> {
        let mut state = self.state.lock().await;
        let producer = match &*state {
            State::Cached(data) => return Ok(data.clone()),
            State::Unevaluated(producer) | State::Uncacheable(producer) => Arc::clone(producer),
        };

        match producer(format).await? {
            Payload::Ready(data) => {
                *state = State::Cached(data.clone());
                Ok(data)
            }
            Payload::Stream(stream) => {
                *state = State::Uncacheable(producer);
                drop(state);
                collect(stream).await.map(Data::Binary)
            }
        }
    }

    /// Returns the current state.
    pub async fn state(&self) -> LazyState {
        match &*self.state.lock().await {
            State::Unevaluated(_) => LazyState::Unevaluated,
            State::Cached(_) => LazyState::Cached,
            State::Uncacheable(_) => LazyState::Uncacheable,
        }
    }
}

impl fmt::Debug for LazyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state.try_lock() {
            Ok(guard) => match &*guard {
                State::Unevaluated(_) => "Unevaluated",
                State::Cached(_) => "Cached",
                State::Uncacheable(_) => "Uncacheable",
            },
            Err(_) => "<locked>",
        };
        f.debug_struct("LazyCell").field("state", &state).finish()
    }
}
