//! Change notification.
//!
//! A [`Regenerator`] counts settled writes. Each [`Subscription`] remembers
//! the last generation it saw and wakes once the counter moves past it, so
//! any number of subscribers observe writes independently of each other.
//! Nothing is buffered: a subscriber that falls behind by several writes
//! wakes once and sees only the newest generation.
//!
//! # Examples
//!
//! ```
//! use afs_vfs::regenerator::{Outcome, Regenerator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let regenerator = Regenerator::new();
//! let mut subscription = regenerator.subscribe();
//!
//! regenerator.updated();
//! let notification = subscription.changed().await.unwrap();
//!
//! assert_eq!(notification.generation, 1);
//! assert_eq!(notification.outcome, Outcome::Updated);
//! # }
//! ```

use tokio::sync::watch;

/// How the most recent write ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No write has settled yet.
    Initial,
    /// The write succeeded.
    Updated,
    /// The write failed with the given message.
    Errored(String),
}

/// A settled write as seen by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Number of writes settled so far.
    pub generation: u64,
    /// How the latest one ended.
    pub outcome: Outcome,
}

/// Generation counter with wake-ups for any number of subscribers.
#[derive(Debug)]
pub struct Regenerator {
    sender: watch::Sender<Notification>,
}

impl Default for Regenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Regenerator {
    /// Creates a regenerator at generation 0.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Notification {
            generation: 0,
            outcome: Outcome::Initial,
        });
        Self { sender }
    }

    /// Settles a successful write.
    pub fn updated(&self) {
        self.settle(Outcome::Updated);
    }

    /// Settles a failed write.
    pub fn errored(&self, message: impl Into<String>) {
        self.settle(Outcome::Errored(message.into()));
    }

    fn settle(&self, outcome: Outcome) {
        self.sender.send_modify(|notification| {
            notification.generation += 1;
            notification.outcome = outcome;
        });
    }

    /// Number of writes settled so far.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.sender.borrow().generation
    }

    /// Starts observing from the current generation.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }
}

/// An independent view of a [`Regenerator`].
#[derive(Debug)]
pub struct Subscription {
    receiver: watch::Receiver<Notification>,
}

impl Subscription {
    /// Waits for a generation newer than the last one seen.
    ///
    /// Returns `None` once the regenerator is gone.
    pub async fn changed(&mut self) -> Option<Notification> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// The last generation this subscription has seen.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.receiver.borrow().generation
    }
}
