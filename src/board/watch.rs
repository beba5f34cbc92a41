//! One-shot change-watcher broadcast set (§3 "Change-watcher set", §4.8, §9's
//! "many-producers/many-consumers one-shot" construction).

use tokio::sync::{oneshot, Mutex};

use super::cell::PlayerId;
use super::BoardInner;

/// Suspend until the next change signal, then return the caller's snapshot
/// (§5 suspension point 2). A change emitted while this call is registered,
/// even one that completes before the caller is scheduled again, is still
/// observed because the registration happens under the same lock acquisition
/// that a concurrent change-emitting operation would need.
pub(super) async fn watch(board: &Mutex<BoardInner>, player_id: &PlayerId) -> String {
    let rx = {
        let mut inner = board.lock().await;
        inner.changes.register()
    };
    let _ = rx.await;
    let inner = board.lock().await;
    inner.snapshot(player_id)
}

/// Unordered set of suspended `watch` calls. Invariant X1: a single change
/// event must wake every watcher registered at the moment of the event;
/// watchers registered after that event are not woken by it.
///
/// A `tokio::sync::broadcast` channel was considered (and is what
/// `game::coordinator` uses for its event fan-out) but rejected here: a
/// bounded broadcast channel can silently drop lagging receivers, which would
/// violate X1's "every currently-registered watcher wakes" guarantee. Draining
/// a plain `Vec` of one-shot senders gives that guarantee for free.
#[derive(Default)]
pub struct ChangeSet {
    watchers: Vec<oneshot::Sender<()>>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new one-shot watcher. The caller must drop the board lock
    /// before awaiting the returned receiver.
    pub fn register(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.watchers.push(tx);
        rx
    }

    /// Wake every watcher registered so far, then clear the set so later
    /// registrants join a fresh generation (X1).
    pub fn signal(&mut self) {
        for sender in self.watchers.drain(..) {
            let _ = sender.send(());
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.watchers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signal_wakes_every_registered_watcher() {
        let mut set = ChangeSet::new();
        let rx1 = set.register();
        let rx2 = set.register();
        assert_eq!(set.len(), 2);

        set.signal();
        assert!(rx1.await.is_ok());
        assert!(rx2.await.is_ok());
        assert_eq!(set.len(), 0);
    }

    #[tokio::test]
    async fn watchers_registered_after_a_signal_are_not_woken_by_it() {
        let mut set = ChangeSet::new();
        set.signal(); // no watchers yet, no-op
        let rx = set.register();
        assert_eq!(set.len(), 1);
        // rx is still pending; a second signal is needed to wake it.
        set.signal();
        assert!(rx.await.is_ok());
    }
}
