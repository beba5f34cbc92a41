//! Per-cell FIFO waiter queues for contested `flip` calls (§3 "Waiter queue",
//! §4.6, §9's "one-shot channel per waiter" construction).

use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

use super::cell::Position;

/// FIFO queue of suspended `flip` calls waiting for a cell's controller to
/// release it, or for the cell to be removed.
///
/// Invariant W1: a waiter on `(r,c)` is only enqueued when the cell was
/// observed with `controller = Some(other)` or removed mid-wait.
#[derive(Default)]
pub struct WaiterQueues {
    queues: HashMap<Position, VecDeque<oneshot::Sender<()>>>,
}

impl WaiterQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new waiter at `pos` and return the receiver half. The caller
    /// must drop the board lock before awaiting this receiver.
    pub fn enqueue(&mut self, pos: Position) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        self.queues.entry(pos).or_default().push_back(tx);
        rx
    }

    /// Wake exactly the longest-queued waiter at `pos`, per the strict FIFO
    /// discipline required by §4.6 and the fairness law in §8. A send that
    /// fails (the waiter's future was dropped) is not retried — see
    /// DESIGN.md's cancellation decision.
    pub fn wake_one(&mut self, pos: Position) {
        if let Some(queue) = self.queues.get_mut(&pos) {
            while let Some(sender) = queue.pop_front() {
                if sender.send(()).is_ok() {
                    break;
                }
            }
            if queue.is_empty() {
                self.queues.remove(&pos);
            }
        }
    }

    /// Wake every waiter at `pos` at once. Used on cell removal (rule 3-A):
    /// §4.6 permits this because no correctness invariant depends on keeping
    /// later waiters suspended once the cell they're waiting on is gone.
    pub fn wake_all(&mut self, pos: Position) {
        if let Some(queue) = self.queues.remove(&pos) {
            for sender in queue {
                let _ = sender.send(());
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self, pos: Position) -> usize {
        self.queues.get(&pos).map(VecDeque::len).unwrap_or(0)
    }
}
