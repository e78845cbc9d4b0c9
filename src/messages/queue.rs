// Thread-safe FIFO inbox for deferred commands
//
// Producer threads (network receive, scripting) push messages at any time;
// the simulation thread drains the queue once per tick. The handle is
// cheaply cloneable, all clones share one queue.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

use super::types::Message;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("pop called on an empty message queue")]
    Empty,
}

/// Unbounded FIFO guarded by a mutex
///
/// Arrival order is preserved overall, so per-producer push order survives
/// into pop order.
#[derive(Clone, Default)]
pub struct MessageQueue {
    inner: Arc<Mutex<VecDeque<Message>>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the back of the queue
    pub fn push(&self, message: Message) {
        self.inner.lock().push_back(message);
    }

    /// True when at least one message is waiting
    pub fn has_pending(&self) -> bool {
        !self.inner.lock().is_empty()
    }

    /// Remove and return the oldest message
    ///
    /// Checked precondition: popping an empty queue is an error, never UB.
    pub fn pop(&self) -> Result<Message, QueueError> {
        self.inner.lock().pop_front().ok_or(QueueError::Empty)
    }

    /// Number of waiting messages
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::ActorId;
    use std::thread;
    use ulid::Ulid;

    fn tagged(producer: u64, seq: u128) -> Message {
        // Encode producer/sequence into the id so pop order is checkable
        Message::DeleteActorRequested(ActorId(Ulid::from_parts(producer, seq)))
    }

    fn decode(message: &Message) -> (u64, u128) {
        match message {
            Message::DeleteActorRequested(id) => (id.0.timestamp_ms(), id.0.random()),
            _ => panic!("unexpected message kind"),
        }
    }

    #[test]
    fn test_fifo_order_single_producer() {
        let queue = MessageQueue::new();
        for seq in 0..10 {
            queue.push(tagged(1, seq));
        }

        for expected in 0..10 {
            let (_, seq) = decode(&queue.pop().unwrap());
            assert_eq!(seq, expected);
        }
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_pop_empty_is_checked() {
        let queue = MessageQueue::new();
        assert_eq!(queue.pop().unwrap_err(), QueueError::Empty);
    }

    #[test]
    fn test_concurrent_push_conserves_messages_and_producer_order() {
        const PRODUCERS: u64 = 4;
        const PER_PRODUCER: u128 = 200;

        let queue = MessageQueue::new();

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for seq in 0..PER_PRODUCER {
                        queue.push(tagged(producer, seq));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Conservation: every push is popped exactly once
        let mut popped = Vec::new();
        while queue.has_pending() {
            popped.push(decode(&queue.pop().unwrap()));
        }
        assert_eq!(popped.len(), (PRODUCERS as usize) * (PER_PRODUCER as usize));

        // Per-producer order is preserved in the drained sequence
        for producer in 0..PRODUCERS {
            let sequence: Vec<u128> = popped
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, seq)| *seq)
                .collect();
            let mut sorted = sequence.clone();
            sorted.sort_unstable();
            assert_eq!(sequence, sorted, "producer {} order broken", producer);
        }
    }
}
