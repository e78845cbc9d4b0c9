// Deferred command inbox and outbound event stream

pub mod queue;
pub mod types;

pub use queue::{MessageQueue, QueueError};
pub use types::{EventReceiver, EventSender, GameEvent, Message};
