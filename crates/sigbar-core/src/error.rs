use thiserror::Error;

/// Errors surfaced by the indicator engine and its worker threads.
///
/// None of these are fatal: an invalid slot skips one notification cycle,
/// and a closed notifier or runtime only means nobody is listening anymore.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("slot index {slot} outside 0..{phone_count}")]
    InvalidSlot { slot: i32, phone_count: u32 },
    #[error("change notifier worker has exited")]
    NotifierClosed,
    #[error("subscription runtime has shut down")]
    RuntimeClosed,
}
