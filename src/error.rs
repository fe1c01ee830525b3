use std::collections::TryReserveError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("site {index} has a non finite coordinate")]
    NonFiniteSite { index: usize },
    #[error("{count} sites do not fit into 32 bit ids")]
    TooManySites { count: usize },
    #[error("event queue refused an event at capacity {capacity}")]
    EventQueueExhausted { capacity: usize },
    #[error("allocation failed")]
    Allocation(#[from] TryReserveError),
}
