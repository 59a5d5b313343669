use thiserror::Error;

use parlor_shared::MessageId;

/// Errors produced by the stream engine.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The transport is not connected, or its task has terminated.
    #[error("Stream transport unavailable")]
    TransportUnavailable,

    /// Message content was empty after trimming whitespace.
    #[error("Message content is empty")]
    EmptyMessage,

    /// An operation required an attached channel but none is active.
    #[error("No channel attached")]
    NotAttached,

    /// Edit/delete referenced a message id not present in the cache.
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),

    /// History fetch failed at the gateway.
    #[error("History fetch failed: {0}")]
    History(#[from] parlor_api::GatewayError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StreamError>;
