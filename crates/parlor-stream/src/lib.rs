//! # parlor-stream
//!
//! The live message synchronization core: a persistent, reconnecting
//! pub/sub transport plus the per-channel message cache layered on top.
//!
//! The transport runs in a dedicated tokio task and owns the socket
//! lifecycle, including fixed-delay reconnection and re-subscription.
//! External code talks to it through typed command and event channels; the
//! [`engine::MessageStreamEngine`] never touches the socket itself.

pub mod engine;
pub mod transport;

mod error;

pub use engine::{ConnectionState, MessageStreamEngine};
pub use error::{Result, StreamError};
pub use transport::{spawn_transport, TransportCommand, TransportConfig, TransportEvent};
