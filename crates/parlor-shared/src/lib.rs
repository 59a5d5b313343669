//! # parlor-shared
//!
//! Domain types, wire payloads, and protocol constants shared by every
//! Parlor crate.  Pure data, no I/O.

pub mod constants;
pub mod models;
pub mod protocol;
pub mod types;

pub use models::*;
pub use types::{ChannelId, ChannelKind, MessageId, Presence, UserId};
