//! # parlor-api
//!
//! The request gateway: one typed `reqwest` client wrapping every HTTP call
//! with uniform envelope parsing and automatic session-cookie propagation.
//! Callers never touch the cookie directly; the jar attaches it and the
//! route guard only observes its presence.
//!
//! No retries happen at this layer.  Failures surface immediately as
//! [`GatewayError`] and retry policy, where one exists, belongs to callers.

pub mod auth;
pub mod chat;
pub mod gateway;
pub mod twofa;
pub mod users;

mod error;

pub use auth::{FactorChallenge, LoginOutcome};
pub use error::{GatewayError, Result};
pub use gateway::{ApiClient, Envelope};
pub use twofa::TwoFactorSetup;
