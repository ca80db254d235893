//! KVS: an in-memory key-value store served over gRPC.
//!
//! The [`store::Store`] owns the data and serializes every operation behind a
//! single lock. The [`server`] module exposes it as the `clerk.ClerkService`
//! with an optional authorization check in front of the handlers.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod proto;
pub mod server;
pub mod store;

pub use error::{Error, Result};
