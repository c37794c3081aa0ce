//! wrapi: a uniform HTTP request facade.
//!
//! Wraps reqwest behind five verb functions (GET, POST, PUT, PATCH,
//! DELETE) that normalize every outcome, success or failure, into one
//! [`Envelope`] shape. No retries, no queuing, no connection management:
//! transport concerns stay with the underlying client.
//!
//! Either construct an [`ApiClient`] and pass it where it is needed, or
//! use the [`global`] module for configure-once process-wide usage.

pub mod client;
pub mod envelope;
pub mod global;

pub use client::config::{Auth, Config, Overrides};
pub use client::{ApiClient, QueryParams, Requests};
pub use envelope::{Envelope, Outcome};
