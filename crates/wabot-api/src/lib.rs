//! REST client for the WhatsApp bot admin backend.
//!
//! The backend owns the WhatsApp session, the restriction table and the
//! default messages. This crate maps each of its endpoints 1:1 onto an
//! [`AdminApi`] method and decodes the `{ data: ... }` envelopes into typed
//! domain values.
//!
//! # Components
//!
//! - [`AdminApi`]: object-safe trait, the seam state machines are tested against
//! - [`HttpClient`]: reqwest implementation over a single base URL
//! - [`ApiConfig`]: validated base URL and per-request timeout
//! - [`Restriction`], [`DefaultMessage`], [`QrPayload`]: domain types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod types;

pub use client::{AdminApi, HttpClient};
pub use config::ApiConfig;
pub use error::{ApiError, InvalidRestriction, Result};
pub use types::{
    DefaultMessage, MessageId, QrPayload, Restriction, RestrictionId, RestrictionPatch,
    RestrictionValue,
};
