//! AI module for talking to the configured HTTP endpoint.
//!
//! This module resolves the provider family from the endpoint, builds and
//! sends one request per user turn, parses the reply, and persists the
//! resulting transcript.

pub mod client;
pub mod persistence;
pub mod prompt;
pub mod provider;
pub mod transport;

pub use client::{AiClient, AiError, DEFAULT_REQUEST_TIMEOUT};
pub use persistence::{HistoryStore, Role, Turn, MAX_HISTORY_LENGTH};
pub use provider::ProviderKind;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
