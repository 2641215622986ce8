//! Eva HTTP client
//!
//! An authenticated REST client for the events API: a single request gateway
//! that attaches the session's bearer token, typed CRUD wrappers for events,
//! categories and participants, and the login/registration endpoints.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, ClientError, CredentialPolicy, OutgoingRequest};
pub use types::{Category, Event, EventFilter, Listing, Participant};
