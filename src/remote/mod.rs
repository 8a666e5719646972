//! Portal backend abstraction.
//!
//! This module provides:
//! - `Backend` trait for the four REST operations the portal consumes
//! - `HttpBackend` implementation using reqwest
//! - Wire types for the contact-status endpoints

pub mod http;

#[cfg(test)]
pub mod fake;

use serde::{Deserialize, Serialize};

use crate::error::RemoteError;
use crate::record::Record;
use crate::status::ContactStatus;

/// Body of `GET /api/contact-status/<id>`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: ContactStatus,
}

/// Body of `POST /api/contact-status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate<'a> {
    pub record_id: &'a str,
    pub status: ContactStatus,
}

/// Trait for portal backends. Implementations are shared across worker
/// threads, so every call must be safe to run concurrently.
pub trait Backend: Send + Sync {
    /// Fetch the full dataset (`GET /api/data`)
    fn load_dataset(&self) -> Result<Vec<Record>, RemoteError>;

    /// Run a search on the server (`GET /api/search?q=`)
    fn search(&self, query: &str) -> Result<Vec<Record>, RemoteError>;

    /// Read the stored status for an identity
    fn fetch_status(&self, identity: &str) -> Result<ContactStatus, RemoteError>;

    /// Store a status for an identity
    fn update_status(&self, identity: &str, status: ContactStatus) -> Result<(), RemoteError>;
}
