//! Per-record contact status, cached locally and mirrored to the backend.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PortalError;
use crate::remote::Backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    NotContacted,
    Contacted,
}

impl ContactStatus {
    /// Wire form, also used as the key in the backend's store.
    pub fn as_str(self) -> &'static str {
        match self {
            ContactStatus::NotContacted => "not_contacted",
            ContactStatus::Contacted => "contacted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContactStatus::NotContacted => "Not Contacted",
            ContactStatus::Contacted => "Contacted",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            ContactStatus::Contacted => "Marked as contacted successfully!",
            ContactStatus::NotContacted => "Contact status reset successfully!",
        }
    }
}

/// Display state of one rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardStatus {
    #[default]
    Loading,
    Known(ContactStatus),
}

impl CardStatus {
    pub fn badge(self) -> &'static str {
        match self {
            CardStatus::Loading => "Loading...",
            CardStatus::Known(status) => status.label(),
        }
    }

    /// "Mark as contacted" is offered until the record is known to be contacted.
    pub fn can_mark(self) -> bool {
        !matches!(self, CardStatus::Known(ContactStatus::Contacted))
    }

    pub fn can_reset(self) -> bool {
        matches!(self, CardStatus::Known(ContactStatus::Contacted))
    }
}

/// Local cache of contact statuses keyed by record identity.
///
/// The backend is authoritative; the cache only advances after a confirmed
/// write or a completed read. Each confirmed write bumps the identity's
/// generation, and a read issued at an older generation is stale.
#[derive(Debug, Default, Clone)]
pub struct StatusTracker {
    cache: HashMap<String, ContactStatus>,
    generations: HashMap<String, u64>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached status, `NotContacted` for identities never seen.
    pub fn cached(&self, identity: &str) -> ContactStatus {
        self.cache.get(identity).copied().unwrap_or_default()
    }

    /// Number of confirmed writes seen for `identity`. Stamped on each read
    /// when it is issued.
    pub fn generation(&self, identity: &str) -> u64 {
        self.generations.get(identity).copied().unwrap_or(0)
    }

    /// Store a completed read and return the status the identity now has.
    /// A read older than the last confirmed write leaves the cache alone.
    pub fn record_read(&mut self, identity: &str, status: ContactStatus, generation: u64) -> ContactStatus {
        if generation < self.generation(identity) {
            tracing::debug!(identity, "status read predates a confirmed write");
            return self.cached(identity);
        }
        self.cache.insert(identity.to_string(), status);
        status
    }

    pub fn record_write(&mut self, identity: &str, status: ContactStatus) {
        self.cache.insert(identity.to_string(), status);
        *self.generations.entry(identity.to_string()).or_insert(0) += 1;
    }

    /// Read a status from the backend. Any failure reads as `NotContacted`.
    pub fn fetch(backend: &dyn Backend, identity: &str) -> ContactStatus {
        match backend.fetch_status(identity) {
            Ok(status) => status,
            Err(err) => {
                let err = PortalError::StatusFetch(err.to_string());
                tracing::debug!(identity, error = %err, "status read failed open");
                ContactStatus::NotContacted
            }
        }
    }

    /// Write a status to the backend without touching any cache.
    pub fn write(
        backend: &dyn Backend,
        identity: &str,
        status: ContactStatus,
    ) -> Result<(), PortalError> {
        backend
            .update_status(identity, status)
            .map_err(|err| PortalError::status_update(status, &err))
    }
}
