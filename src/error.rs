use thiserror::Error;

use crate::status::ContactStatus;

/// Failures talking to the portal backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid backend url: {0}")]
    Url(String),
}

impl RemoteError {
    /// True when no usable response came back: the server could not be
    /// reached or its body could not be read. An HTTP error status is not.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            RemoteError::Transport { .. } | RemoteError::Decode { .. } | RemoteError::Url(_)
        )
    }
}

/// User-facing error kinds. Every network failure is converted into one of
/// these at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortalError {
    #[error("{0}")]
    Load(String),
    #[error("Please enter a search term")]
    EmptyQuery,
    #[error("{0}")]
    Search(String),
    /// Never shown to the user: status reads fail open.
    #[error("could not fetch contact status: {0}")]
    StatusFetch(String),
    #[error("Failed to {action} contact status")]
    StatusUpdate { action: &'static str, reason: String },
    #[error("No results to export")]
    NothingToExport,
    #[error("Failed to export results: {0}")]
    ExportWrite(String),
}

impl PortalError {
    pub fn load(err: &RemoteError) -> Self {
        tracing::warn!(error = %err, "dataset load failed");
        if err.is_unreachable() {
            PortalError::Load("Error connecting to server".to_string())
        } else {
            PortalError::Load("Failed to load data from server".to_string())
        }
    }

    pub fn search(err: &RemoteError) -> Self {
        tracing::warn!(error = %err, "search failed");
        if err.is_unreachable() {
            PortalError::Search("Error performing search".to_string())
        } else {
            PortalError::Search("Search failed. Please try again.".to_string())
        }
    }

    pub fn status_update(status: ContactStatus, err: &RemoteError) -> Self {
        tracing::warn!(error = %err, status = status.as_str(), "contact status update failed");
        let action = match status {
            ContactStatus::Contacted => "update",
            ContactStatus::NotContacted => "reset",
        };
        PortalError::StatusUpdate {
            action,
            reason: err.to_string(),
        }
    }
}
