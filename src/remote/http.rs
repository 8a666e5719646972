//! HTTP backend implementation using reqwest.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::RemoteError;
use crate::record::Record;
use crate::remote::{Backend, StatusResponse, StatusUpdate};
use crate::status::ContactStatus;

const DATA_PATH: &[&str] = &["api", "data"];
const SEARCH_PATH: &[&str] = &["api", "search"];
const STATUS_PATH: &[&str] = &["api", "contact-status"];

/// Backend reached over plain JSON/HTTP
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend for the server rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = parse_base_url(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hallfind/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| RemoteError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so identities containing spaces or slashes stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| RemoteError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response = check_status(&url, response)?;
        response.json::<T>().map_err(|source| RemoteError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl Backend for HttpBackend {
    fn load_dataset(&self) -> Result<Vec<Record>, RemoteError> {
        let url = self.endpoint(DATA_PATH)?;
        self.get_json(url)
    }

    fn search(&self, query: &str) -> Result<Vec<Record>, RemoteError> {
        let mut url = self.endpoint(SEARCH_PATH)?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url)
    }

    fn fetch_status(&self, identity: &str) -> Result<ContactStatus, RemoteError> {
        let mut segments = STATUS_PATH.to_vec();
        segments.push(identity);
        let url = self.endpoint(&segments)?;
        let response: StatusResponse = self.get_json(url)?;
        Ok(response.status)
    }

    fn update_status(&self, identity: &str, status: ContactStatus) -> Result<(), RemoteError> {
        let url = self.endpoint(STATUS_PATH)?;
        tracing::debug!(%url, identity, status = status.as_str(), "POST");
        let body = StatusUpdate {
            record_id: identity,
            status,
        };
        let response = self
            .client
            .post(url.clone())
            .json(&body)
            .send()
            .map_err(|source| RemoteError::Transport {
                url: url.to_string(),
                source,
            })?;
        check_status(&url, response)?;
        Ok(())
    }
}

/// Accept only absolute http(s) URLs that can carry path segments.
pub fn parse_base_url(raw: &str) -> Result<Url, RemoteError> {
    let url = Url::parse(raw.trim()).map_err(|err| RemoteError::Url(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(RemoteError::Url(format!("{raw}: expected an http(s) url")));
    }
    Ok(url)
}

fn check_status(url: &Url, response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(RemoteError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
