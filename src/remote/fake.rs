//! In-memory backend for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::RemoteError;
use crate::record::Record;
use crate::remote::Backend;
use crate::status::ContactStatus;

/// Behaves like the reference server: search is a case-insensitive substring
/// scan over string fields, unknown identities read as not contacted.
#[derive(Default)]
pub struct FakeBackend {
    dataset: Mutex<Vec<Record>>,
    statuses: Mutex<HashMap<String, ContactStatus>>,
    fail_load: AtomicBool,
    fail_search: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    searches: AtomicUsize,
}

impl FakeBackend {
    pub fn with_records(records: Vec<Record>) -> Self {
        let backend = Self::default();
        *backend.dataset.lock().unwrap() = records;
        backend
    }

    pub fn set_status(&self, identity: &str, status: ContactStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(identity.to_string(), status);
    }

    pub fn stored_status(&self, identity: &str) -> Option<ContactStatus> {
        self.statuses.lock().unwrap().get(identity).copied()
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_search(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn server_error(path: &str) -> RemoteError {
        RemoteError::Status {
            url: format!("fake://{path}"),
            status: 500,
        }
    }
}

impl Backend for FakeBackend {
    fn load_dataset(&self) -> Result<Vec<Record>, RemoteError> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(Self::server_error("api/data"));
        }
        Ok(self.dataset.lock().unwrap().clone())
    }

    fn search(&self, query: &str) -> Result<Vec<Record>, RemoteError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(Self::server_error("api/search"));
        }
        let needle = query.trim().to_lowercase();
        let dataset = self.dataset.lock().unwrap();
        Ok(dataset
            .iter()
            .filter(|record| {
                record.fields().any(|(_, value)| {
                    value
                        .as_str()
                        .is_some_and(|text| text.to_lowercase().contains(&needle))
                })
            })
            .cloned()
            .collect())
    }

    fn fetch_status(&self, identity: &str) -> Result<ContactStatus, RemoteError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::server_error("api/contact-status"));
        }
        Ok(self.stored_status(identity).unwrap_or_default())
    }

    fn update_status(&self, identity: &str, status: ContactStatus) -> Result<(), RemoteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::server_error("api/contact-status"));
        }
        self.set_status(identity, status);
        Ok(())
    }
}
