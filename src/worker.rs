//! Runs `Effect`s against the backend and reports back as `Event`s.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use crate::error::PortalError;
use crate::export::write_text;
use crate::portal::{Effect, Event, Portal};
use crate::remote::Backend;
use crate::status::StatusTracker;

/// Perform one effect synchronously.
pub fn execute(backend: &dyn Backend, export_dir: &Path, effect: Effect) -> Event {
    match effect {
        Effect::LoadDataset => {
            Event::DatasetLoaded(backend.load_dataset().map_err(|err| PortalError::load(&err)))
        }
        Effect::Search(query) => {
            let outcome = backend
                .search(&query)
                .map_err(|err| PortalError::search(&err));
            Event::SearchFinished { query, outcome }
        }
        Effect::FetchStatus {
            index,
            identity,
            generation,
        } => {
            let status = StatusTracker::fetch(backend, &identity);
            Event::StatusFetched {
                index,
                identity,
                status,
                generation,
            }
        }
        Effect::WriteStatus {
            index,
            identity,
            status,
        } => {
            let outcome = StatusTracker::write(backend, &identity, status);
            Event::StatusWritten {
                index,
                identity,
                status,
                outcome,
            }
        }
        Effect::Export(text) => {
            Event::Exported(write_text(export_dir, &text).map_err(|err| format!("{err:#}")))
        }
    }
}

/// Drive effects to completion on the current thread, applying each event
/// as it arrives. Used by the command line and tests.
pub fn run_inline(
    portal: &mut Portal,
    backend: &dyn Backend,
    export_dir: &Path,
    effects: Vec<Effect>,
) {
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        let event = execute(backend, export_dir, effect);
        queue.extend(portal.apply(event, Instant::now()));
    }
}

/// Background executor for the interactive UI. Each effect runs as its own
/// task on the rayon pool so status reads for many cards proceed in parallel.
pub struct Worker {
    backend: Arc<dyn Backend>,
    export_dir: PathBuf,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Worker {
    pub fn new(backend: Arc<dyn Backend>, export_dir: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend,
            export_dir,
            tx,
            rx,
        }
    }

    pub fn spawn(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let export_dir = self.export_dir.clone();
        let tx = self.tx.clone();
        rayon::spawn(move || {
            let event = execute(backend.as_ref(), &export_dir, effect);
            // receiver gone means the UI has exited
            let _ = tx.send(event);
        });
    }

    pub fn spawn_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.spawn(effect);
        }
    }

    /// Events that have already arrived.
    pub fn try_events(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::Command;
    use crate::remote::fake::FakeBackend;
    use crate::status::{CardStatus, ContactStatus};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn backend() -> FakeBackend {
        FakeBackend::with_records(
            serde_json::from_value(json!([
                {"Name": "Asha Roy", "Contact": "017123", "Email": "a@x.com"},
                {"Name": "Bina Das", "Contact": "018", "Email": "b@x.com"}
            ]))
            .unwrap(),
        )
    }

    #[test]
    fn search_then_status_reads_fill_every_card() {
        let backend = backend();
        backend.set_status("Bina Das_018_b@x.com", ContactStatus::Contacted);
        let dir = TempDir::new().unwrap();
        let mut portal = Portal::new();
        let effects = portal.start();
        run_inline(&mut portal, &backend, dir.path(), effects);
        assert_eq!(portal.dataset_len(), 2);

        portal.dispatch(Command::Input("x.com".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);
        assert_eq!(
            portal.card_statuses(),
            vec![
                CardStatus::Known(ContactStatus::NotContacted),
                CardStatus::Known(ContactStatus::Contacted)
            ]
        );
    }

    #[test]
    fn status_read_failure_fails_open() {
        let backend = backend();
        backend.fail_reads(true);
        let dir = TempDir::new().unwrap();
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("asha".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);
        assert_eq!(
            portal.card_status(0),
            CardStatus::Known(ContactStatus::NotContacted)
        );
        assert!(portal.error().is_none());
    }

    #[test]
    fn failed_write_leaves_store_and_cache_alone() {
        let backend = backend();
        backend.fail_writes(true);
        let dir = TempDir::new().unwrap();
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("asha".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);

        let effects = portal.dispatch(Command::MarkContacted(0), Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);
        assert_eq!(
            portal.error().map(ToString::to_string).as_deref(),
            Some("Failed to update contact status")
        );
        assert_eq!(backend.stored_status("Asha Roy_017123_a@x.com"), None);
        assert_eq!(
            portal.cached_status("Asha Roy_017123_a@x.com"),
            ContactStatus::NotContacted
        );
    }

    #[test]
    fn load_failure_surfaces_as_error() {
        let backend = backend();
        backend.fail_load(true);
        let dir = TempDir::new().unwrap();
        let mut portal = Portal::new();
        let effects = portal.start();
        run_inline(&mut portal, &backend, dir.path(), effects);
        assert!(!portal.dataset_loaded());
        assert_eq!(
            portal.error().map(ToString::to_string).as_deref(),
            Some("Failed to load data from server")
        );
    }

    #[test]
    fn search_failure_keeps_previous_results() {
        let backend = backend();
        let dir = TempDir::new().unwrap();
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("asha".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);

        backend.fail_search(true);
        portal.dispatch(Command::Input("bina".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);
        assert_eq!(
            portal.error().map(ToString::to_string).as_deref(),
            Some("Search failed. Please try again.")
        );
        assert_eq!(portal.results().len(), 1);
        assert!(!portal.is_loading());
    }

    #[test]
    fn export_writes_file_and_notifies() {
        let backend = backend();
        let dir = TempDir::new().unwrap();
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("asha".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);

        let effects = portal.dispatch(Command::Export, Instant::now());
        run_inline(&mut portal, &backend, dir.path(), effects);
        let written = std::fs::read_to_string(dir.path().join("hall_search_results.csv")).unwrap();
        assert_eq!(written, "Name,Contact,Email\nAsha Roy,017123,a@x.com");
        assert!(portal.notice().unwrap().message.starts_with("Exported 1 results"));
    }

    #[test]
    fn background_worker_delivers_events() {
        let backend = Arc::new(backend());
        let dir = TempDir::new().unwrap();
        let worker = Worker::new(backend.clone(), dir.path().to_path_buf());
        worker.spawn_all(vec![Effect::LoadDataset, Effect::Search("bina".into())]);

        let mut events = Vec::new();
        while events.len() < 2 {
            let event = worker
                .rx
                .recv_timeout(Duration::from_secs(5))
                .expect("worker event");
            events.push(event);
        }
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::DatasetLoaded(Ok(records)) if records.len() == 2)));
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SearchFinished { query, outcome: Ok(records) } if query == "bina" && records.len() == 1
        )));
        assert_eq!(backend.search_count(), 1);
        assert!(worker.try_events().is_empty());
    }
}
