//! Application state and its transitions.
//!
//! Every user action is a `Command` and every finished network call is an
//! `Event`. Both are applied by plain methods on `Portal` that mutate state
//! and return the `Effect`s (network work, file writes) to run next. Nothing
//! here performs I/O, so the transition logic is testable without a terminal
//! or a server.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::PortalError;
use crate::export::to_delimited_text;
use crate::record::{identity, Record, RecordStore};
use crate::render::{self, RenderedField, View};
use crate::search::{normalize_query, suggest, Suggestion, MIN_SUGGEST_CHARS};
use crate::status::{CardStatus, ContactStatus, StatusTracker};

/// Trailing-edge delay before suggestions are recomputed after typing.
pub const SUGGEST_DEBOUNCE: Duration = Duration::from_millis(300);
/// Lifetime of a success notice.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Bn,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Bn,
            Language::Bn => Language::En,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Bn => "bn",
        }
    }

    /// Label of the toggle: names the language you would switch to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Language::En => "বাংলা",
            Language::Bn => "English",
        }
    }
}

/// Trailing-edge debouncer driven by explicit instants.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Re-arm the window from `now`; any earlier pending call is dropped.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once per quiet period, when the window has elapsed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// The query box now holds this text.
    Input(String),
    Submit,
    SelectSuggestion(usize),
    HideSuggestions,
    ShowDetails(usize),
    CloseDetails,
    MarkContacted(usize),
    Reset(usize),
    Export,
    Clear,
    ToggleLanguage,
    DismissError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DatasetLoaded(Result<Vec<Record>, PortalError>),
    SearchFinished {
        query: String,
        outcome: Result<Vec<Record>, PortalError>,
    },
    StatusFetched {
        index: usize,
        identity: String,
        status: ContactStatus,
        generation: u64,
    },
    StatusWritten {
        index: usize,
        identity: String,
        status: ContactStatus,
        outcome: Result<(), PortalError>,
    },
    Exported(Result<PathBuf, String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadDataset,
    Search(String),
    /// `generation` is the identity's write generation when the read was
    /// issued.
    FetchStatus {
        index: usize,
        identity: String,
        generation: u64,
    },
    WriteStatus {
        index: usize,
        identity: String,
        status: ContactStatus,
    },
    /// Write this delimited text to the export file.
    Export(String),
}

/// Transient success message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug, Clone)]
struct CardSlot {
    identity: String,
    status: CardStatus,
}

#[derive(Debug)]
pub struct Portal {
    store: RecordStore,
    query: String,
    suggestions: Vec<Suggestion>,
    debouncer: Debouncer,
    results: Vec<Record>,
    results_query: String,
    cards: Vec<CardSlot>,
    tracker: StatusTracker,
    details: Option<usize>,
    pending_searches: usize,
    language: Language,
    error: Option<PortalError>,
    notice: Option<Notice>,
}

impl Default for Portal {
    fn default() -> Self {
        Self::new()
    }
}

impl Portal {
    pub fn new() -> Self {
        Self {
            store: RecordStore::default(),
            query: String::new(),
            suggestions: Vec::new(),
            debouncer: Debouncer::new(SUGGEST_DEBOUNCE),
            results: Vec::new(),
            results_query: String::new(),
            cards: Vec::new(),
            tracker: StatusTracker::new(),
            details: None,
            pending_searches: 0,
            language: Language::default(),
            error: None,
            notice: None,
        }
    }

    /// Effects to run once at startup.
    pub fn start(&mut self) -> Vec<Effect> {
        vec![Effect::LoadDataset]
    }

    pub fn dispatch(&mut self, command: Command, now: Instant) -> Vec<Effect> {
        tracing::trace!(?command, "dispatch");
        match command {
            Command::Input(text) => {
                self.query = text;
                self.debouncer.touch(now);
            }
            Command::Submit => return self.submit(),
            Command::SelectSuggestion(index) => {
                if let Some(suggestion) = self.suggestions.get(index) {
                    self.query = suggestion.text.clone();
                    return self.submit();
                }
            }
            Command::HideSuggestions => self.hide_suggestions(),
            Command::ShowDetails(index) => {
                if index < self.results.len() {
                    self.details = Some(index);
                }
            }
            Command::CloseDetails => self.details = None,
            Command::MarkContacted(index) => {
                return self.write_status(index, ContactStatus::Contacted)
            }
            Command::Reset(index) => return self.write_status(index, ContactStatus::NotContacted),
            Command::Export => {
                if self.results.is_empty() {
                    self.error = Some(PortalError::NothingToExport);
                } else {
                    return vec![Effect::Export(to_delimited_text(&self.results))];
                }
            }
            Command::Clear => self.clear(),
            Command::ToggleLanguage => {
                self.language = self.language.toggled();
                tracing::info!(language = self.language.code(), "language switched");
            }
            Command::DismissError => self.error = None,
        }
        Vec::new()
    }

    pub fn apply(&mut self, event: Event, now: Instant) -> Vec<Effect> {
        match event {
            Event::DatasetLoaded(Ok(records)) => {
                tracing::info!(count = records.len(), "dataset loaded");
                self.store = RecordStore::from_records(records);
            }
            Event::DatasetLoaded(Err(err)) => self.error = Some(err),
            Event::SearchFinished { query, outcome } => {
                self.pending_searches = self.pending_searches.saturating_sub(1);
                match outcome {
                    Ok(records) => return self.show_results(query, records),
                    // previous results stay on screen
                    Err(err) => self.error = Some(err),
                }
            }
            Event::StatusFetched {
                index,
                identity,
                status,
                generation,
            } => {
                let status = self.tracker.record_read(&identity, status, generation);
                if let Some(card) = self.cards.get_mut(index) {
                    if card.identity == identity {
                        card.status = CardStatus::Known(status);
                    } else {
                        tracing::debug!(index, "status for a replaced card ignored");
                    }
                }
            }
            Event::StatusWritten {
                index,
                identity,
                status,
                outcome,
            } => match outcome {
                Ok(()) => {
                    tracing::info!(index, identity, status = status.as_str(), "status updated");
                    self.tracker.record_write(&identity, status);
                    for card in self.cards.iter_mut().filter(|card| card.identity == identity) {
                        card.status = CardStatus::Known(status);
                    }
                    self.notify(status.success_message(), now);
                }
                Err(err) => self.error = Some(err),
            },
            Event::Exported(Ok(path)) => {
                let message = format!(
                    "Exported {} results to {}",
                    self.results.len(),
                    path.display()
                );
                self.notify(message, now);
            }
            Event::Exported(Err(reason)) => self.error = Some(PortalError::ExportWrite(reason)),
        }
        Vec::new()
    }

    /// Advance timers: run a due suggestion refresh and expire notices.
    pub fn tick(&mut self, now: Instant) {
        if self.debouncer.fire(now) {
            self.refresh_suggestions();
        }
        if self.notice.as_ref().is_some_and(|notice| now >= notice.expires_at) {
            self.notice = None;
        }
    }

    /// Time until the next `tick` has work to do, if any.
    pub fn next_deadline(&self, now: Instant) -> Option<Duration> {
        let notice = self
            .notice
            .as_ref()
            .map(|notice| notice.expires_at.saturating_duration_since(now));
        match (self.debouncer.remaining(now), notice) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        match normalize_query(&self.query) {
            Ok(query) => {
                self.hide_suggestions();
                self.pending_searches += 1;
                tracing::debug!(query, "search submitted");
                vec![Effect::Search(query)]
            }
            Err(err) => {
                self.error = Some(err);
                Vec::new()
            }
        }
    }

    fn show_results(&mut self, query: String, records: Vec<Record>) -> Vec<Effect> {
        tracing::info!(query, count = records.len(), "search results");
        self.cards = records
            .iter()
            .map(|record| CardSlot {
                identity: identity(record),
                status: CardStatus::Loading,
            })
            .collect();
        self.results = records;
        self.results_query = query;
        self.details = None;

        self.cards
            .iter()
            .enumerate()
            .map(|(index, card)| Effect::FetchStatus {
                index,
                identity: card.identity.clone(),
                generation: self.tracker.generation(&card.identity),
            })
            .collect()
    }

    fn write_status(&mut self, index: usize, status: ContactStatus) -> Vec<Effect> {
        match self.cards.get(index) {
            Some(card) => vec![Effect::WriteStatus {
                index,
                identity: card.identity.clone(),
                status,
            }],
            None => Vec::new(),
        }
    }

    fn refresh_suggestions(&mut self) {
        let query = self.query.trim();
        self.suggestions = if query.chars().count() >= MIN_SUGGEST_CHARS {
            suggest(self.store.records(), query)
        } else {
            Vec::new()
        };
    }

    fn hide_suggestions(&mut self) {
        self.suggestions.clear();
        self.debouncer.cancel();
    }

    fn clear(&mut self) {
        self.query.clear();
        self.hide_suggestions();
        self.results.clear();
        self.results_query.clear();
        self.cards.clear();
        self.details = None;
    }

    fn notify(&mut self, message: impl Into<String>, now: Instant) {
        self.notice = Some(Notice {
            message: message.into(),
            expires_at: now + NOTICE_TTL,
        });
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn results(&self) -> &[Record] {
        &self.results
    }

    /// True once a search has completed since the last clear.
    pub fn has_searched(&self) -> bool {
        !self.results_query.is_empty()
    }

    pub fn view(&self) -> View {
        render::render(&self.results, &self.results_query)
    }

    pub fn card_status(&self, index: usize) -> CardStatus {
        self.cards
            .get(index)
            .map(|card| card.status)
            .unwrap_or_default()
    }

    pub fn card_statuses(&self) -> Vec<CardStatus> {
        self.cards.iter().map(|card| card.status).collect()
    }

    #[cfg(test)]
    pub fn cached_status(&self, identity: &str) -> ContactStatus {
        self.tracker.cached(identity)
    }

    pub fn details_index(&self) -> Option<usize> {
        self.details
    }

    pub fn details(&self) -> Option<Vec<RenderedField>> {
        self.details
            .and_then(|index| self.results.get(index))
            .map(render::details)
    }

    pub fn dataset_len(&self) -> usize {
        self.store.len()
    }

    pub fn dataset_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_searches > 0
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn error(&self) -> Option<&PortalError> {
        self.error.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(value).unwrap()
    }

    fn asha() -> Vec<Record> {
        records(json!([{"Name": "Asha Roy", "Contact": "017123", "Email": "a@x.com"}]))
    }

    fn loaded(data: Vec<Record>) -> Portal {
        let mut portal = Portal::new();
        portal.apply(Event::DatasetLoaded(Ok(data)), Instant::now());
        portal
    }

    fn searched(data: Vec<Record>, now: Instant) -> Portal {
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("q".into()), now);
        portal.dispatch(Command::Submit, now);
        portal.apply(
            Event::SearchFinished {
                query: "q".into(),
                outcome: Ok(data),
            },
            now,
        );
        portal
    }

    #[test]
    fn start_loads_dataset() {
        let mut portal = Portal::new();
        assert_eq!(portal.start(), vec![Effect::LoadDataset]);
        assert!(!portal.dataset_loaded());
    }

    #[test]
    fn failed_load_reports_once_and_keeps_store_empty() {
        let mut portal = Portal::new();
        portal.apply(
            Event::DatasetLoaded(Err(PortalError::Load("Error connecting to server".into()))),
            Instant::now(),
        );
        assert_eq!(portal.dataset_len(), 0);
        assert_eq!(
            portal.error().map(ToString::to_string).as_deref(),
            Some("Error connecting to server")
        );
        portal.dispatch(Command::DismissError, Instant::now());
        assert!(portal.error().is_none());
    }

    #[test]
    fn debounce_only_runs_trailing_call() {
        let t0 = Instant::now();
        let mut portal = loaded(asha());
        portal.dispatch(Command::Input("as".into()), t0);
        portal.dispatch(Command::Input("ash".into()), t0 + Duration::from_millis(200));
        portal.tick(t0 + Duration::from_millis(400));
        assert!(portal.suggestions().is_empty());

        portal.dispatch(Command::Input("asha".into()), t0 + Duration::from_millis(450));
        portal.tick(t0 + Duration::from_millis(749));
        assert!(portal.suggestions().is_empty());
        portal.tick(t0 + Duration::from_millis(750));
        assert_eq!(portal.suggestions().len(), 1);
        assert_eq!(portal.suggestions()[0].text, "Asha Roy");
        assert_eq!(portal.suggestions()[0].field, "Name");
    }

    #[test]
    fn short_input_hides_suggestions() {
        let t0 = Instant::now();
        let mut portal = loaded(asha());
        portal.dispatch(Command::Input("asha".into()), t0);
        portal.tick(t0 + SUGGEST_DEBOUNCE);
        assert_eq!(portal.suggestions().len(), 1);
        portal.dispatch(Command::Input(" a ".into()), t0 + SUGGEST_DEBOUNCE);
        portal.tick(t0 + SUGGEST_DEBOUNCE * 2);
        assert!(portal.suggestions().is_empty());
    }

    #[test]
    fn empty_submit_makes_no_request() {
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("   ".into()), Instant::now());
        let effects = portal.dispatch(Command::Submit, Instant::now());
        assert!(effects.is_empty());
        assert_eq!(portal.error(), Some(&PortalError::EmptyQuery));
        assert!(!portal.is_loading());
    }

    #[test]
    fn submit_trims_and_hides_suggestions() {
        let t0 = Instant::now();
        let mut portal = loaded(asha());
        portal.dispatch(Command::Input(" asha ".into()), t0);
        portal.tick(t0 + SUGGEST_DEBOUNCE);
        assert!(!portal.suggestions().is_empty());
        let effects = portal.dispatch(Command::Submit, t0 + SUGGEST_DEBOUNCE);
        assert_eq!(effects, vec![Effect::Search("asha".into())]);
        assert!(portal.suggestions().is_empty());
        assert!(portal.is_loading());
    }

    #[test]
    fn selecting_a_suggestion_searches_its_text() {
        let t0 = Instant::now();
        let mut portal = loaded(asha());
        portal.dispatch(Command::Input("roy".into()), t0);
        portal.tick(t0 + SUGGEST_DEBOUNCE);
        let effects = portal.dispatch(Command::SelectSuggestion(0), t0 + SUGGEST_DEBOUNCE);
        assert_eq!(effects, vec![Effect::Search("Asha Roy".into())]);
        assert_eq!(portal.query(), "Asha Roy");
        assert!(portal
            .dispatch(Command::SelectSuggestion(5), t0 + SUGGEST_DEBOUNCE)
            .is_empty());
    }

    #[test]
    fn results_request_status_per_card_in_order() {
        let now = Instant::now();
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("x".into()), now);
        portal.dispatch(Command::Submit, now);
        let data = records(json!([{"Name": "A"}, {"Name": "B"}]));
        let effects = portal.apply(
            Event::SearchFinished {
                query: "x".into(),
                outcome: Ok(data),
            },
            now,
        );
        assert_eq!(
            effects,
            vec![
                Effect::FetchStatus {
                    index: 0,
                    identity: "A__".into(),
                    generation: 0
                },
                Effect::FetchStatus {
                    index: 1,
                    identity: "B__".into(),
                    generation: 0
                },
            ]
        );
        assert!(!portal.is_loading());
        assert_eq!(portal.card_status(0), CardStatus::Loading);
    }

    #[test]
    fn search_failure_keeps_previous_results() {
        let now = Instant::now();
        let mut portal = searched(asha(), now);
        portal.dispatch(Command::Submit, now);
        portal.apply(
            Event::SearchFinished {
                query: "q".into(),
                outcome: Err(PortalError::Search("Search failed. Please try again.".into())),
            },
            now,
        );
        assert_eq!(portal.results().len(), 1);
        assert!(portal.error().is_some());
    }

    #[test]
    fn late_search_response_overwrites_newer_one() {
        let now = Instant::now();
        let mut portal = Portal::new();
        portal.dispatch(Command::Input("first".into()), now);
        portal.dispatch(Command::Submit, now);
        portal.dispatch(Command::Input("second".into()), now);
        portal.dispatch(Command::Submit, now);
        portal.apply(
            Event::SearchFinished {
                query: "second".into(),
                outcome: Ok(records(json!([{"Name": "S"}]))),
            },
            now,
        );
        portal.apply(
            Event::SearchFinished {
                query: "first".into(),
                outcome: Ok(records(json!([{"Name": "F"}]))),
            },
            now,
        );
        let View::Cards { title, .. } = portal.view() else {
            panic!("expected cards");
        };
        assert!(title.contains("\"first\""));
    }

    #[test]
    fn status_completions_apply_in_any_order() {
        let now = Instant::now();
        let mut portal = searched(records(json!([{"Name": "A"}, {"Name": "B"}])), now);
        for (index, identity, status) in [
            (1, "B__", ContactStatus::Contacted),
            (0, "A__", ContactStatus::NotContacted),
            (1, "B__", ContactStatus::Contacted),
        ] {
            portal.apply(
                Event::StatusFetched {
                    index,
                    identity: identity.into(),
                    status,
                    generation: 0,
                },
                now,
            );
        }
        assert_eq!(
            portal.card_statuses(),
            vec![
                CardStatus::Known(ContactStatus::NotContacted),
                CardStatus::Known(ContactStatus::Contacted)
            ]
        );
    }

    #[test]
    fn status_for_replaced_card_is_ignored() {
        let now = Instant::now();
        let mut portal = searched(records(json!([{"Name": "New"}])), now);
        portal.apply(
            Event::StatusFetched {
                index: 0,
                identity: "Old__".into(),
                status: ContactStatus::Contacted,
                generation: 0,
            },
            now,
        );
        assert_eq!(portal.card_status(0), CardStatus::Loading);
    }

    #[test]
    fn mark_advances_only_on_confirmed_write() {
        let now = Instant::now();
        let mut portal = searched(asha(), now);
        let id = "Asha Roy_017123_a@x.com";
        let effects = portal.dispatch(Command::MarkContacted(0), now);
        assert_eq!(
            effects,
            vec![Effect::WriteStatus {
                index: 0,
                identity: id.into(),
                status: ContactStatus::Contacted
            }]
        );
        // no optimistic update
        assert_eq!(portal.cached_status(id), ContactStatus::NotContacted);

        portal.apply(
            Event::StatusWritten {
                index: 0,
                identity: id.into(),
                status: ContactStatus::Contacted,
                outcome: Err(PortalError::StatusUpdate {
                    action: "update",
                    reason: "HTTP 500".into(),
                }),
            },
            now,
        );
        assert_eq!(portal.cached_status(id), ContactStatus::NotContacted);
        assert_eq!(portal.card_status(0), CardStatus::Loading);
        assert!(portal.notice().is_none());

        portal.apply(
            Event::StatusWritten {
                index: 0,
                identity: id.into(),
                status: ContactStatus::Contacted,
                outcome: Ok(()),
            },
            now,
        );
        assert_eq!(portal.cached_status(id), ContactStatus::Contacted);
        assert_eq!(portal.card_status(0), CardStatus::Known(ContactStatus::Contacted));
        assert_eq!(
            portal.notice().map(|n| n.message.as_str()),
            Some("Marked as contacted successfully!")
        );
    }

    #[test]
    fn late_status_read_does_not_undo_a_confirmed_mark() {
        let now = Instant::now();
        let mut portal = searched(asha(), now);
        let id = "Asha Roy_017123_a@x.com";
        portal.dispatch(Command::MarkContacted(0), now);
        portal.apply(
            Event::StatusWritten {
                index: 0,
                identity: id.into(),
                status: ContactStatus::Contacted,
                outcome: Ok(()),
            },
            now,
        );
        // read issued when the card first rendered
        portal.apply(
            Event::StatusFetched {
                index: 0,
                identity: id.into(),
                status: ContactStatus::NotContacted,
                generation: 0,
            },
            now,
        );
        assert_eq!(portal.card_status(0), CardStatus::Known(ContactStatus::Contacted));
        assert_eq!(portal.cached_status(id), ContactStatus::Contacted);

        // a fresh search reads at the new generation
        portal.dispatch(Command::Input("asha".into()), now);
        portal.dispatch(Command::Submit, now);
        let effects = portal.apply(
            Event::SearchFinished {
                query: "asha".into(),
                outcome: Ok(asha()),
            },
            now,
        );
        assert_eq!(
            effects,
            vec![Effect::FetchStatus {
                index: 0,
                identity: id.into(),
                generation: 1
            }]
        );
    }

    #[test]
    fn notice_expires_after_ttl() {
        let now = Instant::now();
        let mut portal = searched(asha(), now);
        portal.apply(
            Event::StatusWritten {
                index: 0,
                identity: "Asha Roy_017123_a@x.com".into(),
                status: ContactStatus::NotContacted,
                outcome: Ok(()),
            },
            now,
        );
        assert_eq!(portal.next_deadline(now), Some(NOTICE_TTL));
        portal.tick(now + NOTICE_TTL - Duration::from_millis(1));
        assert!(portal.notice().is_some());
        portal.tick(now + NOTICE_TTL);
        assert!(portal.notice().is_none());
    }

    #[test]
    fn actions_on_missing_cards_do_nothing() {
        let now = Instant::now();
        let mut portal = Portal::new();
        assert!(portal.dispatch(Command::MarkContacted(3), now).is_empty());
        assert!(portal.dispatch(Command::Reset(0), now).is_empty());
        portal.dispatch(Command::ShowDetails(0), now);
        assert!(portal.details().is_none());
    }

    #[test]
    fn details_show_all_fields_of_selected_record() {
        let now = Instant::now();
        let mut portal = searched(records(json!([{"Name": "A"}, {"Name": "B", "Room": "12"}])), now);
        portal.dispatch(Command::ShowDetails(1), now);
        let fields = portal.details().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].label, "Room");
        portal.dispatch(Command::CloseDetails, now);
        assert!(portal.details().is_none());
    }

    #[test]
    fn export_requires_results() {
        let now = Instant::now();
        let mut portal = Portal::new();
        assert!(portal.dispatch(Command::Export, now).is_empty());
        assert_eq!(portal.error(), Some(&PortalError::NothingToExport));

        let mut portal = searched(asha(), now);
        let effects = portal.dispatch(Command::Export, now);
        assert_eq!(
            effects,
            vec![Effect::Export(
                "Name,Contact,Email\nAsha Roy,017123,a@x.com".into()
            )]
        );
    }

    #[test]
    fn clear_resets_query_and_results() {
        let now = Instant::now();
        let mut portal = searched(asha(), now);
        portal.dispatch(Command::Clear, now);
        assert!(portal.query().is_empty());
        assert!(portal.results().is_empty());
        assert!(!portal.has_searched());
        assert_eq!(portal.view(), View::NoResults);
    }

    #[test]
    fn language_toggles() {
        let mut portal = Portal::new();
        assert_eq!(portal.language().toggle_label(), "বাংলা");
        portal.dispatch(Command::ToggleLanguage, Instant::now());
        assert_eq!(portal.language(), Language::Bn);
        assert_eq!(portal.language().toggle_label(), "English");
    }

    #[test]
    fn debouncer_fires_once() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        assert!(!debouncer.fire(t0));
        debouncer.touch(t0);
        assert_eq!(debouncer.remaining(t0), Some(Duration::from_millis(300)));
        assert!(debouncer.fire(t0 + Duration::from_millis(300)));
        assert!(!debouncer.fire(t0 + Duration::from_millis(600)));
    }
}
