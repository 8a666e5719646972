use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;
use tui_widgets::popup::PopupState;

use crate::config::{Config, Keys, UiColors};
use crate::portal::{Command, Event, Portal};
use crate::remote::Backend;
use crate::worker::Worker;

use super::draw;
use super::panes::{step, Pane};

/// Upper bound on how long the loop sleeps waiting for a key, so finished
/// network work is picked up promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const PAGE: isize = 5;

pub struct App<'a> {
    config: &'a Config,
    pub portal: Portal,
    worker: Worker,
    pub search_input: Input,
    pub focused_pane: Pane,
    pub selected_card: usize,
    pub selected_suggestion: Option<usize>,
    // Popup state for modal dialog (tui-widgets popup)
    pub modal_popup: PopupState,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, backend: Arc<dyn Backend>) -> Self {
        let worker = Worker::new(backend, config.export.dir.clone());
        let mut portal = Portal::new();
        worker.spawn_all(portal.start());
        Self {
            config,
            portal,
            worker,
            search_input: Input::default(),
            focused_pane: Pane::Search,
            selected_card: 0,
            selected_suggestion: None,
            modal_popup: PopupState::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            self.drain_events();
            self.portal.tick(Instant::now());
            draw::render(terminal, self)?;

            let timeout = self
                .portal
                .next_deadline(Instant::now())
                .map_or(POLL_INTERVAL, |deadline| deadline.min(POLL_INTERVAL));
            if event::poll(timeout)? {
                match event::read()? {
                    TermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                        if self.handle_key(key) {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn drain_events(&mut self) {
        for event in self.worker.try_events() {
            let new_results = matches!(event, Event::SearchFinished { outcome: Ok(_), .. });
            let effects = self.portal.apply(event, Instant::now());
            self.worker.spawn_all(effects);
            if new_results {
                self.selected_card = 0;
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> bool {
        let effects = self.portal.dispatch(command, Instant::now());
        let spawned = !effects.is_empty();
        self.worker.spawn_all(effects);
        spawned
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return true;
        }

        if self.portal.error().is_some() {
            let modal = &self.config.keys.modal;
            if self.key_matches_any(&key, &modal.cancel) || self.key_matches_any(&key, &modal.confirm) {
                self.dispatch(Command::DismissError);
            }
            return false;
        }

        if self.portal.details_index().is_some() {
            let modal = &self.config.keys.modal;
            if self.key_matches_any(&key, &modal.cancel) || self.key_matches_any(&key, &modal.confirm) {
                self.dispatch(Command::CloseDetails);
            }
            return false;
        }

        match self.focused_pane {
            Pane::Search => {
                self.handle_search_key(key);
                false
            }
            Pane::Results => self.handle_results_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let input_keys = &self.config.keys.search_input;

        // Cancel: close suggestions first, then leave the query box
        if self.key_matches_any(&key, &input_keys.cancel) {
            if self.portal.suggestions().is_empty() {
                self.focused_pane = Pane::Results;
            } else {
                self.selected_suggestion = None;
                self.dispatch(Command::HideSuggestions);
            }
            return;
        }

        if self.key_matches_any(&key, &input_keys.confirm) {
            let command = match self.selected_suggestion.take() {
                Some(index) => Command::SelectSuggestion(index),
                None => Command::Submit,
            };
            if self.dispatch(command) {
                self.search_input = Input::new(self.portal.query().to_string());
                self.focused_pane = Pane::Results;
            }
            return;
        }

        let suggestions = self.portal.suggestions().len();
        if self.key_matches_any(&key, &input_keys.next) {
            if suggestions > 0 {
                self.selected_suggestion = Some(
                    self.selected_suggestion
                        .map_or(0, |index| step(index, 1, suggestions)),
                );
            }
            return;
        }
        if self.key_matches_any(&key, &input_keys.prev) {
            self.selected_suggestion = match self.selected_suggestion {
                Some(0) | None => None,
                Some(index) => Some(step(index, -1, suggestions)),
            };
            return;
        }

        // Pass other keys to the input widget
        if let Some(change) = self.search_input.handle_event(&TermEvent::Key(key)) {
            if change.value {
                self.selected_suggestion = None;
                self.dispatch(Command::Input(self.search_input.value().to_string()));
            }
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> bool {
        let results_keys = &self.config.keys.results;
        let global_keys = &self.config.keys.global;

        if self.key_matches_any(&key, &global_keys.quit) {
            return true;
        }
        if self.key_matches_any(&key, &global_keys.search) {
            self.focused_pane = Pane::Search;
            return false;
        }
        if self.key_matches_any(&key, &global_keys.language) {
            self.dispatch(Command::ToggleLanguage);
            return false;
        }

        let count = self.portal.results().len();
        let delta = if self.key_matches_any(&key, &results_keys.next) {
            Some(1)
        } else if self.key_matches_any(&key, &results_keys.prev) {
            Some(-1)
        } else if self.key_matches_any(&key, &results_keys.page_down) {
            Some(PAGE)
        } else if self.key_matches_any(&key, &results_keys.page_up) {
            Some(-PAGE)
        } else {
            None
        };
        if let Some(delta) = delta {
            self.selected_card = step(self.selected_card, delta, count);
            return false;
        }

        let selected = self.selected_card;
        let status = self.portal.card_status(selected);
        if self.key_matches_any(&key, &results_keys.details) {
            self.modal_popup = PopupState::default();
            self.dispatch(Command::ShowDetails(selected));
        } else if self.key_matches_any(&key, &results_keys.mark) {
            if status.can_mark() {
                self.dispatch(Command::MarkContacted(selected));
            }
        } else if self.key_matches_any(&key, &results_keys.reset) {
            if status.can_reset() {
                self.dispatch(Command::Reset(selected));
            }
        } else if self.key_matches_any(&key, &results_keys.export) {
            self.dispatch(Command::Export);
        } else if self.key_matches_any(&key, &results_keys.clear) {
            self.dispatch(Command::Clear);
            self.search_input.reset();
            self.selected_card = 0;
            self.focused_pane = Pane::Search;
        }
        false
    }

    pub fn keys(&self) -> &Keys {
        &self.config.keys
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    pub fn base_url(&self) -> &str {
        &self.config.server.base_url
    }

    fn key_matches_any(&self, event: &KeyEvent, bindings: &[String]) -> bool {
        bindings.iter().any(|b| key_matches_single(event, b))
    }
}

/// Key code named by a binding string, `None` for names we do not know.
fn parse_binding(binding: &str) -> Option<KeyCode> {
    let binding = binding.trim();
    let mut chars = binding.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // case matters: `L` is Shift+l
        return Some(KeyCode::Char(c));
    }

    let name = binding.to_ascii_lowercase();
    let code = match name.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" | "shift+tab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "pageup" | "page_up" => KeyCode::PageUp,
        "pagedown" | "page_down" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => KeyCode::F(name.strip_prefix('f')?.parse().ok()?),
    };
    Some(code)
}

/// Modified keys (Ctrl, Alt, Super) never match; Shift is implied by the
/// character itself.
fn key_matches_single(event: &KeyEvent, binding: &str) -> bool {
    let modified = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
    if event.modifiers.intersects(modified) {
        return false;
    }
    parse_binding(binding) == Some(event.code)
}
