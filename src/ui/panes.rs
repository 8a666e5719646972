use crate::config::Keys;

/// Pane that receives key input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pane {
    /// Query box with its suggestion list
    #[default]
    Search,
    /// Result cards
    Results,
}

impl Pane {
    pub fn title(self) -> &'static str {
        match self {
            Pane::Search => "SEARCH",
            Pane::Results => "RESULTS",
        }
    }

    /// Footer hint built from the configured bindings.
    pub fn help(self, keys: &Keys) -> String {
        match self {
            Pane::Search => {
                let input = &keys.search_input;
                format!(
                    "Type to search  {}: search  {}: suggestions  {}: results",
                    first(&input.confirm),
                    first(&input.next),
                    first(&input.cancel)
                )
            }
            Pane::Results => {
                let results = &keys.results;
                let global = &keys.global;
                [
                    (format!("{}/{}", first(&results.next), first(&results.prev)), "nav"),
                    (first(&results.details).to_string(), "details"),
                    (first(&results.mark).to_string(), "mark"),
                    (first(&results.reset).to_string(), "reset"),
                    (first(&results.export).to_string(), "export"),
                    (first(&results.clear).to_string(), "clear"),
                    (first(&global.search).to_string(), "search"),
                    (first(&global.language).to_string(), "language"),
                    (first(&global.quit).to_string(), "quit"),
                ]
                .iter()
                .map(|(key, action)| format!("{key}: {action}"))
                .collect::<Vec<_>>()
                .join("  ")
            }
        }
    }
}

/// Hint shown in the details and error popups.
pub fn modal_help(keys: &Keys) -> String {
    format!("{}/{}: close", first(&keys.modal.confirm), first(&keys.modal.cancel))
}

/// First binding of an action; an action bound to nothing shows as `-`.
fn first(bindings: &[String]) -> &str {
    bindings.first().map_or("-", String::as_str)
}

/// Move a selection index by `delta`, clamped to `0..len`.
pub fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let current = current.min(len - 1);
    if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta.unsigned_abs()).min(len - 1)
    }
}
