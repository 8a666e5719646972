//! Result rendering: labels, value formatting and the HTML view.
//!
//! The view model (`View`, `Card`, `FieldValue`) is shared by the terminal UI
//! and the HTML output. All record text is escaped before it is placed in
//! markup, including attribute values.

use std::fmt::Write as _;

use serde_json::Value;

use crate::record::{display_string, identity, Record};
use crate::script;
use crate::status::{CardStatus, ContactStatus};

pub const NOT_AVAILABLE: &str = "Not available";
pub const EMPTY: &str = "Empty";
pub const NO_RESULTS: &str = "No results found";

/// Decorated labels for the fields the portal knows about.
const FIELD_LABELS: &[(&str, &str)] = &[
    ("Contact", "📞 Contact"),
    ("Department", "🏛️ Department"),
    ("Email", "📧 Email"),
    ("Hall Name", "🏢 Hall Name"),
    ("Name", "👤 Name"),
    ("Year", "📅 Year"),
];

/// Display label for a field name. Unknown names are split before each
/// capital letter and capitalized (`roomNumber` -> `Room Number`).
pub fn field_label(name: &str) -> String {
    if let Some((_, label)) = FIELD_LABELS.iter().find(|(field, _)| *field == name) {
        return (*label).to_string();
    }

    let mut spaced = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    let mut chars = spaced.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    capitalized.trim().to_string()
}

/// A formatted field value. Variants are listed in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    NotAvailable,
    Empty,
    MailLink(String),
    PhoneLink(String),
    Bengali(String),
    Plain(String),
}

impl FieldValue {
    /// Text shown to the user, unescaped.
    pub fn text(&self) -> &str {
        match self {
            FieldValue::NotAvailable => NOT_AVAILABLE,
            FieldValue::Empty => EMPTY,
            FieldValue::MailLink(text)
            | FieldValue::PhoneLink(text)
            | FieldValue::Bengali(text)
            | FieldValue::Plain(text) => text,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            FieldValue::NotAvailable | FieldValue::Empty => {
                format!(r#"<span class="text-muted">{}</span>"#, self.text())
            }
            FieldValue::MailLink(text) => {
                let escaped = escape_html(text);
                format!(r#"<a href="mailto:{escaped}" class="text-primary">{escaped}</a>"#)
            }
            FieldValue::PhoneLink(text) => {
                let escaped = escape_html(text);
                format!(r#"<a href="tel:{escaped}" class="text-success">{escaped}</a>"#)
            }
            FieldValue::Bengali(text) => {
                format!(
                    r#"<span class="bengali-text" lang="bn">{}</span>"#,
                    escape_html(text)
                )
            }
            FieldValue::Plain(text) => escape_html(text),
        }
    }
}

/// Format a raw field value. `value` is `None` when the record lacks the field.
pub fn format_value(field: &str, value: Option<&Value>) -> FieldValue {
    let Some(text) = value.and_then(display_string) else {
        return FieldValue::NotAvailable;
    };

    if matches!(value, Some(Value::String(_))) && text.trim().is_empty() {
        return FieldValue::Empty;
    }
    if field == "Email" && text.contains('@') {
        return FieldValue::MailLink(text);
    }
    if field == "Contact" && is_phone_number(&text) {
        return FieldValue::PhoneLink(text);
    }
    if script::contains_bengali(&text) {
        return FieldValue::Bengali(text);
    }
    FieldValue::Plain(text)
}

/// All ASCII digits once whitespace is removed, and at least one digit.
fn is_phone_number(text: &str) -> bool {
    let mut digits = text.chars().filter(|c| !c.is_whitespace()).peekable();
    digits.peek().is_some() && digits.all(|c| c.is_ascii_digit())
}

/// Escape text for insertion into HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedField {
    pub name: String,
    pub label: String,
    pub value: FieldValue,
}

impl RenderedField {
    fn new(name: &str, value: Option<&Value>) -> Self {
        Self {
            name: name.to_string(),
            label: field_label(name),
            value: format_value(name, value),
        }
    }
}

/// One result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Position in the result set.
    pub index: usize,
    pub heading: String,
    pub identity: String,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    NoResults,
    Cards {
        title: String,
        columns: Vec<String>,
        cards: Vec<Card>,
    },
}

/// Column names of a result set: the first record's fields only.
pub fn columns(results: &[Record]) -> Vec<String> {
    results
        .first()
        .map(|first| first.field_names().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Build the result view. Columns come from the first record; fields other
/// records lack render as "not available", extra fields are not shown.
pub fn render(results: &[Record], query: &str) -> View {
    if results.is_empty() {
        return View::NoResults;
    }

    let columns = columns(results);
    let cards = results
        .iter()
        .enumerate()
        .map(|(index, record)| Card {
            index,
            heading: format!("Record {}", index + 1),
            identity: identity(record),
            fields: columns
                .iter()
                .map(|column| RenderedField::new(column, record.get(column)))
                .collect(),
        })
        .collect();

    View::Cards {
        title: format!("Search Results for \"{}\" ({} found)", query, results.len()),
        columns,
        cards,
    }
}

/// Every field of one record, for the detail view.
pub fn details(record: &Record) -> Vec<RenderedField> {
    record
        .fields()
        .map(|(name, value)| RenderedField::new(name, Some(value)))
        .collect()
}

impl View {
    pub fn cards(&self) -> &[Card] {
        match self {
            View::NoResults => &[],
            View::Cards { cards, .. } => cards,
        }
    }

    /// Render as an HTML fragment. `statuses[i]` is the status badge of card
    /// `i`; missing entries show as loading.
    pub fn to_html(&self, statuses: &[CardStatus]) -> String {
        let (title, cards) = match self {
            View::NoResults => {
                return format!(r#"<div id="noResults" class="no-results">{NO_RESULTS}</div>"#);
            }
            View::Cards { title, cards, .. } => (title, cards),
        };

        let mut html = String::new();
        let _ = writeln!(html, r#"<h4 id="resultsTitle">{}</h4>"#, escape_html(title));
        html.push_str("<div id=\"resultsContent\">\n");
        for card in cards {
            let status = statuses.get(card.index).copied().unwrap_or_default();
            card_html(&mut html, card, status);
        }
        html.push_str("</div>\n");
        html
    }
}

fn card_html(html: &mut String, card: &Card, status: CardStatus) {
    let _ = writeln!(
        html,
        r#"<div class="result-card" id="card-{}" data-record-id="{}">"#,
        card.index,
        escape_html(&card.identity)
    );
    let _ = writeln!(
        html,
        r#"  <div class="card-header"><h5>{}</h5></div>"#,
        escape_html(&card.heading)
    );
    html.push_str("  <div class=\"card-body\">\n");
    for field in &card.fields {
        let _ = writeln!(html, "{}", field_html(field));
    }

    let badge_class = match status {
        CardStatus::Known(ContactStatus::Contacted) => "badge bg-success",
        CardStatus::Known(_) => "badge bg-secondary",
        CardStatus::Loading => "",
    };
    let _ = writeln!(
        html,
        r#"    <div class="contact-tracking">Contact Status: <span id="status-{}" class="status-badge {}">{}</span></div>"#,
        card.index,
        badge_class,
        status.badge()
    );
    html.push_str("  </div>\n</div>\n");
}

fn field_html(field: &RenderedField) -> String {
    format!(
        r#"    <div class="field-item"><span class="field-label">{}:</span> <span class="field-value">{}</span></div>"#,
        escape_html(&field.label),
        field.value.to_html()
    )
}
