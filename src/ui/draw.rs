use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::{Frame, Terminal};
use tui_widgets::popup::Popup;

use crate::config::RgbColor;
use crate::render::{Card, FieldValue, RenderedField, View, NO_RESULTS};
use crate::status::{CardStatus, ContactStatus};

use super::app::App;
use super::panes::{modal_help, Pane};


pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_body(frame, layout[1], app);
    draw_footer(frame, layout[2], app);
    draw_details_modal(frame, size, app);
    draw_error_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let toggle = format!("[{}]", app.portal.language().toggle_label());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(Span::raw(&toggle).width() as u16),
        ])
        .split(area);

    let dataset = if app.portal.dataset_loaded() {
        format!("{} records", app.portal.dataset_len())
    } else {
        "loading dataset".to_string()
    };
    let line = Line::from(vec![
        Span::styled("HALL DIRECTORY  ", header_text_style(app)),
        Span::raw(app.base_url().to_string()),
        Span::raw("  "),
        Span::styled(dataset, muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), chunks[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(toggle, selection_style(app))),
        chunks[1],
    );
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let suggestions = app.portal.suggestions().len() as u16;
    let search_height = if suggestions > 0 { 3 + suggestions + 1 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(search_height), Constraint::Min(0)])
        .split(area);

    draw_search(frame, chunks[0], app);
    draw_results(frame, chunks[1], app);
}

fn draw_search(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focused_pane == Pane::Search && app.portal.error().is_none();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(Pane::Search.title(), header_text_style(app)))
        .border_style(border_style(app, active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let label = "QUERY: ";
    let value = app.search_input.value();
    let value_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let line = Line::from(vec![
        Span::styled(label, header_text_style(app)),
        Span::styled(value.to_string(), value_style),
    ]);
    frame.render_widget(Paragraph::new(line), layout[0]);

    if active {
        let column = Span::raw(label).width() + app.search_input.visual_cursor();
        let x = layout[0].x.saturating_add(column as u16);
        frame.set_cursor_position((x, layout[0].y));
    }

    if layout[1].height > 0 && !app.portal.suggestions().is_empty() {
        draw_suggestions(frame, layout[1], app);
    }
}

fn draw_suggestions(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .portal
        .suggestions()
        .iter()
        .map(|suggestion| {
            ListItem::new(Line::from(vec![
                Span::raw(suggestion.text.clone()),
                Span::raw("  "),
                Span::styled(suggestion.field.clone(), muted_style()),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(app.selected_suggestion);

    let list = List::new(items)
        .block(Block::default().borders(Borders::TOP).border_style(separator_style(app)))
        .highlight_style(selection_style(app))
        .highlight_symbol(" ")
        .repeat_highlight_symbol(false);

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_results(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = app.focused_pane == Pane::Results;
    let view = app.portal.view();
    let title = match &view {
        _ if app.portal.is_loading() => "Searching...".to_string(),
        View::Cards { title, .. } => title.clone(),
        View::NoResults => Pane::Results.title().to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, header_text_style(app)))
        .border_style(border_style(app, active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let cards = view.cards();
    if cards.is_empty() {
        let text = if app.portal.has_searched() {
            NO_RESULTS
        } else {
            "Type a name, contact number or email and press Enter"
        };
        frame.render_widget(Paragraph::new(Span::styled(text, muted_style())), inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    let mut selected_start = 0usize;
    let mut selected_end = 0usize;
    for card in cards {
        let selected = active && card.index == app.selected_card;
        if card.index == app.selected_card {
            selected_start = lines.len();
        }
        card_lines(app, card, selected, &mut lines);
        if card.index == app.selected_card {
            selected_end = lines.len();
        }
        lines.push(Line::default());
    }

    let height = inner.height as usize;
    let offset = if selected_end > height {
        (selected_end - height).min(selected_start)
    } else {
        0
    };

    frame.render_widget(
        Paragraph::new(lines).scroll((offset.min(u16::MAX as usize) as u16, 0)),
        inner,
    );
}

fn card_lines(app: &App, card: &Card, selected: bool, lines: &mut Vec<Line<'static>>) {
    let status = app.portal.card_status(card.index);
    let heading_style = if selected {
        selection_style(app)
    } else {
        header_text_style(app).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::styled(card.heading.clone(), heading_style),
        Span::raw("  "),
        Span::styled(format!("[{}]", status.badge()), status_style(app, status)),
    ]));

    let label_width = card
        .fields
        .iter()
        .map(|field| Span::raw(field.label.as_str()).width() + 1)
        .max()
        .unwrap_or(0);
    for field in &card.fields {
        lines.push(field_line(app, field, label_width));
    }
}

fn field_line(app: &App, field: &RenderedField, label_width: usize) -> Line<'static> {
    let label = format!("{}:", field.label);
    let pad = label_width.saturating_sub(Span::raw(label.as_str()).width()) + 1;
    Line::from(vec![
        Span::raw("  "),
        Span::styled(label, header_text_style(app)),
        Span::raw(" ".repeat(pad)),
        Span::styled(field.value.text().to_string(), value_style(app, &field.value)),
    ])
}

fn value_style(app: &App, value: &FieldValue) -> Style {
    match value {
        FieldValue::NotAvailable | FieldValue::Empty => muted_style().add_modifier(Modifier::ITALIC),
        FieldValue::MailLink(_) | FieldValue::PhoneLink(_) => Style::default()
            .fg(color(app.ui_colors().link))
            .add_modifier(Modifier::UNDERLINED),
        FieldValue::Bengali(_) => Style::default().add_modifier(Modifier::BOLD),
        FieldValue::Plain(_) => Style::default(),
    }
}

fn status_style(app: &App, status: CardStatus) -> Style {
    let colors = app.ui_colors();
    match status {
        CardStatus::Loading => muted_style(),
        CardStatus::Known(ContactStatus::Contacted) => Style::default().fg(color(colors.contacted)),
        CardStatus::Known(ContactStatus::NotContacted) => {
            Style::default().fg(color(colors.not_contacted))
        }
    }
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let colors = app.ui_colors();
    let (message, style) = if let Some(notice) = app.portal.notice() {
        (
            notice.message.clone(),
            Style::default()
                .fg(color(colors.contacted))
                .bg(color(colors.status_bg)),
        )
    } else {
        let help = if app.portal.error().is_some() || app.portal.details_index().is_some() {
            modal_help(app.keys())
        } else {
            app.focused_pane.help(app.keys())
        };
        (
            help,
            Style::default()
                .fg(color(colors.status_fg))
                .bg(color(colors.status_bg)),
        )
    };

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);
    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_details_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let (Some(index), Some(fields)) = (app.portal.details_index(), app.portal.details()) else {
        return;
    };

    let label_width = fields
        .iter()
        .map(|field| Span::raw(field.label.as_str()).width() + 1)
        .max()
        .unwrap_or(0);
    let mut lines: Vec<Line> = fields
        .iter()
        .map(|field| field_line(app, field, label_width))
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(modal_help(app.keys()), muted_style())));

    let title = Line::from(Span::styled(
        format!("RECORD {} DETAILS", index + 1),
        header_text_style(app),
    ));
    let popup = Popup::new(Text::from(lines))
        .title(title)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn draw_error_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(error) = app.portal.error() else {
        return;
    };

    let lines = vec![
        Line::from(error.to_string()),
        Line::default(),
        Line::from(Span::styled(modal_help(app.keys()), muted_style())),
    ];

    let title = Line::from(Span::styled("ERROR", Style::default().fg(Color::Red)));
    let popup = Popup::new(Text::from(lines))
        .title(title)
        .border_style(Style::default().fg(Color::Red));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn border_style(app: &App, active: bool) -> Style {
    let colors = app.ui_colors();
    let style = Style::default().fg(color(colors.border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

fn header_text_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.status_fg))
}

fn separator_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default().fg(color(colors.border))
}

fn muted_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn color(rgb: RgbColor) -> Color {
    Color::Rgb(rgb.r, rgb.g, rgb.b)
}
