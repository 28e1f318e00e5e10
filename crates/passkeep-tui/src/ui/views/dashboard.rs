//! Dashboard view: the entries list and the detail/edit panel.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, FieldFocus, PendingOp};
use crate::ui::styles;
use crate::utils::{mask_password, truncate_string};

use super::{field_line, message_lines, FIELD_WIDTH};

/// Widest entry name shown in the list column
const LIST_NAME_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_entry_list(frame, app, columns[0]);
    render_detail(frame, app, columns[1]);
}

fn render_entry_list(frame: &mut Frame, app: &App, area: Rect) {
    // Dashboard-level messages take rows at the bottom of the column
    let message_rows = if app.dash_messages.is_empty() {
        0
    } else {
        app.dash_messages.len() as u16 + 1
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(message_rows)])
        .split(area);

    let title = format!(" Entries ({}) ", app.collection.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.edit.is_none()));

    if app.loading {
        let paragraph =
            Paragraph::new(Line::from(Span::styled(" Loading...", styles::muted_style())))
                .block(block);
        frame.render_widget(paragraph, rows[0]);
    } else if app.collection.is_empty() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            " No entries yet - press [n] to add one",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, rows[0]);
    } else {
        let items: Vec<ListItem> = app
            .collection
            .entries()
            .iter()
            .map(|entry| {
                let name = truncate_string(&entry.name, LIST_NAME_WIDTH);
                let marker = match app.pending_for(&entry.id) {
                    Some(PendingOp::Saving) => " saving...",
                    Some(PendingOp::Deleting) => " deleting...",
                    None => "",
                };
                let mut spans = vec![Span::styled(
                    format!(" {:<width$}", name, width = LIST_NAME_WIDTH),
                    styles::list_item_style(),
                )];
                if !marker.is_empty() {
                    spans.push(Span::styled(marker, styles::highlight_style()));
                } else if app.entry_messages.contains_key(&entry.id) {
                    spans.push(Span::styled(" !", styles::error_style()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(styles::selected_style());
        let mut state = ListState::default();
        state.select(Some(app.selection));
        frame.render_stateful_widget(list, rows[0], &mut state);
    }

    if !app.dash_messages.is_empty() {
        let mut lines = message_lines(&app.dash_messages);
        lines.push(Line::from(Span::styled(
            "  Del dismisses a message",
            styles::muted_style(),
        )));
        frame.render_widget(Paragraph::new(lines), rows[1]);
    }
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    // An in-progress edit owns the panel until it is saved or cancelled
    if let Some(ref draft) = app.edit {
        render_edit_form(frame, app, area, draft);
        return;
    }

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let entry = match app.selected_entry() {
        Some(entry) => entry,
        None => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                " Nothing selected",
                styles::muted_style(),
            )))
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let password_display = if app.revealed.contains(&entry.id) {
        entry.password.clone()
    } else {
        mask_password(&entry.password, FIELD_WIDTH)
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Name:     ", styles::muted_style()),
            Span::styled(entry.name.clone(), styles::list_item_style()),
        ]),
        Line::from(vec![
            Span::styled("  Password: ", styles::muted_style()),
            Span::styled(password_display, styles::list_item_style()),
            Span::styled(
                if app.revealed.contains(&entry.id) {
                    "  [v] hide"
                } else {
                    "  [v] reveal"
                },
                styles::muted_style(),
            ),
        ]),
    ];

    match app.pending_for(&entry.id) {
        Some(PendingOp::Saving) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Saving...",
                styles::highlight_style(),
            )));
        }
        Some(PendingOp::Deleting) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  Deleting...",
                styles::highlight_style(),
            )));
        }
        None => {}
    }

    if let Some(messages) = app.entry_messages.get(&entry.id) {
        lines.push(Line::from(""));
        lines.extend(message_lines(messages));
        lines.push(Line::from(Span::styled(
            "  Del dismisses a message",
            styles::muted_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [e] edit   [d] delete   [n] new   [r] reload",
        styles::muted_style(),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_edit_form(frame: &mut Frame, app: &App, area: Rect, draft: &crate::app::EditDraft) {
    let block = Block::default()
        .title(" Edit entry ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let saving = matches!(app.pending_for(&draft.id), Some(PendingOp::Saving));

    let mut lines = vec![
        Line::from(""),
        field_line("Name:", &draft.name, draft.focus == FieldFocus::Name),
        field_line(
            "Password:",
            &draft.password,
            draft.focus == FieldFocus::Password,
        ),
        Line::from(""),
        super::button_line(
            if saving { "Saving..." } else { "Save" },
            draft.focus == FieldFocus::Button,
        ),
    ];

    if let Some(messages) = app.entry_messages.get(&draft.id) {
        lines.push(Line::from(""));
        lines.extend(message_lines(messages));
        lines.push(Line::from(Span::styled(
            "  Del dismisses a message",
            styles::muted_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Enter advances, Esc cancels the edit",
        styles::muted_style(),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
