use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, FieldFocus};
use crate::route::View;
use crate::utils::{mask_password, truncate_string};

use super::styles;
use super::views::{self, dashboard, sign_in, sign_up};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::CreatingEntry) {
        render_create_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingDelete) {
        render_delete_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  Passkeep";
    let help_hint = "[?] Help  ";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + help_hint.len()),
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::SignIn => sign_in::render(frame, app, area),
        View::SignUp => sign_up::render(frame, app, area),
        View::Dashboard => dashboard::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.view {
        View::Dashboard => {
            dashboard_status(app.username.as_deref().unwrap_or_default(), app.last_sync)
        }
        _ => " Signed out ".to_string(),
    };

    let shortcuts = match app.view {
        View::Dashboard => "[n]ew | [e]dit | [d]elete | [r]eload | [o] sign out | [q]uit",
        _ => "[Tab] next field | [Enter] submit",
    };
    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = views::logo_lines(12);
    help_text.extend(vec![
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  Tab/↑/↓   ", styles::help_key_style()),
            Span::styled("Move between fields", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Advance / submit", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Del       ", styles::help_key_style()),
            Span::styled("Dismiss the oldest message", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Dashboard", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", styles::help_key_style()),
            Span::styled("Select an entry", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  n / e / d ", styles::help_key_style()),
            Span::styled("New / edit / delete entry", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  v         ", styles::help_key_style()),
            Span::styled("Reveal or hide the password", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  r         ", styles::help_key_style()),
            Span::styled("Reload entries from the vault", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  o         ", styles::help_key_style()),
            Span::styled("Sign out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_create_overlay(frame: &mut Frame, app: &App) {
    let message_rows = if app.create_messages.is_empty() {
        0
    } else {
        app.create_messages.len() as u16 + 2
    };
    let area = centered_rect_fixed(54, 9 + message_rows, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        views::field_line(
            "Name:",
            &app.create_name,
            app.create_focus == FieldFocus::Name,
        ),
        views::field_line(
            "Password:",
            &mask_password(&app.create_password, views::FIELD_WIDTH),
            app.create_focus == FieldFocus::Password,
        ),
        Line::from(""),
        views::button_line(
            if app.create_busy { "Creating..." } else { "Create" },
            app.create_focus == FieldFocus::Button,
        ),
        Line::from(""),
    ];

    if !app.create_messages.is_empty() {
        lines.extend(views::message_lines(&app.create_messages));
        lines.push(Line::from(Span::styled(
            "  Del dismisses a message",
            styles::muted_style(),
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "  Enter advances, Esc cancels",
        styles::muted_style(),
    )));

    let block = Block::default()
        .title(" New entry ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 8, frame.area());
    frame.render_widget(Clear, area);

    let name = app
        .delete_target
        .as_deref()
        .and_then(|id| app.collection.get(id))
        .map(|e| truncate_string(&e.name, 28))
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("   Delete ", styles::highlight_style()),
            Span::styled(name, styles::list_item_style()),
            Span::styled("?", styles::highlight_style()),
        ]),
        Line::from(Span::styled(
            "   This cannot be undone.",
            styles::error_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm delete ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 10, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = views::logo_lines(9);
    lines.extend(vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Left status text on the dashboard, built only from state cached in
/// `App`; the render loop must never touch the sealed session file
fn dashboard_status(username: &str, last_sync: Option<DateTime<Local>>) -> String {
    match last_sync {
        Some(at) => format!(" {} · synced {} ", username, at.format("%H:%M:%S")),
        None => format!(" {} ", username),
    }
}

/// Create a centered rectangle with fixed dimensions
pub(crate) fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
