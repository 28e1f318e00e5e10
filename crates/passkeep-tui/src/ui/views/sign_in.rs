use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, SignInFocus};
use crate::route::Notice;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::mask_password;

use super::{button_line, field_line, link_line, logo_lines, message_lines, FIELD_WIDTH};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let message_rows = if app.signin_messages.is_empty() {
        0
    } else {
        app.signin_messages.len() as u16 + 2
    };
    let box_area = centered_rect_fixed(54, 11 + notice_height(app) + message_rows, area);
    frame.render_widget(Clear, box_area);

    let mut lines = logo_lines(13);
    lines.push(Line::from(""));

    match app.notice {
        Some(Notice::SessionExpired) => {
            lines.push(Line::from(Span::styled(
                "  Your session expired - sign in again",
                styles::error_style(),
            )));
            lines.push(Line::from(""));
        }
        Some(Notice::Registered { ref email }) => {
            lines.push(Line::from(Span::styled(
                format!("  Registered {} - sign in to continue", email),
                styles::success_style(),
            )));
            lines.push(Line::from(""));
        }
        None => {}
    }

    lines.push(field_line(
        "Email:",
        &app.signin_email,
        app.signin_focus == SignInFocus::Email,
    ));
    lines.push(field_line(
        "Password:",
        &mask_password(&app.signin_password, FIELD_WIDTH),
        app.signin_focus == SignInFocus::Password,
    ));
    lines.push(Line::from(""));

    let button_label = if app.signin_busy {
        "Signing in..."
    } else {
        "Sign in"
    };
    lines.push(button_line(
        button_label,
        app.signin_focus == SignInFocus::Button,
    ));
    lines.push(Line::from(""));
    lines.push(link_line(
        "Create an account",
        app.signin_focus == SignInFocus::Link,
    ));

    if !app.signin_messages.is_empty() {
        lines.push(Line::from(""));
        lines.extend(message_lines(&app.signin_messages));
        lines.push(Line::from(Span::styled(
            "  Del dismisses a message",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Sign in ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

fn notice_height(app: &App) -> u16 {
    if app.notice.is_some() {
        2
    } else {
        0
    }
}
