use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, SignUpFocus};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::mask_password;

use super::{button_line, field_line, link_line, logo_lines, message_lines, FIELD_WIDTH};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let message_rows = if app.signup_messages.is_empty() {
        0
    } else {
        app.signup_messages.len() as u16 + 2
    };
    let box_area = centered_rect_fixed(54, 12 + message_rows, area);
    frame.render_widget(Clear, box_area);

    let mut lines = logo_lines(13);
    lines.push(Line::from(""));

    lines.push(field_line(
        "Email:",
        &app.signup_email,
        app.signup_focus == SignUpFocus::Email,
    ));
    lines.push(field_line(
        "Username:",
        &app.signup_username,
        app.signup_focus == SignUpFocus::Username,
    ));
    lines.push(field_line(
        "Password:",
        &mask_password(&app.signup_password, FIELD_WIDTH),
        app.signup_focus == SignUpFocus::Password,
    ));
    lines.push(Line::from(""));

    let button_label = if app.signup_busy {
        "Signing up..."
    } else {
        "Sign up"
    };
    lines.push(button_line(
        button_label,
        app.signup_focus == SignUpFocus::Button,
    ));
    lines.push(Line::from(""));
    lines.push(link_line(
        "Back to sign in",
        app.signup_focus == SignUpFocus::Link,
    ));

    if !app.signup_messages.is_empty() {
        lines.push(Line::from(""));
        lines.extend(message_lines(&app.signup_messages));
        lines.push(Line::from(Span::styled(
            "  Del dismisses a message",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Sign up ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}
