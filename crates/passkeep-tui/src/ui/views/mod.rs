//! Per-view content rendering.

pub mod dashboard;
pub mod sign_in;
pub mod sign_up;

use ratatui::text::{Line, Span};

use super::styles;

/// Width of the editable region shown inside form field brackets
pub(crate) const FIELD_WIDTH: usize = 24;

/// Box-drawing logo shared by the auth views and overlays
pub(crate) const LOGO: [&str; 3] = [
    "╔═╗╔═╗╔═╗╔═╗╦╔═╔═╗╔═╗╔═╗",
    "╠═╝╠═╣╚═╗╚═╗╠╩╗║╣ ║╣ ╠═╝",
    "╩  ╩ ╩╚═╝╚═╝╩ ╩╚═╝╚═╝╩  ",
];

/// Logo lines indented by `indent` spaces
pub(crate) fn logo_lines(indent: usize) -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| {
            Line::from(Span::styled(
                format!("{}{}", " ".repeat(indent), row),
                styles::title_style(),
            ))
        })
        .collect()
}

/// One labelled form field: `Label: [value▌   ]`.
/// The visible tail of the value is shown when it overflows the field.
pub(crate) fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let value_style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    let visible: String = if value.chars().count() > FIELD_WIDTH {
        let skip = value.chars().count() - FIELD_WIDTH;
        value.chars().skip(skip).collect()
    } else {
        value.to_string()
    };
    let display = format!("{:<width$}", visible, width = FIELD_WIDTH);
    let cursor = if focused { "▌" } else { "" };

    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<10}[", label), styles::muted_style()),
        Span::styled(format!("{}{}", display, cursor), value_style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// A submit button line, marked when focused
pub(crate) fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    Line::from(vec![
        Span::raw("          ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

/// A link line for switching between the auth views
pub(crate) fn link_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("→ {}", label), style),
    ])
}

/// Validation messages, uppercased, one per line.
/// Each is dismissed individually with Delete; none auto-expire.
pub(crate) fn message_lines(messages: &[String]) -> Vec<Line<'static>> {
    messages
        .iter()
        .map(|m| {
            Line::from(Span::styled(
                format!("  {}", m.to_uppercase()),
                styles::error_style(),
            ))
        })
        .collect()
}
