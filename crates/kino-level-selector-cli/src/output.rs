//! Output formatting for CLI

use console::style;
use kino_level_selector::{view::to_html, MenuView};
use serde::Serialize;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "html" => OutputFormat::Html,
            _ => OutputFormat::Text,
        }
    }
}

/// Serialize any report as pretty JSON
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// Format a menu view
pub fn format_view(view: Option<&MenuView>, format: OutputFormat) -> String {
    match (view, format) {
        (view, OutputFormat::Json) => to_json(&view),
        (Some(view), OutputFormat::Html) => to_html(view),
        (None, OutputFormat::Html) => String::new(),
        (Some(view), OutputFormat::Text) => text_view(view),
        (None, OutputFormat::Text) => format!("  {}", style("(no menu)").dim()),
    }
}

fn text_view(view: &MenuView) -> String {
    let mut lines = Vec::new();

    let button = if view.changing {
        format!("[{}] {}", view.button_text, style("changing").yellow())
    } else {
        format!("[{}]", view.button_text)
    };
    lines.push(format!(
        "  {} {}",
        style(button).bold(),
        if view.open { "▾" } else { "▸" }
    ));

    if !view.open {
        if let Some(entry) = view.current_entry() {
            lines.push(format!("    {} {}", style("playing").dim(), entry.label));
        }
    }

    if view.open {
        if let Some(title) = &view.title {
            lines.push(format!("    {}", style(title).underlined()));
        }
        for entry in &view.entries {
            let marker = match (entry.current, entry.selected) {
                (true, true) => "●*",
                (true, false) => "● ",
                (false, true) => " *",
                (false, false) => "  ",
            };
            let label = if entry.current {
                style(&entry.label).magenta().to_string()
            } else {
                entry.label.clone()
            };
            lines.push(format!("    {} {:>3}  {}", marker, entry.id, label));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kino_level_selector::MenuEntry;

    fn view(open: bool) -> MenuView {
        MenuView {
            title: None,
            button_text: "AUTO (High)".to_string(),
            changing: false,
            open,
            max_height: 288.0,
            entries: vec![
                MenuEntry { id: -1, label: "AUTO".into(), current: false, selected: true },
                MenuEntry { id: 2, label: "High".into(), current: true, selected: false },
            ],
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("html"), OutputFormat::Html);
        assert_eq!(OutputFormat::from("whatever"), OutputFormat::Text);
    }

    #[test]
    fn test_text_view_closed_shows_playing_level_only() {
        let text = format_view(Some(&view(false)), OutputFormat::Text);
        assert!(text.contains("AUTO (High)"));
        assert!(!text.contains("  2  "));
        assert!(text.lines().last().unwrap().ends_with("High"));
    }

    #[test]
    fn test_text_view_open_lists_entries() {
        let text = format_view(Some(&view(true)), OutputFormat::Text);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_json_view() {
        let json = format_view(Some(&view(false)), OutputFormat::Json);
        assert!(json.contains("\"button_text\": \"AUTO (High)\""));
        assert_eq!(format_view(None, OutputFormat::Json), "null");
    }
}
