//! Render model of the level menu and its HTML rendering

use crate::{types::PLUGIN_NAME, Selection, AUTO_LEVEL};
use serde::Serialize;
use std::fmt::Write;

/// Label of the automatic entry and prefix of the button text in AUTO mode
pub const AUTO_LABEL: &str = "AUTO";

/// Share of the host content height the level list may occupy
pub const MAX_HEIGHT_RATIO: f64 = 0.8;

/// Attribute carrying the level id on each selectable entry
pub const SELECT_ATTRIBUTE: &str = "data-level-selector-select";

/// Attribute marking the menu trigger button
pub const BUTTON_ATTRIBUTE: &str = "data-level-selector-button";

/// One selectable entry in the menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    /// Playback index of the entry, `-1` for AUTO
    pub id: i32,
    pub label: String,
    /// Entry is the level playback reports as in effect
    pub current: bool,
    /// Entry is the user's selection
    pub selected: bool,
}

/// Everything a view layer needs to draw the menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub title: Option<String>,
    /// Text of the trigger button
    pub button_text: String,
    /// A level switch is pending
    pub changing: bool,
    /// Level list is expanded
    pub open: bool,
    /// Maximum height of the level list in pixels
    pub max_height: f64,
    /// AUTO first, then every level in order
    pub entries: Vec<MenuEntry>,
}

impl MenuView {
    /// Entry for a playback index
    pub fn entry(&self, id: i32) -> Option<&MenuEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entry marked as current, if any
    pub fn current_entry(&self) -> Option<&MenuEntry> {
        self.entries.iter().find(|entry| entry.current)
    }
}

/// Parse the id carried by a clicked entry
pub fn parse_select_target(raw: &str) -> Option<Selection> {
    raw.trim().parse::<i32>().ok().map(Selection::from_index)
}

/// Render the menu markup
pub fn to_html(view: &MenuView) -> String {
    let mut html = String::new();

    let _ = write!(html, r#"<div class="{PLUGIN_NAME}" data-level-selector="">"#);
    let _ = write!(
        html,
        r#"<button {BUTTON_ATTRIBUTE}=""{}>{}</button>"#,
        if view.changing { r#" class="changing""# } else { "" },
        escape(&view.button_text)
    );

    let display = if view.open { "block" } else { "none" };
    let _ = write!(
        html,
        r#"<ul style="max-height: {}px; display: {display};">"#,
        view.max_height.floor()
    );
    if let Some(title) = &view.title {
        let _ = write!(html, "<li data-title>{}</li>", escape(title));
    }
    for entry in &view.entries {
        let mut classes = Vec::new();
        if entry.current {
            classes.push("current");
        }
        if entry.selected {
            classes.push("selected");
        }
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };
        let _ = write!(
            html,
            r##"<li{class_attr}><a href="#" {SELECT_ATTRIBUTE}="{}">{}</a></li>"##,
            entry.id,
            escape(&entry.label)
        );
    }
    html.push_str("</ul></div>");
    html
}

fn escape(text: &str) -> String {
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

/// AUTO entry for a view
pub(crate) fn auto_entry(selected: bool) -> MenuEntry {
    MenuEntry {
        id: AUTO_LEVEL,
        label: AUTO_LABEL.to_string(),
        current: false,
        selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> MenuView {
        MenuView {
            title: Some("Quality".to_string()),
            button_text: "AUTO (High)".to_string(),
            changing: false,
            open: false,
            max_height: 288.0,
            entries: vec![
                auto_entry(true),
                MenuEntry { id: 1, label: "Low".into(), current: false, selected: false },
                MenuEntry { id: 2, label: "High".into(), current: true, selected: false },
            ],
        }
    }

    #[test]
    fn test_parse_select_target() {
        assert_eq!(parse_select_target("2"), Some(Selection::Level(2)));
        assert_eq!(parse_select_target(" -1 "), Some(Selection::Auto));
        assert_eq!(parse_select_target("abc"), None);
        assert_eq!(parse_select_target(""), None);
    }

    #[test]
    fn test_html_contains_entries() {
        let html = to_html(&sample_view());
        assert!(html.starts_with(r#"<div class="level_selector""#));
        assert!(html.contains(r#"<button data-level-selector-button="">AUTO (High)</button>"#));
        assert!(html.contains(r#"<li data-title>Quality</li>"#));
        assert!(html.contains(r##"<li class="current"><a href="#" data-level-selector-select="2">High</a></li>"##));
        assert!(html.contains(r##"<li><a href="#" data-level-selector-select="1">Low</a></li>"##));
        assert!(html.contains("max-height: 288px; display: none;"));
    }

    #[test]
    fn test_html_changing_and_open() {
        let mut view = sample_view();
        view.changing = true;
        view.open = true;
        let html = to_html(&view);
        assert!(html.contains(r#"<button data-level-selector-button="" class="changing">"#));
        assert!(html.contains("display: block;"));
    }

    #[test]
    fn test_html_escapes_labels() {
        let mut view = sample_view();
        view.entries[1].label = "<b>Low & \"cheap\"</b>".to_string();
        let html = to_html(&view);
        assert!(html.contains("&lt;b&gt;Low &amp; &quot;cheap&quot;&lt;/b&gt;"));
    }

    #[test]
    fn test_current_entry() {
        let view = sample_view();
        assert_eq!(view.current_entry().map(|e| e.id), Some(2));
        assert_eq!(view.entry(-1).map(|e| e.label.as_str()), Some("AUTO"));
    }
}
