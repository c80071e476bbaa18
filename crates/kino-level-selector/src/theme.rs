//! Menu styling
//!
//! Colors follow the Kino palette. The stylesheet is injected by the host
//! next to the rendered menu.
//!
//! ```rust
//! use kino_level_selector::theme::SelectorTheme;
//!
//! let css = SelectorTheme::default().stylesheet();
//! assert!(css.contains(".level_selector"));
//! ```

use crate::types::PLUGIN_NAME;
use serde::{Deserialize, Serialize};

/// Colors and metrics of the level menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorTheme {
    /// Accent for the current level - #9b30ff
    pub accent: String,
    /// List background - rgba(12, 10, 18, 0.95)
    pub background: String,
    /// Entry text - #f6f2ff
    pub text: String,
    /// Hovered entry text - #d4cde9
    pub text_soft: String,
    /// Button text while a switch is pending - #f59e0b
    pub changing: String,
    /// Corner radius in pixels
    pub border_radius: u32,
}

impl Default for SelectorTheme {
    fn default() -> Self {
        Self {
            accent: "#9b30ff".to_string(),
            background: "rgba(12, 10, 18, 0.95)".to_string(),
            text: "#f6f2ff".to_string(),
            text_soft: "#d4cde9".to_string(),
            changing: "#f59e0b".to_string(),
            border_radius: 4,
        }
    }
}

impl SelectorTheme {
    /// Generate the stylesheet for the menu
    pub fn stylesheet(&self) -> String {
        format!(
            r#".{name} {{
  float: right;
  position: relative;
  height: 100%;
}}

.{name} button {{
  background-color: transparent;
  color: {text};
  font-family: system-ui, -apple-system, sans-serif;
  font-weight: bold;
  border: none;
  cursor: pointer;
  height: 100%;
}}

.{name} button:hover {{
  color: {text_soft};
}}

.{name} button.changing {{
  color: {changing};
  animation: {name}-pulse 1s infinite;
}}

.{name} > ul {{
  list-style-type: none;
  position: absolute;
  bottom: 25px;
  margin: 0;
  padding: 0;
  overflow-y: auto;
  background-color: {background};
  border: 1px solid {accent};
  border-radius: {radius}px;
}}

.{name} li {{
  font-size: 12px;
  color: {text};
}}

.{name} li[data-title] {{
  padding: 5px;
  background-color: {accent};
}}

.{name} li a {{
  color: inherit;
  display: block;
  padding: 2px 10px;
  text-decoration: none;
}}

.{name} li a:hover {{
  color: {text_soft};
}}

.{name} li.current a {{
  color: {accent};
}}

@keyframes {name}-pulse {{
  0% {{ opacity: 1; }}
  50% {{ opacity: 0.4; }}
  100% {{ opacity: 1; }}
}}
"#,
            name = PLUGIN_NAME,
            text = self.text,
            text_soft = self.text_soft,
            changing = self.changing,
            background = self.background,
            accent = self.accent,
            radius = self.border_radius,
        )
    }

    /// Serialize the theme to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_uses_theme() {
        let css = SelectorTheme::default().stylesheet();
        assert!(css.contains(".level_selector li.current a {\n  color: #9b30ff;"));
        assert!(css.contains(".level_selector button.changing"));
        assert!(css.contains("border-radius: 4px;"));
    }

    #[test]
    fn test_custom_accent() {
        let theme = SelectorTheme {
            accent: "#00ff00".to_string(),
            ..Default::default()
        };
        assert!(theme.stylesheet().contains("color: #00ff00;"));
    }

    #[test]
    fn test_theme_json() {
        let json = SelectorTheme::default().to_json();
        assert!(json.contains("border_radius"));
        assert!(json.contains("#f59e0b"));
    }
}
