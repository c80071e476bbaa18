//! Core types for the level selector

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Plugin name, also used as the root CSS class of the rendered menu
pub const PLUGIN_NAME: &str = "level_selector";

/// Oldest host player version the plugin is known to work with
pub const MIN_HOST_VERSION: &str = "0.4.0";

/// First host player version the plugin no longer targets
pub const MAX_HOST_VERSION: &str = "0.5.0";

/// Playback wire value meaning "let the engine choose"
pub const AUTO_LEVEL: i32 = -1;

/// Unique identifier for a controller instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerId(pub Uuid);

impl ControllerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ControllerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ControllerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A selectable quality rendition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Level identifier as reported by playback
    pub id: i32,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Bandwidth in bits per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
    /// Video height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Level {
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            bitrate: None,
            height: None,
        }
    }

    pub fn with_bitrate(mut self, bitrate: u64) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Returns quality tier name derived from height
    pub fn quality_name(&self) -> Option<&'static str> {
        self.height.map(|height| match height {
            0..=240 => "240p",
            241..=360 => "360p",
            361..=480 => "480p",
            481..=720 => "720p",
            721..=1080 => "1080p",
            1081..=1440 => "1440p",
            _ => "4K",
        })
    }
}

/// Find a level by id
pub fn find_level(levels: &[Level], id: i32) -> Option<&Level> {
    levels.iter().find(|level| level.id == id)
}

/// User intent: automatic adaptive selection or a pinned level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Auto,
    Level(i32),
}

impl Selection {
    /// Convert from the playback index, where `-1` means automatic
    pub fn from_index(index: i32) -> Self {
        if index == AUTO_LEVEL {
            Selection::Auto
        } else {
            Selection::Level(index)
        }
    }

    /// Playback index for this selection
    pub fn to_index(self) -> i32 {
        match self {
            Selection::Auto => AUTO_LEVEL,
            Selection::Level(id) => id,
        }
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Selection::Auto)
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Auto => write!(f, "AUTO"),
            Selection::Level(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_index_mapping() {
        assert_eq!(Selection::from_index(-1), Selection::Auto);
        assert_eq!(Selection::from_index(3), Selection::Level(3));
        assert_eq!(Selection::Auto.to_index(), AUTO_LEVEL);
        assert_eq!(Selection::Level(0).to_index(), 0);
    }

    #[test]
    fn test_quality_name() {
        assert_eq!(Level::new(0, "").with_height(480).quality_name(), Some("480p"));
        assert_eq!(Level::new(1, "").with_height(1080).quality_name(), Some("1080p"));
        assert_eq!(Level::new(2, "").with_height(2160).quality_name(), Some("4K"));
        assert_eq!(Level::new(3, "").quality_name(), None);
    }

    #[test]
    fn test_level_deserialize_minimal() {
        let level: Level = serde_json::from_str(r#"{"id": 2, "label": "High"}"#).unwrap();
        assert_eq!(level, Level::new(2, "High"));
    }

    #[test]
    fn test_find_level() {
        let levels = vec![Level::new(1, "Low"), Level::new(2, "High")];
        assert_eq!(find_level(&levels, 2).map(|l| l.label.as_str()), Some("High"));
        assert!(find_level(&levels, 5).is_none());
    }
}
