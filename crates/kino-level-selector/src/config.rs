//! Level selector configuration
//!
//! The configuration is built once and shared read-only by the controller.
//! It can be assembled in code with the builder methods, or loaded from the
//! JSON options bag a host player passes to its plugins:
//!
//! ```json
//! {
//!   "title": "Quality",
//!   "assumeLevelChangesWillWork": false,
//!   "labels": { "0": "Low", "1": "High" },
//!   "labelCallback": "quality",
//!   "onLevelsAvailable": "highest_first"
//! }
//! ```
//!
//! Callback-shaped keys name an entry in a [`CallbackRegistry`]. A name the
//! registry does not know, or a value that is not a name at all, is kept as
//! [`CallbackSlot::NotInvocable`] and rejected when levels are ingested.

use crate::{Error, Level, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Per-level labeling function: `(level, static label if any) -> label`
pub type LabelCallback = Arc<dyn Fn(&Level, Option<&str>) -> String + Send + Sync>;

/// Level set transform applied on ingestion
pub type LevelsFilter = Arc<dyn Fn(Vec<Level>) -> Vec<Level> + Send + Sync>;

/// A configured callback option
#[derive(Clone)]
pub enum CallbackSlot<F> {
    /// Option not supplied
    Unset,
    /// Option supplied and callable
    Invocable(F),
    /// Option supplied but not callable; holds a description of the value
    NotInvocable(String),
}

impl<F> Default for CallbackSlot<F> {
    fn default() -> Self {
        CallbackSlot::Unset
    }
}

impl<F> CallbackSlot<F> {
    pub fn is_set(&self) -> bool {
        !matches!(self, CallbackSlot::Unset)
    }

    /// Resolve the slot, failing if the supplied value cannot be invoked
    pub fn resolve(&self, option: &str) -> Result<Option<&F>> {
        match self {
            CallbackSlot::Unset => Ok(None),
            CallbackSlot::Invocable(callback) => Ok(Some(callback)),
            CallbackSlot::NotInvocable(detail) => Err(Error::not_invocable(option, detail)),
        }
    }

    fn status(&self) -> String {
        match self {
            CallbackSlot::Unset => "unset".to_string(),
            CallbackSlot::Invocable(_) => "invocable".to_string(),
            CallbackSlot::NotInvocable(detail) => format!("not invocable: {detail}"),
        }
    }
}

impl<F> fmt::Debug for CallbackSlot<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status())
    }
}

/// Level selector configuration
#[derive(Debug, Clone, Default)]
pub struct LevelSelectorConfig {
    /// Update the menu as soon as the user picks a level instead of waiting
    /// for playback to confirm the switch
    pub assume_level_changes_will_work: bool,
    /// Menu title
    pub title: Option<String>,
    /// Static id -> label mapping
    pub labels: HashMap<i32, String>,
    /// Per-level labeling function
    pub label_callback: CallbackSlot<LabelCallback>,
    /// Transform applied to every ingested level set
    pub on_levels_available: CallbackSlot<LevelsFilter>,
}

impl LevelSelectorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_label(mut self, id: i32, label: impl Into<String>) -> Self {
        self.labels.insert(id, label.into());
        self
    }

    pub fn with_label_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Level, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.label_callback = CallbackSlot::Invocable(Arc::new(callback));
        self
    }

    pub fn with_levels_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(Vec<Level>) -> Vec<Level> + Send + Sync + 'static,
    {
        self.on_levels_available = CallbackSlot::Invocable(Arc::new(filter));
        self
    }

    pub fn assume_level_changes_will_work(mut self, assume: bool) -> Self {
        self.assume_level_changes_will_work = assume;
        self
    }

    /// Parse configuration from a JSON options bag
    pub fn from_json(json: &str, registry: &CallbackRegistry) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Ok(raw.resolve(registry))
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>, registry: &CallbackRegistry) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, registry)
    }

    /// Human-readable status of each callback option
    pub fn callback_status(&self) -> Vec<(&'static str, String)> {
        vec![
            ("labelCallback", self.label_callback.status()),
            ("onLevelsAvailable", self.on_levels_available.status()),
        ]
    }

    /// Check every callback option without ingesting anything
    pub fn validate(&self) -> Result<()> {
        self.label_callback.resolve("labelCallback")?;
        self.on_levels_available.resolve("onLevelsAvailable")?;
        Ok(())
    }
}

/// Options bag as it appears on the wire
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    assume_level_changes_will_work: bool,
    title: Option<String>,
    labels: HashMap<i32, String>,
    label_callback: Option<Value>,
    on_levels_available: Option<Value>,
}

impl RawConfig {
    fn resolve(self, registry: &CallbackRegistry) -> LevelSelectorConfig {
        LevelSelectorConfig {
            assume_level_changes_will_work: self.assume_level_changes_will_work,
            title: self.title,
            labels: self.labels,
            label_callback: resolve_slot(self.label_callback, &registry.label_callbacks),
            on_levels_available: resolve_slot(self.on_levels_available, &registry.level_filters),
        }
    }
}

fn resolve_slot<F: Clone>(value: Option<Value>, named: &HashMap<String, F>) -> CallbackSlot<F> {
    match value {
        None | Some(Value::Null) => CallbackSlot::Unset,
        Some(Value::String(name)) => match named.get(&name) {
            Some(callback) => CallbackSlot::Invocable(callback.clone()),
            None => CallbackSlot::NotInvocable(format!("no callback registered as '{name}'")),
        },
        Some(other) => CallbackSlot::NotInvocable(format!("found {}", json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Named callbacks that JSON configuration can refer to
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    label_callbacks: HashMap<String, LabelCallback>,
    level_filters: HashMap<String, LevelsFilter>,
}

impl CallbackRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in callbacks
    ///
    /// - `quality`: label from height (`720p`), static label or existing label otherwise
    /// - `bitrate`: label from bitrate (`2.5 Mbps`, `800 kbps`)
    /// - `highest_first`: sort levels by bitrate, highest first
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_label_callback("quality", |level: &Level, label: Option<&str>| {
            level
                .quality_name()
                .map(str::to_string)
                .or_else(|| label.map(str::to_string))
                .unwrap_or_else(|| level.label.clone())
        });
        registry.register_label_callback("bitrate", |level: &Level, label: Option<&str>| {
            match level.bitrate {
                Some(bps) => format_bitrate(bps),
                None => label.map(str::to_string).unwrap_or_else(|| level.label.clone()),
            }
        });
        registry.register_level_filter("highest_first", |mut levels: Vec<Level>| {
            levels.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));
            levels
        });
        registry
    }

    pub fn register_label_callback<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn(&Level, Option<&str>) -> String + Send + Sync + 'static,
    {
        self.label_callbacks.insert(name.into(), Arc::new(callback));
    }

    pub fn register_level_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(Vec<Level>) -> Vec<Level> + Send + Sync + 'static,
    {
        self.level_filters.insert(name.into(), Arc::new(filter));
    }

    /// Registered callback names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .label_callbacks
            .keys()
            .chain(self.level_filters.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Format a bitrate for display
pub fn format_bitrate(bps: u64) -> String {
    if bps >= 1_000_000 {
        let mbps = bps as f64 / 1_000_000.0;
        if (mbps - mbps.round()).abs() < f64::EPSILON {
            format!("{} Mbps", mbps.round() as u64)
        } else {
            format!("{:.1} Mbps", mbps)
        }
    } else {
        format!("{} kbps", bps / 1_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_full() {
        let json = r#"{
            "title": "Quality",
            "assumeLevelChangesWillWork": true,
            "labels": { "0": "Low", "1": "High" },
            "labelCallback": "quality",
            "onLevelsAvailable": "highest_first"
        }"#;
        let config = LevelSelectorConfig::from_json(json, &CallbackRegistry::with_builtins()).unwrap();

        assert_eq!(config.title.as_deref(), Some("Quality"));
        assert!(config.assume_level_changes_will_work);
        assert_eq!(config.labels.get(&1).map(String::as_str), Some("High"));
        assert!(matches!(config.label_callback, CallbackSlot::Invocable(_)));
        assert!(matches!(config.on_levels_available, CallbackSlot::Invocable(_)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_defaults() {
        let config = LevelSelectorConfig::from_json("{}", &CallbackRegistry::new()).unwrap();
        assert!(!config.assume_level_changes_will_work);
        assert!(config.title.is_none());
        assert!(!config.label_callback.is_set());
        assert!(!config.on_levels_available.is_set());
    }

    #[test]
    fn test_non_string_callback_is_not_invocable() {
        let json = r#"{ "labelCallback": 42 }"#;
        let config = LevelSelectorConfig::from_json(json, &CallbackRegistry::with_builtins()).unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("labelCallback must be a function"));
        assert!(err.to_string().contains("number"));
    }

    #[test]
    fn test_unknown_callback_name_is_not_invocable() {
        let json = r#"{ "onLevelsAvailable": "nope" }"#;
        let config = LevelSelectorConfig::from_json(json, &CallbackRegistry::with_builtins()).unwrap();

        match config.on_levels_available.resolve("onLevelsAvailable") {
            Err(Error::InvalidConfig(msg)) => assert!(msg.contains("'nope'")),
            other => panic!("unexpected: {:?}", other.map(|f| f.is_some())),
        }
    }

    #[test]
    fn test_malformed_json() {
        let err = LevelSelectorConfig::from_json("{ title: ", &CallbackRegistry::new()).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_PARSE");
    }

    #[test]
    fn test_builtin_quality_label() {
        let registry = CallbackRegistry::with_builtins();
        let callback = registry.label_callbacks.get("quality").unwrap();

        let level = Level::new(0, "lvl0").with_height(720);
        assert_eq!(callback(&level, None), "720p");
        assert_eq!(callback(&Level::new(1, "lvl1"), Some("Static")), "Static");
        assert_eq!(callback(&Level::new(2, "lvl2"), None), "lvl2");
    }

    #[test]
    fn test_builtin_highest_first() {
        let registry = CallbackRegistry::with_builtins();
        let filter = registry.level_filters.get("highest_first").unwrap();

        let levels = vec![
            Level::new(0, "a").with_bitrate(800_000),
            Level::new(1, "b").with_bitrate(3_000_000),
            Level::new(2, "c").with_bitrate(1_500_000),
        ];
        let ids: Vec<i32> = filter(levels).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_format_bitrate() {
        assert_eq!(format_bitrate(800_000), "800 kbps");
        assert_eq!(format_bitrate(2_500_000), "2.5 Mbps");
        assert_eq!(format_bitrate(3_000_000), "3 Mbps");
    }

    #[test]
    fn test_registry_names() {
        let registry = CallbackRegistry::with_builtins();
        assert_eq!(registry.names(), vec!["bitrate", "highest_first", "quality"]);
    }
}
