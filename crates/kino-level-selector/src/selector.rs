//! Selection state of the level menu
//!
//! [`SelectorState`] tracks the ingested levels, the user's selection, the
//! level playback reports as in effect and whether a switch is pending. It
//! knows nothing about event buses or hosts; the controller feeds it and
//! presents the [`MenuView`] it derives.

use crate::{
    config::LevelSelectorConfig,
    types::find_level,
    view::{auto_entry, MenuEntry, MenuView, AUTO_LABEL, MAX_HEIGHT_RATIO},
    Level, Result, Selection,
};
use tracing::debug;

/// Why a level selection produced no switch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Playback already runs the chosen level
    AlreadyCurrent,
    /// The chosen id is not in the current level set
    UnknownLevel(i32),
    /// The clicked entry did not carry an integer id
    Unparseable(String),
    /// No playback is attached
    NoPlayback,
}

/// Result of a user level selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Playback was asked to switch
    Requested(Selection),
    Ignored(IgnoreReason),
}

impl SelectOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, SelectOutcome::Ignored(_))
    }
}

/// Level selection state
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    levels: Vec<Level>,
    selected: Option<Selection>,
    active: Option<Level>,
    switching: bool,
    menu_open: bool,
}

impl SelectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingested levels, after filtering and labeling
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// User selection, `None` until levels were first ingested
    pub fn selected(&self) -> Option<Selection> {
        self.selected
    }

    /// Level playback reports as in effect
    pub fn active_level(&self) -> Option<&Level> {
        self.active.as_ref()
    }

    /// A level switch is in flight
    pub fn is_switching(&self) -> bool {
        self.switching
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Whether there is a choice to offer
    pub fn has_choices(&self) -> bool {
        self.levels.len() > 1
    }

    /// Replace the level set.
    ///
    /// The caller's slice is copied before the configured filter sees it.
    /// Callback options are checked before any state changes. Once set, the
    /// selection is only changed by [`SelectorState::select`], even when the
    /// new set lacks the selected id.
    pub fn ingest(
        &mut self,
        levels: &[Level],
        initial: Selection,
        config: &LevelSelectorConfig,
    ) -> Result<()> {
        let filter = config.on_levels_available.resolve("onLevelsAvailable")?;
        let label_callback = config.label_callback.resolve("labelCallback")?;

        if self.selected.is_none() {
            self.selected = Some(initial);
        }

        let mut levels = match filter {
            Some(filter) => filter(levels.to_vec()),
            None => levels.to_vec(),
        };

        for level in &mut levels {
            let static_label = config.labels.get(&level.id).map(String::as_str);
            if let Some(callback) = label_callback {
                let label = callback(level, static_label);
                level.label = label;
            } else if let Some(label) = static_label {
                level.label = label.to_string();
            }
        }

        self.active = self
            .active
            .as_ref()
            .and_then(|active| find_level(&levels, active.id))
            .cloned();
        self.levels = levels;
        Ok(())
    }

    /// Record a user selection unless it is a no-op.
    ///
    /// `current` is the level playback currently reports.
    pub fn select(&mut self, chosen: Selection, current: Option<Selection>) -> SelectOutcome {
        if current == Some(chosen) {
            return SelectOutcome::Ignored(IgnoreReason::AlreadyCurrent);
        }
        if let Selection::Level(id) = chosen {
            if find_level(&self.levels, id).is_none() {
                return SelectOutcome::Ignored(IgnoreReason::UnknownLevel(id));
            }
        }
        self.selected = Some(chosen);
        SelectOutcome::Requested(chosen)
    }

    /// Resolve the level playback reports as in effect.
    ///
    /// An index without a matching level clears the active level; this is
    /// expected while the level set is being replaced.
    pub fn set_active_level(&mut self, index: i32) -> Option<&Level> {
        self.active = find_level(&self.levels, index).cloned();
        if self.active.is_none() {
            debug!(level = index, "No level matches reported index");
        }
        self.active.as_ref()
    }

    pub fn set_switching(&mut self, switching: bool) {
        self.switching = switching;
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = !self.menu_open;
    }

    pub fn hide_menu(&mut self) {
        self.menu_open = false;
    }

    /// Drop everything learned from the current playback. The user's
    /// selection survives.
    pub fn reset_playback_state(&mut self) {
        self.levels.clear();
        self.active = None;
        self.switching = false;
        self.menu_open = false;
    }

    /// Text of the trigger button
    pub fn button_text(&self) -> String {
        match self.selected.unwrap_or_default() {
            Selection::Auto => match &self.active {
                Some(active) => format!("{AUTO_LABEL} ({})", active.label),
                None => AUTO_LABEL.to_string(),
            },
            Selection::Level(id) => match find_level(&self.levels, id) {
                Some(level) => level.label.clone(),
                None => {
                    debug!(level = id, "Selected level not in current level set");
                    id.to_string()
                }
            },
        }
    }

    /// Derive the render model
    pub fn view(&self, config: &LevelSelectorConfig, content_height: f64) -> MenuView {
        let selected = self.selected.unwrap_or_default();
        let active_id = self.active.as_ref().map(|level| level.id);

        let mut entries = Vec::with_capacity(self.levels.len() + 1);
        entries.push(auto_entry(selected.is_auto()));
        entries.extend(self.levels.iter().map(|level| MenuEntry {
            id: level.id,
            label: level.label.clone(),
            current: active_id == Some(level.id),
            selected: selected == Selection::Level(level.id),
        }));

        MenuView {
            title: config.title.clone(),
            button_text: self.button_text(),
            changing: self.switching && !config.assume_level_changes_will_work,
            open: self.menu_open,
            max_height: content_height * MAX_HEIGHT_RATIO,
            entries,
        }
    }
}
