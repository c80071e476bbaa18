//! Collaborator contracts
//!
//! The controller only talks to playback and the host UI through these
//! traits, so any engine or UI toolkit can be plugged in.

use crate::{
    events::{EventBus, HostEvent, PlaybackEvent},
    view::MenuView,
    Level, Selection,
};
use std::sync::Arc;

/// Playback engine as seen by the level selector
pub trait Playback: Send + Sync {
    /// Notifications about levels and level switches
    fn events(&self) -> &EventBus<PlaybackEvent>;

    /// Level currently requested from the engine, `None` if the engine has
    /// no notion of levels
    fn current_level(&self) -> Option<Selection>;

    /// Request a level switch. Completion is reported through
    /// [`PlaybackEvent::ActiveLevelChanged`].
    fn set_current_level(&self, selection: Selection);

    /// Levels already known to the engine, if any
    fn levels(&self) -> Option<Vec<Level>>;
}

/// Host UI the menu is mounted into
pub trait Host: Send + Sync {
    /// Notifications about the host controls
    fn events(&self) -> &EventBus<HostEvent>;

    /// Whether a container is mounted to render into
    fn is_mounted(&self) -> bool;

    /// Height of the host content area in pixels
    fn content_height(&self) -> f64;

    /// Playback of the active container
    fn active_playback(&self) -> Option<Arc<dyn Playback>>;

    /// Place the rendered menu into the host's control panel, replacing any
    /// previous rendering
    fn present(&self, view: &MenuView);

    /// Remove the menu from the control panel
    fn withdraw(&self);
}
