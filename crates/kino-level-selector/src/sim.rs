//! In-memory playback and host
//!
//! Both keep just enough state to drive the controller without a real
//! player: the CLI uses them to replay scripted sessions and the tests use
//! them to observe what the controller asked for.

use crate::{
    events::{EventBus, HostEvent, PlaybackEvent},
    ports::{Host, Playback},
    view::MenuView,
    Level, Result, Selection,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Default)]
struct PlaybackState {
    levels: Option<Vec<Level>>,
    current_level: Option<Selection>,
    requests: Vec<Selection>,
}

/// Playback engine that records level requests
#[derive(Debug, Default)]
pub struct SimulatedPlayback {
    events: EventBus<PlaybackEvent>,
    state: Mutex<PlaybackState>,
}

impl SimulatedPlayback {
    /// Playback without levels; `current_level` is undefined until levels load
    pub fn new() -> Self {
        Self::default()
    }

    /// Playback whose levels are known before anyone subscribes
    pub fn with_levels(levels: Vec<Level>) -> Self {
        let playback = Self::new();
        {
            let mut state = playback.state();
            state.levels = Some(levels);
            state.current_level = Some(Selection::Auto);
        }
        playback
    }

    fn state(&self) -> MutexGuard<'_, PlaybackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the level set and announce it
    pub fn load_levels(&self, levels: Vec<Level>) -> Result<()> {
        {
            let mut state = self.state();
            state.levels = Some(levels.clone());
            state.current_level.get_or_insert(Selection::Auto);
        }
        debug!(levels = levels.len(), "Simulated playback loaded levels");
        self.events.emit(&PlaybackEvent::LevelsAvailable { levels })
    }

    pub fn start_switch(&self) -> Result<()> {
        self.events.emit(&PlaybackEvent::LevelSwitchStarted)
    }

    pub fn end_switch(&self) -> Result<()> {
        self.events.emit(&PlaybackEvent::LevelSwitchEnded)
    }

    /// Announce the level now in effect
    pub fn report_active_level(&self, level: i32) -> Result<()> {
        self.events.emit(&PlaybackEvent::ActiveLevelChanged { level })
    }

    /// Start, apply and finish a switch to `level`
    pub fn complete_switch(&self, level: i32) -> Result<()> {
        self.start_switch()?;
        self.report_active_level(level)?;
        self.end_switch()
    }

    /// Every level requested through [`Playback::set_current_level`]
    pub fn requests(&self) -> Vec<Selection> {
        self.state().requests.clone()
    }
}

impl Playback for SimulatedPlayback {
    fn events(&self) -> &EventBus<PlaybackEvent> {
        &self.events
    }

    fn current_level(&self) -> Option<Selection> {
        self.state().current_level
    }

    fn set_current_level(&self, selection: Selection) {
        let mut state = self.state();
        state.requests.push(selection);
        state.current_level = Some(selection);
    }

    fn levels(&self) -> Option<Vec<Level>> {
        self.state().levels.clone()
    }
}

struct HostState {
    mounted: bool,
    content_height: f64,
    playback: Option<Arc<dyn Playback>>,
    presented: Option<MenuView>,
    present_count: usize,
}

/// Host UI that keeps the last presented menu
pub struct SimulatedHost {
    events: EventBus<HostEvent>,
    state: Mutex<HostState>,
}

impl SimulatedHost {
    /// Mounted host with the given content height
    pub fn new(content_height: f64) -> Self {
        Self {
            events: EventBus::new(),
            state: Mutex::new(HostState {
                mounted: true,
                content_height,
                playback: None,
                presented: None,
                present_count: 0,
            }),
        }
    }

    pub fn with_playback(self, playback: Arc<dyn Playback>) -> Self {
        self.state().playback = Some(playback);
        self
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_mounted(&self, mounted: bool) {
        self.state().mounted = mounted;
    }

    pub fn ready(&self) -> Result<()> {
        self.events.emit(&HostEvent::Ready)
    }

    /// Re-render the host controls
    pub fn render_controls(&self) -> Result<()> {
        self.events.emit(&HostEvent::Rendered)
    }

    pub fn hide_controls(&self) -> Result<()> {
        self.events.emit(&HostEvent::Hide)
    }

    /// Switch the active container to one backed by `playback`
    pub fn change_container(&self, playback: Option<Arc<dyn Playback>>) -> Result<()> {
        self.state().playback = playback;
        self.events.emit(&HostEvent::ContainerChanged)
    }

    /// Menu currently in the control panel
    pub fn presented(&self) -> Option<MenuView> {
        self.state().presented.clone()
    }

    /// How many times a menu was presented
    pub fn present_count(&self) -> usize {
        self.state().present_count
    }
}

impl Host for SimulatedHost {
    fn events(&self) -> &EventBus<HostEvent> {
        &self.events
    }

    fn is_mounted(&self) -> bool {
        self.state().mounted
    }

    fn content_height(&self) -> f64 {
        self.state().content_height
    }

    fn active_playback(&self) -> Option<Arc<dyn Playback>> {
        self.state().playback.clone()
    }

    fn present(&self, view: &MenuView) {
        let mut state = self.state();
        state.presented = Some(view.clone());
        state.present_count += 1;
    }

    fn withdraw(&self) {
        self.state().presented = None;
    }
}

impl std::fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SimulatedHost")
            .field("mounted", &state.mounted)
            .field("content_height", &state.content_height)
            .field("present_count", &state.present_count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_records_requests() {
        let playback = SimulatedPlayback::new();
        assert_eq!(playback.current_level(), None);

        playback.load_levels(vec![Level::new(0, "Low"), Level::new(1, "High")]).unwrap();
        assert_eq!(playback.current_level(), Some(Selection::Auto));

        playback.set_current_level(Selection::Level(1));
        assert_eq!(playback.current_level(), Some(Selection::Level(1)));
        assert_eq!(playback.requests(), vec![Selection::Level(1)]);
    }

    #[test]
    fn test_host_present_and_withdraw() {
        let host = SimulatedHost::new(360.0);
        let view = MenuView {
            title: None,
            button_text: "AUTO".into(),
            changing: false,
            open: false,
            max_height: 288.0,
            entries: Vec::new(),
        };

        host.present(&view);
        assert_eq!(host.presented(), Some(view));
        assert_eq!(host.present_count(), 1);

        host.withdraw();
        assert!(host.presented().is_none());
    }
}
