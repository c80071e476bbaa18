//! Scripted sessions
//!
//! A script is a JSON array of steps, for example:
//!
//! ```json
//! [
//!   { "op": "levels", "levels": [{ "id": 0, "label": "360p" }, { "id": 1, "label": "720p" }] },
//!   { "op": "active", "level": 0 },
//!   { "op": "toggle" },
//!   { "op": "select", "id": "1" },
//!   { "op": "switch_start" },
//!   { "op": "active", "level": 1 },
//!   { "op": "switch_end" }
//! ]
//! ```

use kino_level_selector::{
    Level, LevelSelectionController, LevelSelectorConfig, LocalTaskQueue, MenuView,
    SimulatedHost, SimulatedPlayback,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One scripted action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Playback announces a level set
    Levels { levels: Vec<Level> },
    /// Host renders its controls
    Render,
    /// Playback reports the level in effect
    Active { level: i32 },
    /// User clicks the entry carrying `id`
    Select { id: String },
    SwitchStart,
    SwitchEnd,
    /// Host switches to a fresh container; `levels` pre-populate its playback
    ContainerChanged {
        #[serde(default)]
        levels: Option<Vec<Level>>,
    },
    /// User clicks the menu button
    Toggle,
    /// Host hides its controls
    Hide,
}

impl Step {
    pub fn describe(&self) -> String {
        match self {
            Step::Levels { levels } => format!("levels ({})", levels.len()),
            Step::Render => "render".to_string(),
            Step::Active { level } => format!("active {level}"),
            Step::Select { id } => format!("select {id}"),
            Step::SwitchStart => "switch start".to_string(),
            Step::SwitchEnd => "switch end".to_string(),
            Step::ContainerChanged { .. } => "container changed".to_string(),
            Step::Toggle => "toggle".to_string(),
            Step::Hide => "hide".to_string(),
        }
    }
}

/// Result of one replayed step
#[derive(Debug, Serialize)]
pub struct StepReport {
    pub step: String,
    /// Set when the step was a selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    /// Menu presented after the step, `None` if nothing is shown
    pub view: Option<MenuView>,
}

/// Load a script file
pub fn load(path: &Path) -> anyhow::Result<Vec<Step>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Simulated player session
pub struct Session {
    queue: Arc<LocalTaskQueue>,
    playback: Arc<SimulatedPlayback>,
    host: Arc<SimulatedHost>,
    controller: LevelSelectionController,
}

impl Session {
    pub fn new(config: LevelSelectorConfig, content_height: f64) -> anyhow::Result<Self> {
        let queue = Arc::new(LocalTaskQueue::new());
        let playback = Arc::new(SimulatedPlayback::new());
        let host = Arc::new(SimulatedHost::new(content_height).with_playback(playback.clone()));
        let controller = LevelSelectionController::new(config, queue.clone());
        controller.attach(playback.clone(), host.clone())?;
        Ok(Self { queue, playback, host, controller })
    }

    pub fn controller(&self) -> &LevelSelectionController {
        &self.controller
    }

    /// Apply one step, then let deferred work run
    pub fn apply(&mut self, step: &Step) -> anyhow::Result<StepReport> {
        let mut outcome = None;
        match step {
            Step::Levels { levels } => self.playback.load_levels(levels.clone())?,
            Step::Render => self.host.render_controls()?,
            Step::Active { level } => self.playback.report_active_level(*level)?,
            Step::Select { id } => {
                outcome = Some(format!("{:?}", self.controller.on_level_select(id)));
            }
            Step::SwitchStart => self.playback.start_switch()?,
            Step::SwitchEnd => self.playback.end_switch()?,
            Step::ContainerChanged { levels } => {
                let playback = match levels {
                    Some(levels) => SimulatedPlayback::with_levels(levels.clone()),
                    None => SimulatedPlayback::new(),
                };
                self.playback = Arc::new(playback);
                self.host.change_container(Some(self.playback.clone()))?;
            }
            Step::Toggle => self.controller.toggle_menu(),
            Step::Hide => self.host.hide_controls()?,
        }

        let ran = self.queue.run_pending();
        if ran > 0 {
            debug!(tasks = ran, "Drained task queue");
        }

        Ok(StepReport {
            step: step.describe(),
            outcome,
            view: self.host.presented(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                { "op": "levels", "levels": [{ "id": 0, "label": "Low" }, { "id": 1, "label": "High" }] },
                { "op": "select", "id": "1" },
                { "op": "container_changed" },
                { "op": "switch_start" }
            ]"#,
        )
        .unwrap();
        assert_eq!(steps.len(), 4);
        assert!(matches!(steps[2], Step::ContainerChanged { levels: None }));
    }

    #[test]
    fn test_session_replay() {
        let mut session = Session::new(LevelSelectorConfig::default(), 400.0).unwrap();
        let levels = vec![Level::new(0, "Low"), Level::new(1, "High")];

        let report = session.apply(&Step::Levels { levels }).unwrap();
        assert_eq!(report.view.unwrap().button_text, "AUTO");

        let report = session.apply(&Step::Select { id: "1".into() }).unwrap();
        assert!(report.outcome.unwrap().contains("Requested"));

        let report = session.apply(&Step::Active { level: 1 }).unwrap();
        assert_eq!(report.view.unwrap().button_text, "High");
    }

    #[test]
    fn test_container_change_rebinds_within_step() {
        let mut session = Session::new(LevelSelectorConfig::default(), 400.0).unwrap();
        session
            .apply(&Step::Levels { levels: vec![Level::new(0, "Low"), Level::new(1, "High")] })
            .unwrap();

        let report = session
            .apply(&Step::ContainerChanged {
                levels: Some(vec![
                    Level::new(0, "360p"),
                    Level::new(1, "720p"),
                    Level::new(2, "1080p"),
                ]),
            })
            .unwrap();
        assert_eq!(report.view.unwrap().entries.len(), 4);
        assert!(session.controller().is_attached());
    }
}
