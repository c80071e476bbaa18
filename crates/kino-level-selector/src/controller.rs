//! Level selection controller - binds selection state to playback and host
//!
//! Coordinates:
//! - Subscriptions to playback and host notifications
//! - Level ingestion and menu rendering
//! - Forwarding user selections to playback
//! - Rebinding when the host's active container changes

use crate::{
    config::LevelSelectorConfig,
    events::{HostEvent, PlaybackEvent, Subscription},
    ports::{Host, Playback},
    scheduler::TaskQueue,
    selector::{IgnoreReason, SelectOutcome, SelectorState},
    view::{parse_select_target, MenuView},
    ControllerId, Level, Result, Selection,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, error, info, instrument};

struct Inner {
    state: SelectorState,
    playback: Option<Arc<dyn Playback>>,
    host: Option<Arc<dyn Host>>,
    host_subscriptions: Vec<Subscription>,
    playback_subscriptions: Vec<Subscription>,
    /// The menu is currently presented by the host
    rendered: bool,
    /// Host content height at the last render
    content_height: f64,
}

struct Shared {
    id: ControllerId,
    config: Arc<LevelSelectorConfig>,
    queue: Arc<dyn TaskQueue>,
    inner: Mutex<Inner>,
}

/// Quality level menu bound to a playback and a host
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct LevelSelectionController {
    shared: Arc<Shared>,
}

impl LevelSelectionController {
    /// Create a detached controller
    pub fn new(config: LevelSelectorConfig, queue: Arc<dyn TaskQueue>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: ControllerId::new(),
                config: Arc::new(config),
                queue,
                inner: Mutex::new(Inner {
                    state: SelectorState::new(),
                    playback: None,
                    host: None,
                    host_subscriptions: Vec::new(),
                    playback_subscriptions: Vec::new(),
                    rendered: false,
                    content_height: 0.0,
                }),
            }),
        }
    }

    /// Get controller ID
    pub fn id(&self) -> ControllerId {
        self.shared.id
    }

    pub fn config(&self) -> &LevelSelectorConfig {
        &self.shared.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Subscribe to `playback` and `host`, replacing any previous bindings.
    ///
    /// Levels the playback already knows are ingested right away.
    #[instrument(skip_all, fields(controller_id = %self.shared.id))]
    pub fn attach(&self, playback: Arc<dyn Playback>, host: Arc<dyn Host>) -> Result<()> {
        self.detach();
        {
            let mut inner = self.lock();
            inner.playback = Some(playback);
            inner.host = Some(host);
        }
        info!("Attaching level selector");
        self.bind_host_events();
        self.bind_playback_events()
    }

    /// Unsubscribe from every notification
    #[instrument(skip_all, fields(controller_id = %self.shared.id))]
    pub fn detach(&self) {
        let (host_subs, playback_subs) = {
            let mut inner = self.lock();
            (
                std::mem::take(&mut inner.host_subscriptions),
                std::mem::take(&mut inner.playback_subscriptions),
            )
        };
        if !host_subs.is_empty() || !playback_subs.is_empty() {
            debug!(
                host = host_subs.len(),
                playback = playback_subs.len(),
                "Unsubscribing"
            );
        }
        for subscription in host_subs.into_iter().chain(playback_subs) {
            subscription.unsubscribe();
        }
    }

    /// Whether any subscription is installed
    pub fn is_attached(&self) -> bool {
        let inner = self.lock();
        !inner.host_subscriptions.is_empty() || !inner.playback_subscriptions.is_empty()
    }

    /// Tear down all subscriptions now and resubscribe on the next turn of
    /// the task queue, against the host's active playback.
    ///
    /// Deferring lets the dispatch that triggered the rebind finish before
    /// new listeners exist, so no notification reaches the controller twice.
    #[instrument(skip_all, fields(controller_id = %self.shared.id))]
    pub fn rebind(&self) {
        self.detach();

        let (host, was_rendered) = {
            let mut inner = self.lock();
            inner.state.reset_playback_state();
            let was_rendered = std::mem::replace(&mut inner.rendered, false);
            (inner.host.clone(), was_rendered)
        };
        if was_rendered {
            if let Some(host) = host {
                host.withdraw();
            }
        }

        info!("Rebinding on next turn");
        let weak = Arc::downgrade(&self.shared);
        self.shared.queue.post(Box::new(move || {
            if let Some(controller) = Self::from_weak(&weak) {
                controller.resubscribe();
            }
        }));
    }

    fn resubscribe(&self) {
        let host = self.lock().host.clone();
        let Some(host) = host else {
            debug!("No host to rebind to");
            return;
        };
        let playback = host.active_playback();
        if let Some(playback) = playback {
            self.lock().playback = Some(playback);
        }

        // Attach tears down whatever a previous resubscribe installed.
        self.detach();
        self.bind_host_events();
        if let Err(err) = self.bind_playback_events() {
            error!(
                controller_id = %self.shared.id,
                error = %err,
                code = err.error_code(),
                "Failed to ingest levels after rebind"
            );
        }
    }

    fn bind_host_events(&self) {
        let old = std::mem::take(&mut self.lock().host_subscriptions);
        drop(old);

        let host = self.lock().host.clone();
        let Some(host) = host else { return };

        let weak = Arc::downgrade(&self.shared);
        let subscription = host.events().subscribe(move |event: &HostEvent| {
            match Self::from_weak(&weak) {
                Some(controller) => controller.handle_host_event(*event),
                None => Ok(()),
            }
        });
        debug!(listener = ?subscription.id(), "Bound host events");
        self.lock().host_subscriptions.push(subscription);
    }

    fn bind_playback_events(&self) -> Result<()> {
        let old = std::mem::take(&mut self.lock().playback_subscriptions);
        drop(old);

        let playback = self.lock().playback.clone();
        let Some(playback) = playback else {
            debug!("No playback to bind");
            return Ok(());
        };

        let weak = Arc::downgrade(&self.shared);
        let subscription = playback.events().subscribe(move |event: &PlaybackEvent| {
            match Self::from_weak(&weak) {
                Some(controller) => controller.handle_playback_event(event),
                None => Ok(()),
            }
        });
        debug!(listener = ?subscription.id(), "Bound playback events");
        self.lock().playback_subscriptions.push(subscription);

        match playback.levels() {
            Some(levels) if !levels.is_empty() => {
                debug!(levels = levels.len(), "Playback already has levels");
                self.on_levels_available(&levels, Selection::Auto)
            }
            _ => Ok(()),
        }
    }

    fn handle_host_event(&self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::Ready => {
                let host = self.lock().host.clone();
                if let Some(playback) = host.and_then(|host| host.active_playback()) {
                    self.lock().playback = Some(playback);
                }
                self.bind_playback_events()
            }
            HostEvent::Rendered => {
                self.render();
                Ok(())
            }
            HostEvent::Hide => {
                self.hide_menu();
                Ok(())
            }
            HostEvent::ContainerChanged => {
                self.rebind();
                Ok(())
            }
        }
    }

    fn handle_playback_event(&self, event: &PlaybackEvent) -> Result<()> {
        match event {
            PlaybackEvent::LevelsAvailable { levels } => {
                self.on_levels_available(levels, Selection::Auto)
            }
            PlaybackEvent::LevelSwitchStarted => {
                self.on_switch_started();
                Ok(())
            }
            PlaybackEvent::LevelSwitchEnded => {
                self.on_switch_ended();
                Ok(())
            }
            PlaybackEvent::ActiveLevelChanged { level } => {
                self.on_active_level_changed(*level);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Levels and rendering
    // =========================================================================

    /// Ingest a new level set and render.
    ///
    /// `initial` becomes the selection only if nothing was selected yet.
    #[instrument(skip(self, levels), fields(controller_id = %self.shared.id, levels = levels.len()))]
    pub fn on_levels_available(&self, levels: &[Level], initial: Selection) -> Result<()> {
        let count = {
            let mut inner = self.lock();
            inner.state.ingest(levels, initial, &self.shared.config)?;
            inner.state.levels().len()
        };
        info!(levels = count, "Levels available");
        self.render();
        Ok(())
    }

    /// Render the menu into the host, or remove it when there is nothing to
    /// choose from. Returns the presented view.
    #[instrument(skip(self), fields(controller_id = %self.shared.id))]
    pub fn render(&self) -> Option<MenuView> {
        let (host, playback) = {
            let inner = self.lock();
            (inner.host.clone(), inner.playback.clone())
        };
        let host = host?;

        let responds_to_current_level = playback
            .as_ref()
            .is_some_and(|playback| playback.current_level().is_some());
        let mounted = host.is_mounted();
        let content_height = host.content_height();

        let (view, was_rendered) = {
            let mut inner = self.lock();
            let was_rendered = inner.rendered;
            if mounted && responds_to_current_level && inner.state.has_choices() {
                inner.rendered = true;
                inner.content_height = content_height;
                (Some(inner.state.view(&self.shared.config, content_height)), was_rendered)
            } else {
                inner.rendered = false;
                (None, was_rendered)
            }
        };

        match &view {
            Some(view) => {
                debug!(entries = view.entries.len(), "Presenting level menu");
                host.present(view);
            }
            None if was_rendered => {
                debug!("Nothing to choose from, withdrawing level menu");
                host.withdraw();
            }
            None => {}
        }
        view
    }

    /// Re-present the menu with the current markers and button text.
    ///
    /// Does nothing while the menu is not rendered.
    pub fn update_gui(&self) -> Option<MenuView> {
        let (host, view) = {
            let inner = self.lock();
            if !inner.rendered {
                return None;
            }
            (
                inner.host.clone(),
                inner.state.view(&self.shared.config, inner.content_height),
            )
        };
        if let Some(host) = host {
            host.present(&view);
        }
        Some(view)
    }

    /// Current render model, if the menu is rendered
    pub fn view(&self) -> Option<MenuView> {
        let inner = self.lock();
        inner
            .rendered
            .then(|| inner.state.view(&self.shared.config, inner.content_height))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Handle a click on a menu entry carrying `raw` as its level id
    pub fn on_level_select(&self, raw: &str) -> SelectOutcome {
        match parse_select_target(raw) {
            Some(selection) => self.select_level(selection),
            None => {
                debug!(raw, "Ignoring selection without a level id");
                SelectOutcome::Ignored(IgnoreReason::Unparseable(raw.to_string()))
            }
        }
    }

    /// Ask playback to switch to `chosen`.
    ///
    /// Fire-and-forget: the outcome of the switch arrives later as an
    /// active level notification.
    #[instrument(skip(self), fields(controller_id = %self.shared.id))]
    pub fn select_level(&self, chosen: Selection) -> SelectOutcome {
        let playback = self.lock().playback.clone();
        let Some(playback) = playback else {
            return SelectOutcome::Ignored(IgnoreReason::NoPlayback);
        };

        let current = playback.current_level();
        let outcome = self.lock().state.select(chosen, current);
        if let SelectOutcome::Ignored(reason) = &outcome {
            debug!(?reason, "Level selection ignored");
            return outcome;
        }

        if self.shared.config.assume_level_changes_will_work {
            self.update_gui();
        }
        info!(level = %chosen, "Requesting level switch");
        playback.set_current_level(chosen);
        self.hide_menu();
        outcome
    }

    /// A level switch began
    pub fn on_switch_started(&self) {
        self.lock().state.set_switching(true);
        if !self.shared.config.assume_level_changes_will_work {
            self.update_gui();
        }
    }

    /// A level switch finished
    pub fn on_switch_ended(&self) {
        self.lock().state.set_switching(false);
        if !self.shared.config.assume_level_changes_will_work {
            self.update_gui();
        }
    }

    /// Playback reports `index` as the level in effect
    #[instrument(skip(self), fields(controller_id = %self.shared.id))]
    pub fn on_active_level_changed(&self, index: i32) {
        let label = self
            .lock()
            .state
            .set_active_level(index)
            .map(|level| level.label.clone());
        debug!(level = index, label = ?label, "Active level changed");
        self.update_gui();
    }

    // =========================================================================
    // Menu visibility
    // =========================================================================

    pub fn toggle_menu(&self) {
        self.lock().state.toggle_menu();
        self.update_gui();
    }

    pub fn hide_menu(&self) {
        let was_open = {
            let mut inner = self.lock();
            let was_open = inner.state.is_menu_open();
            inner.state.hide_menu();
            was_open
        };
        if was_open {
            self.update_gui();
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// User selection, `None` until levels were first ingested
    pub fn selected_level(&self) -> Option<Selection> {
        self.lock().state.selected()
    }

    /// Level playback reports as in effect
    pub fn active_level(&self) -> Option<Level> {
        self.lock().state.active_level().cloned()
    }

    /// Ingested levels
    pub fn levels(&self) -> Vec<Level> {
        self.lock().state.levels().to_vec()
    }

    /// A level switch is in flight
    pub fn is_switching(&self) -> bool {
        self.lock().state.is_switching()
    }

    pub fn is_menu_open(&self) -> bool {
        self.lock().state.is_menu_open()
    }
}

impl std::fmt::Debug for LevelSelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("LevelSelectionController")
            .field("id", &self.shared.id)
            .field("state", &inner.state)
            .field("rendered", &inner.rendered)
            .finish()
    }
}
