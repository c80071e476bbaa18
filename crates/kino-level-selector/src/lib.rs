//! Kino Level Selector - quality level menu for Kino players
//!
//! This crate tracks which quality levels a playback engine offers, which
//! one the viewer picked (or AUTO), and which one is actually playing, and
//! turns that into a menu the host UI can render:
//! - Level ingestion with configurable filtering and labeling
//! - Selection forwarding to the playback engine
//! - Active level and switch-in-flight tracking
//! - Render model, HTML markup and stylesheet for the menu
//! - Rebinding when the host's active container changes
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Kino Level Selector                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐                         ┌──────────────┐      │
//! │  │   Playback   │── PlaybackEvent ──┐     │     Host     │      │
//! │  │    (port)    │◄─ set level ──┐   │     │    (port)    │      │
//! │  └──────────────┘               │   ▼     └──────┬───────┘      │
//! │                          ┌──────┴───────┐        │ HostEvent    │
//! │                          │    Level     │◄───────┘              │
//! │                          │  Selection   │── MenuView ──► present│
//! │                          │  Controller  │                       │
//! │                          └──────┬───────┘                       │
//! │                                 │                               │
//! │  ┌──────────────┐  ┌────────────┴─┐  ┌──────────────┐           │
//! │  │    Config    │  │   Selector   │  │  Task Queue  │           │
//! │  │  + Registry  │  │    State     │  │  (rebinds)   │           │
//! │  └──────────────┘  └──────────────┘  └──────────────┘           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use kino_level_selector::{
//!     Level, LevelSelectionController, LevelSelectorConfig, LocalTaskQueue,
//!     SimulatedHost, SimulatedPlayback,
//! };
//!
//! let playback = Arc::new(SimulatedPlayback::new());
//! let host = Arc::new(SimulatedHost::new(360.0));
//! let queue = Arc::new(LocalTaskQueue::new());
//!
//! let controller = LevelSelectionController::new(LevelSelectorConfig::default(), queue);
//! controller.attach(playback.clone(), host.clone()).unwrap();
//!
//! playback.load_levels(vec![Level::new(0, "Low"), Level::new(1, "High")]).unwrap();
//! assert_eq!(host.presented().unwrap().button_text, "AUTO");
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod events;
pub mod ports;
pub mod scheduler;
pub mod selector;
pub mod controller;
pub mod view;
pub mod theme;
pub mod sim;

pub use error::{Error, Result};
pub use types::*;
pub use config::{CallbackRegistry, CallbackSlot, LevelSelectorConfig};
pub use events::{EventBus, HostEvent, PlaybackEvent, Subscription};
pub use ports::{Host, Playback};
pub use scheduler::{LocalTaskQueue, TaskQueue, TokioTaskQueue};
pub use selector::{IgnoreReason, SelectOutcome, SelectorState};
pub use controller::LevelSelectionController;
pub use view::{MenuEntry, MenuView};
pub use theme::SelectorTheme;
pub use sim::{SimulatedHost, SimulatedPlayback};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library initialization
pub fn init() {
    tracing::info!(
        version = VERSION,
        plugin = PLUGIN_NAME,
        host_min = MIN_HOST_VERSION,
        host_max = MAX_HOST_VERSION,
        "Kino level selector initialized"
    );
}
