//! Hubshell: view orchestration for a host-embedded profile mini-app.
//!
//! The mini-app runs inside a messaging client's container and is split into
//! independently mounted islands (people list, posts list, filter selector,
//! detail sheets). This crate is the client-side core that ties them together:
//! - A navigation controller that keeps exactly one back handler bound to the
//!   host's native back button
//! - A typed publish/subscribe bus between islands
//! - A debounced multi-criteria filter pipeline per list
//! - Tap / long-press disambiguation and context-menu placement for cards

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Headless runtime (main.rs)                         │  ← JSON lines in/out
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Event handling
//! │  - Event → islands / navigator / outbox             │  ← Action dispatching
//! │  - View model computation                           │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Islands       │   │ Navigation    │   │ Service       │
//! │ (islands/)    │   │ (nav/)        │   │ (service/)    │
//! │ - Lists       │   │ - Registry    │   │ - Tickets     │
//! │ - Selector    │   │ - Back button │   │ - Decoding    │
//! │ - Detail      │   │ - Overlays    │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Message bus (bus/), filter/, gesture/, relevance   │
//! │  Host shell trait (host/), labels (i18n), domain/   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Event handler, state container and the action model
//! - [`bus`]: Typed cross-island message bus
//! - [`nav`]: View registry and the navigation stack controller
//! - [`filter`]: Debounced filter pipeline and criteria matching
//! - [`gesture`]: Press disambiguation and context-menu positioning
//! - [`islands`]: The mounted islands
//! - [`service`]: Request tickets and response decoding
//! - [`host`]: Host container abstraction and a recording implementation
//! - [`relevance`]: Staleness guard for asynchronous results
//! - [`ui`]: View models
//! - `observability`: tracing subscriber setup (internal)
//!
//! # Timing model
//!
//! Everything runs on one thread. The runtime supplies a logical clock in
//! milliseconds with every event; debounce windows and long-press deadlines are
//! resolved by polling against it, and [`AppState::next_deadline`] tells the
//! runtime when to send the next tick.
//!
//! # Example
//!
//! ```rust
//! use hubshell::host::{HostShell, RecordingHost};
//! use hubshell::i18n::Labels;
//! use hubshell::{handle_event, initialize, Config, Event};
//! use std::rc::Rc;
//!
//! let host = Rc::new(RecordingHost::default());
//! let mut state = initialize(&Config::default(), Rc::clone(&host) as Rc<dyn HostShell>, Rc::new(Labels::new()));
//!
//! handle_event(
//!     &mut state,
//!     &Event::Start { viewer_id: "7".into(), start_param: None },
//!     0,
//! )?;
//! assert!(host.bound_back().is_none());
//!
//! // Showing a list asks the runtime to load it.
//! let (render, actions) = handle_event(&mut state, &Event::Navigate { view: "posts".into() }, 10)?;
//! assert!(render);
//! assert_eq!(actions.len(), 1);
//! # Ok::<(), hubshell::HubError>(())
//! ```

pub mod app;
pub mod bus;
pub mod domain;
pub mod filter;
pub mod gesture;
pub mod host;
pub mod i18n;
pub mod islands;
pub mod nav;
pub mod observability;
pub mod relevance;
pub mod service;
pub mod ui;

pub use app::{handle_event, Action, AppState, Event};
pub use domain::{HubError, Result};

use gesture::{MenuGeometry, PressConfig, SpringTransition};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

/// Skills offered as quick filters and used to recognise tags in typed text.
pub const POPULAR_SKILLS: &[&str] = &[
    "Python",
    "JavaScript",
    "React",
    "Java",
    "C++",
    "Go",
    "PHP",
    "Design",
    "DevOps",
    "Swift",
    "MySQL",
];

/// Runtime configuration.
///
/// Supplied either as the host's flat string map ([`Config::from_host`]) or as a
/// TOML document ([`Config::from_toml_str`], [`Config::from_file`]).
///
/// # Example
///
/// ```toml
/// debounce_ms = 250
/// known_tags = ["Go", "Rust"]
/// bot_username = "skills_hub_bot"
/// app_slug = "app"
///
/// [menu]
/// width = 260.0
/// height_estimate = 200.0
/// margin = 16.0
/// gap = 12.0
/// bottom_safe_area = 40.0
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period of the filter debounce in milliseconds. Default: 300
    pub debounce_ms: u64,

    /// Hold time after which a press becomes a long-press. Default: 300
    pub long_press_ms: u64,

    /// Movement in pixels tolerated before a press is cancelled. Default: 5
    pub press_slop: f64,

    /// Context-menu dimensions and insets.
    pub menu: MenuGeometry,

    /// Spring shared by the card clone and the context menu.
    pub transition: SpringTransition,

    /// Tag vocabulary for canonical casing and text re-derivation.
    pub known_tags: Vec<String>,

    /// Tags offered as quick-filter chips above each list.
    pub quick_tags: Vec<String>,

    /// Bot username used to build share links.
    pub bot_username: Option<String>,

    /// Mini-app short name used to build share links.
    pub app_slug: Option<String>,

    /// Tracing level.
    ///
    /// Options: `trace`, `debug`, `info`, `warn`, `error`. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let skills: Vec<String> = POPULAR_SKILLS.iter().map(|s| (*s).to_string()).collect();
        Self {
            debounce_ms: 300,
            long_press_ms: 300,
            press_slop: 5.0,
            menu: MenuGeometry::default(),
            transition: SpringTransition::default(),
            known_tags: skills.clone(),
            quick_tags: skills,
            bot_username: None,
            app_slug: None,
            trace_level: None,
        }
    }
}

impl Config {
    /// Parses configuration from the host's flat string map.
    ///
    /// Unknown keys are ignored and unparsable values fall back to their
    /// defaults, so a bad launch parameter never prevents startup.
    ///
    /// # Parsing Rules
    ///
    /// - `debounce_ms`, `long_press_ms`: String → `u64`
    /// - `press_slop`, `menu_width`: String → `f64`
    /// - `known_tags`, `quick_tags`: Comma-separated string → `Vec<String>` (filters empty values)
    /// - `bot_username`, `app_slug`, `trace_level`: String → `Option<String>`
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use hubshell::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("debounce_ms".to_string(), "150".to_string());
    /// map.insert("quick_tags".to_string(), "Go, Rust".to_string());
    /// map.insert("long_press_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_host(&map);
    /// assert_eq!(config.debounce_ms, 150);
    /// assert_eq!(config.quick_tags, vec!["Go", "Rust"]);
    /// assert_eq!(config.long_press_ms, 300);
    /// ```
    #[must_use]
    pub fn from_host(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        let list = |key: &str, fallback: Vec<String>| {
            map.get(key)
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };
        let text = |key: &str| {
            map.get(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let menu = MenuGeometry {
            width: map
                .get("menu_width")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|w| *w > 0.0)
                .unwrap_or(defaults.menu.width),
            ..defaults.menu
        };

        Self {
            debounce_ms: map
                .get("debounce_ms")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.debounce_ms),
            long_press_ms: map
                .get("long_press_ms")
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(defaults.long_press_ms),
            press_slop: map
                .get("press_slop")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|s| *s >= 0.0)
                .unwrap_or(defaults.press_slop),
            menu,
            transition: defaults.transition,
            known_tags: list("known_tags", defaults.known_tags),
            quick_tags: list("quick_tags", defaults.quick_tags),
            bot_username: text("bot_username"),
            app_slug: text("app_slug"),
            trace_level: text("trace_level"),
        }
    }

    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Toml`] for malformed TOML and [`HubError::Config`] for
    /// values that parse but make no sense (zero-width menu, negative slop).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Io`] if the file cannot be read, otherwise see
    /// [`Config::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading configuration file");
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.menu.width <= 0.0 || self.menu.height_estimate <= 0.0 {
            return Err(HubError::Config("menu dimensions must be positive".to_string()));
        }
        if self.press_slop < 0.0 {
            return Err(HubError::Config("press_slop must not be negative".to_string()));
        }
        Ok(())
    }

    /// Press thresholds for card gestures.
    #[must_use]
    pub fn press_config(&self) -> PressConfig {
        PressConfig {
            long_press: self.long_press_ms,
            slop: self.press_slop,
        }
    }

    /// Share link for a post, if sharing is configured.
    #[must_use]
    pub fn share_link(&self, post_id: &str) -> Option<String> {
        let bot = self.bot_username.as_deref()?;
        let app = self.app_slug.as_deref()?;
        Some(format!("https://t.me/{bot}/{app}?startapp=p_{post_id}"))
    }
}

/// Initializes the application.
///
/// Sets up tracing, mounts every island on a fresh bus and attaches the
/// navigator. No view is shown until the runtime sends [`Event::Start`].
///
/// # Parameters
///
/// * `config` - Runtime configuration
/// * `host` - The host container
/// * `labels` - Label lookup service
///
/// # Returns
///
/// An initialized `AppState` ready for event processing.
pub fn initialize(
    config: &Config,
    host: Rc<dyn host::HostShell>,
    labels: Rc<dyn i18n::Translate>,
) -> AppState {
    observability::init_tracing(config);
    tracing::debug!("initializing hubshell");
    AppState::new(config.clone(), host, labels)
}
