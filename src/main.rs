//! Headless runtime and entry point.
//!
//! This binary drives the hubshell core over JSON lines so it can sit behind any
//! host container bridge, or be scripted in tests. It stands in for the host:
//! card geometry and the viewport are fed in as commands, and every call the core
//! makes on the host is echoed back.
//!
//! # Protocol
//!
//! Each stdin line is one JSON object, either an event stamped with the logical
//! clock or a host command:
//!
//! ```text
//! {"now": 0, "event": "start", "viewer_id": "7"}
//! {"now": 40, "event": "navigate", "view": "posts"}
//! {"command": "place_card", "card": "12", "rect": {"left": 16, "top": 120, "width": 358, "height": 140}}
//! {"command": "render", "list": "posts"}
//! ```
//!
//! Each handled line produces stdout lines tagged by `output`:
//!
//! - `host`: a call made on the host shell (back binding, haptics, alerts)
//! - `action`: an [`Action`] the bridge must carry out; requests are answered with
//!   a `response` event carrying the same ticket
//! - `view_model`: the list view model, after a `render` command
//! - `deadline`: when the next `tick` event is due, if any timer is pending
//! - `error`: an input line that could not be handled
//!
//! # Configuration
//!
//! `HUBSHELL_CONFIG` names a TOML config file and `HUBSHELL_LABELS` a JSON label
//! table; both are optional. `RUST_LOG` overrides the configured trace level.
//! Logs go to stderr.

#![allow(clippy::multiple_crate_versions)]

use hubshell::app::{AppState, ListKind};
use hubshell::domain::{ItemKey, Millis, Rect, Viewport};
use hubshell::host::{HostCall, HostShell, RecordingHost};
use hubshell::i18n::Labels;
use hubshell::ui::ListViewModel;
use hubshell::{handle_event, Action, Config, Event};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::rc::Rc;

const CONFIG_ENV: &str = "HUBSHELL_CONFIG";
const LABELS_ENV: &str = "HUBSHELL_LABELS";

/// One stdin line.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Input {
    Command(Command),
    Event(TimedEvent),
}

#[derive(Debug, Deserialize)]
struct TimedEvent {
    now: Millis,
    #[serde(flatten)]
    event: Event,
}

/// Host-side state the bridge reports.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum Command {
    PlaceCard { card: ItemKey, rect: Rect },
    RemoveCard { card: ItemKey },
    SetViewport { width: f64, height: f64 },
    Render { list: ListKind },
}

/// One stdout line.
#[derive(Debug, Serialize)]
#[serde(tag = "output", rename_all = "snake_case")]
enum Output<'a> {
    Host { call: &'a HostCall },
    Action { action: &'a Action },
    ViewModel { view_model: &'a ListViewModel },
    Deadline { at: Millis },
    Error { message: String },
}

/// Runtime wrapper.
///
/// Wraps the library's `AppState` with the recording host the bridge drives.
struct Runtime {
    app: AppState,
    host: Rc<RecordingHost>,
}

impl Runtime {
    fn new(config: &Config, labels: Labels) -> Self {
        let host = Rc::new(RecordingHost::default());
        let app = hubshell::initialize(config, Rc::clone(&host) as Rc<dyn HostShell>, Rc::new(labels));
        Self { app, host }
    }

    /// Handles one input line and writes its outputs.
    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<()> {
        let input = match serde_json::from_str::<Input>(line) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!(error = %e, "unreadable input line");
                return emit(out, &Output::Error { message: e.to_string() });
            }
        };

        match input {
            Input::Command(command) => self.run_command(command, out)?,
            Input::Event(TimedEvent { now, event }) => {
                let span = tracing::debug_span!("runtime_event", now);
                let _guard = span.entered();
                match handle_event(&mut self.app, &event, now) {
                    Ok((should_render, actions)) => {
                        tracing::debug!(action_count = actions.len(), should_render, "event handled");
                        self.flush_host_calls(out)?;
                        for action in &actions {
                            emit(out, &Output::Action { action })?;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "error handling event");
                        self.flush_host_calls(out)?;
                        emit(out, &Output::Error { message: e.to_string() })?;
                    }
                }
            }
        }

        if let Some(at) = self.app.next_deadline() {
            emit(out, &Output::Deadline { at })?;
        }
        out.flush()
    }

    fn run_command(&self, command: Command, out: &mut impl Write) -> io::Result<()> {
        tracing::debug!(command = ?command, "host command");
        match command {
            Command::PlaceCard { card, rect } => self.host.place_card(card, rect),
            Command::RemoveCard { card } => self.host.remove_card(&card),
            Command::SetViewport { width, height } => {
                self.host.set_viewport(Viewport::new(width, height));
            }
            Command::Render { list } => {
                let view_model = self.app.compute_viewmodel(list, chrono::Utc::now());
                emit(out, &Output::ViewModel { view_model: &view_model })?;
            }
        }
        Ok(())
    }

    fn flush_host_calls(&self, out: &mut impl Write) -> io::Result<()> {
        for call in self.host.take_calls() {
            emit(out, &Output::Host { call: &call })?;
        }
        Ok(())
    }
}

fn emit(out: &mut impl Write, output: &Output<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, output)?;
    out.write_all(b"\n")
}

fn load_config() -> hubshell::Result<Config> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

fn load_labels() -> hubshell::Result<Labels> {
    match std::env::var_os(LABELS_ENV) {
        Some(path) => Labels::from_json_str(&std::fs::read_to_string(path)?),
        None => Ok(Labels::new()),
    }
}

fn main() -> ExitCode {
    let setup = load_config().and_then(|config| Ok((load_labels()?, config)));
    let (labels, config) = match setup {
        Ok(loaded) => loaded,
        Err(e) => {
            hubshell::observability::init_tracing(&Config::default());
            tracing::error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let mut runtime = Runtime::new(&config, labels);
    tracing::info!("hubshell runtime ready");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let result = line.and_then(|line| {
            let line = line.trim();
            if line.is_empty() {
                Ok(())
            } else {
                runtime.handle_line(line, &mut out)
            }
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "runtime i/o failed");
            return ExitCode::FAILURE;
        }
    }

    tracing::info!("input closed");
    ExitCode::SUCCESS
}
