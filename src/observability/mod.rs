//! Structured logging for the core.
//!
//! Every layer logs through `tracing` macros and spans; this module only owns
//! the subscriber. Events go to stderr through a `fmt` layer.
//!
//! # Configuration
//!
//! Trace level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. `trace_level` config option
//! 3. Default: `"info"`
//!
//! # Usage
//!
//! Initialize tracing early, before the first event is handled:
//!
//! ```rust
//! use hubshell::observability::init_tracing;
//! use hubshell::Config;
//!
//! let config = Config::default();
//! init_tracing(&config);
//!
//! tracing::debug!("runtime initialized");
//! ```

mod init;

pub use init::init_tracing;
