//! Tracing subscriber setup.
//!
//! The subscriber is installed before the configuration is read, so messages
//! emitted while loading it are not lost. The filter starts at `info` and is
//! swapped for the configured `log_level` once the configuration is known.
//! `RUST_LOG` and `--verbose` take precedence and are never replaced.

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Level used until the configuration has been loaded.
const STARTUP_LEVEL: &str = "info";

/// Handle to the installed filter.
pub struct LogHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    fixed: bool,
}

impl LogHandle {
    /// Applies the configured log level unless `RUST_LOG` or `--verbose`
    /// already fixed the filter.
    pub fn apply_config_level(&self, level: &str) {
        if self.fixed {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(level)) {
            warn!(error = %e, "could not apply configured log level");
        }
    }
}

/// Installs the global subscriber, writing to stderr.
pub fn init(verbose: bool) -> LogHandle {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (directive, fixed) = startup_directive(rust_log.as_deref(), verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(STARTUP_LEVEL));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle { handle, fixed }
}

/// Filter directive at startup, and whether it must survive the configured
/// level: `RUST_LOG` first, then `--verbose`, then the startup level.
fn startup_directive(rust_log: Option<&str>, verbose: bool) -> (String, bool) {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directive) => (directive.to_string(), true),
        None if verbose => ("debug".to_string(), true),
        None => (STARTUP_LEVEL.to_string(), false),
    }
}
