//! Process log level and subscriber installation.

use serde::{Deserialize, Serialize};
use slotkeep_protocol::FORCED_LOG_TARGET;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, reload};

static FILTER: OnceLock<reload::Handle<Targets, Registry>> = OnceLock::new();

/// How much the engine logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    /// Nothing.
    Off,
    /// Lifecycle, swaps, conflicts, warnings and summaries.
    #[default]
    Basic,
    /// Everything, including energy writes and skipped passes.
    Verbose,
}

impl LogLevel {
    /// Matching `tracing` filter.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Basic => LevelFilter::INFO,
            LogLevel::Verbose => LevelFilter::DEBUG,
        }
    }

    /// Basic messages are emitted.
    pub fn is_basic_enabled(self) -> bool {
        self >= LogLevel::Basic
    }

    /// Verbose messages are emitted.
    pub fn is_verbose_enabled(self) -> bool {
        self >= LogLevel::Verbose
    }

    pub(crate) fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            2 => LogLevel::Verbose,
            1 => LogLevel::Basic,
            _ => LogLevel::Off,
        }
    }
}

/// Case-insensitive; anything unrecognised is `Off`.
impl FromStr for LogLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(if s.eq_ignore_ascii_case("verbose") {
            LogLevel::Verbose
        } else if s.eq_ignore_ascii_case("basic") {
            LogLevel::Basic
        } else {
            LogLevel::Off
        })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Off => "Off",
            LogLevel::Basic => "Basic",
            LogLevel::Verbose => "Verbose",
        };
        f.write_str(name)
    }
}

fn targets(level: LogLevel) -> Targets {
    Targets::new()
        .with_default(level.level_filter())
        .with_target(FORCED_LOG_TARGET, LevelFilter::INFO)
}

/// Install a `fmt` subscriber filtered at `level`.
///
/// The filter stays reloadable: [`DiagnosticsHub::set_level`] moves it
/// later. Messages on [`FORCED_LOG_TARGET`] pass at every level.
/// Returns false when a global subscriber was already set; the existing
/// one is left untouched.
///
/// [`DiagnosticsHub::set_level`]: crate::DiagnosticsHub::set_level
pub fn init_tracing(level: LogLevel) -> bool {
    let (filter, handle) = reload::Layer::new(targets(level));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .is_ok();
    if installed {
        FILTER.get_or_init(|| handle);
    }
    installed
}

/// Move the installed subscriber's filter to `level`. False when
/// [`init_tracing`] never installed one.
pub(crate) fn apply_level(level: LogLevel) -> bool {
    FILTER
        .get()
        .is_some_and(|handle| handle.reload(targets(level)).is_ok())
}
