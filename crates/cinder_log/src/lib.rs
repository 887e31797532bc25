//! Logging macros for the Cinder middle-end.
//!
//! - Phase logging (`phase_log!`, `phase_warn!`)
//! - Debug traces by pass (`trace_dbg!`)
//! - Verbose logging (`log_dbg!`, `log_trc!`)
//!
//! Everything goes to stderr so dumps on stdout stay clean.

use cinder_config::{CinderConfig, DebugTrace};

#[doc(hidden)]
pub use colored;

pub fn effective_verbose(config: &CinderConfig) -> u8 {
  if config.quiet {
    return 0;
  }

  if config.debug && config.verbose < 2 {
    return 2;
  }

  config.verbose
}

pub fn log_phase(config: &CinderConfig) -> bool {
  !config.quiet
}

pub fn log_debug(config: &CinderConfig) -> bool {
  effective_verbose(config) >= 2
}

pub fn log_trace(config: &CinderConfig) -> bool {
  effective_verbose(config) >= 3
}

pub fn debug_trace_enabled(
  config: &CinderConfig,
  trace: DebugTrace,
) -> bool {
  !config.quiet && (config.debug || config.debug_trace.contains(&trace))
}

pub fn trace_name(trace: DebugTrace) -> &'static str {
  match trace {
    DebugTrace::Nested => "nested",
    DebugTrace::Delegate => "delegate",
    DebugTrace::Semantic => "semantic",
    DebugTrace::Lir => "lir",
  }
}

/// Log a pass message with an arrow prefix.
///
/// ```ignore
/// phase_log!(&config, "Lowering {} functions", count);
/// phase_log!(&config, indent = 8, "closure {}", name);
/// ```
#[macro_export]
macro_rules! phase_log {
  ($config:expr, indent = $indent:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use $crate::colored::Colorize;
      eprintln!(
        "{:indent$}{} {}",
        "",
        "-->".bright_green().bold(),
        format!($fmt $(, $arg)*),
        indent = $indent
      );
    }
  }};

  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    $crate::phase_log!($config, indent = 4, $fmt $(, $arg)*);
  }};
}

/// Log a warning during a pass (yellow arrow, no indent).
#[macro_export]
macro_rules! phase_warn {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_phase($config) {
      use $crate::colored::Colorize;
      eprintln!("{} {}", "-->".bright_yellow().bold(), format!($fmt $(, $arg)*));
    }
  }};
}

/// Log a debug trace for one pass.
///
/// ```ignore
/// trace_dbg!(&config, DebugTrace::Nested, "captured {}", name);
/// // debug[nested]: captured x
/// ```
#[macro_export]
macro_rules! trace_dbg {
  ($config:expr, $trace:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::debug_trace_enabled($config, $trace) {
      eprintln!(
        "debug[{}]: {}",
        $crate::trace_name($trace),
        format!($fmt $(, $arg)*)
      );
    }
  }};
}

/// Verbose debug message (verbosity >= 2).
#[macro_export]
macro_rules! log_dbg {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_debug($config) {
      eprintln!("debug: {}", format!($fmt $(, $arg)*));
    }
  }};
}

/// Trace message (verbosity >= 3).
#[macro_export]
macro_rules! log_trc {
  ($config:expr, $fmt:literal $(, $arg:expr)* $(,)?) => {{
    if $crate::log_trace($config) {
      eprintln!("trace: {}", format!($fmt $(, $arg)*));
    }
  }};
}
