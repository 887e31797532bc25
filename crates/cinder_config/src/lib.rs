use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugTrace {
  /// Nested-reference scanning and capture decisions.
  Nested,
  /// Delegate literal synthesis.
  Delegate,
  /// Semantic validation of synthesized expressions.
  Semantic,
  /// LIR lowering (runtime calls, bounds checks).
  Lir,
}

/// Settings that change the code the middle-end emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodegenConfig {
  /// Emit a bounds check after rvalue associative-array lookups.
  #[serde(default = "default_true")]
  pub bounds_checks: bool,
}

impl Default for CodegenConfig {
  fn default() -> Self {
    Self { bounds_checks: true }
  }
}

/// The `[debug]` section of `cinder.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugTomlConfig {
  #[serde(default)]
  pub enabled: bool,

  #[serde(default)]
  pub trace: Vec<DebugTrace>,

  #[serde(default)]
  pub verbose: u8,

  #[serde(default)]
  pub quiet: bool,
}

/// Root structure of `cinder.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinderToml {
  #[serde(default)]
  pub codegen: CodegenConfig,

  #[serde(default)]
  pub debug: DebugTomlConfig,
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Default)]
pub struct CinderConfig {
  pub debug: bool,
  pub debug_trace: Vec<DebugTrace>,
  pub quiet: bool,
  pub verbose: u8,
  pub codegen: CodegenConfig,
}

impl CinderConfig {
  pub fn new_basic(
    debug: bool,
    debug_trace: Vec<DebugTrace>,
    quiet: bool,
    verbose: u8,
  ) -> Self {
    Self {
      debug,
      debug_trace,
      quiet,
      verbose,
      codegen: CodegenConfig::default(),
    }
  }

  /// Silent configuration, used by tests and embedders that only want results.
  pub fn quiet() -> Self {
    Self {
      quiet: true,
      ..Self::default()
    }
  }

  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    let raw: CinderToml = toml::from_str(content).map_err(|e| ConfigError::TomlParseError {
      path: None,
      message: e.to_string(),
    })?;

    Ok(raw.into())
  }

  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
      path: path.to_path_buf(),
      source,
    })?;

    Self::from_toml_str(&content).map_err(|err| match err {
      ConfigError::TomlParseError { message, .. } => ConfigError::TomlParseError {
        path: Some(path.to_path_buf()),
        message,
      },
      other => other,
    })
  }
}

impl From<CinderToml> for CinderConfig {
  fn from(raw: CinderToml) -> Self {
    Self {
      debug: raw.debug.enabled,
      debug_trace: raw.debug.trace,
      quiet: raw.debug.quiet,
      verbose: raw.debug.verbose,
      codegen: raw.codegen,
    }
  }
}

#[derive(Debug)]
pub enum ConfigError {
  IoError { path: PathBuf, source: std::io::Error },
  TomlParseError { path: Option<PathBuf>, message: String },
}

impl fmt::Display for ConfigError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      ConfigError::IoError { path, source } => {
        write!(f, "failed to read '{}': {}", path.display(), source)
      },
      ConfigError::TomlParseError { path: Some(path), message } => {
        write!(f, "failed to parse '{}': {}", path.display(), message)
      },
      ConfigError::TomlParseError { path: None, message } => {
        write!(f, "failed to parse configuration: {}", message)
      },
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ConfigError::IoError { source, .. } => Some(source),
      ConfigError::TomlParseError { .. } => None,
    }
  }
}
