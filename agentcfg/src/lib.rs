pub mod cli;
pub mod commands;
pub mod config;
pub mod ec2;
pub mod prompt;
pub mod sdk;

use clap::ValueEnum;
pub use cli::{Cli, Commands};
use serde::{Deserialize, Serialize};

/// Operating system the generated agent configuration targets
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsType {
  Linux,
  Windows,
  Darwin,
}

impl OsType {
  /// Operating system of the host running the wizard
  pub fn current() -> Self {
    match std::env::consts::OS {
      "windows" => Self::Windows,
      "macos" => Self::Darwin,
      _ => Self::Linux,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::Windows => "windows",
      Self::Darwin => "darwin",
    }
  }
}

impl Default for OsType {
  fn default() -> Self {
    Self::current()
  }
}

impl std::fmt::Display for OsType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
