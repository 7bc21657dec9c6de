use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::config;

/// Print a previously generated configuration file
#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct Show {
  /// Path of the configuration file to print
  ///
  /// Defaults to config.json next to the running executable
  #[arg(long)]
  pub path: Option<PathBuf>,
}

impl Show {
  pub fn show(&self) -> Result<()> {
    let path = match &self.path {
      Some(path) => path.clone(),
      None => config::default_config_path()?,
    };
    let contents = config::read_config(&path)?;
    println!("{contents}");

    Ok(())
  }
}
