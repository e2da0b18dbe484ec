//! Layered client configuration.
//!
//! Built-in defaults, then the optional TOML file, then `NAMED_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

use crate::Args;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
  /// SQLite file holding both the documents and the accounts.
  pub store_path:   PathBuf,
  /// Where logs go; the terminal belongs to the UI.
  pub log_file:     PathBuf,
  /// Width of the swipe canvas in points. Drag distances are measured
  /// against it.
  pub canvas_width: f32,
}

impl ClientConfig {
  pub fn load(args: &Args) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "~/.local/share/named/named.db")?
      .set_default("log_file", "~/.local/state/named/named.log")?
      .set_default("canvas_width", 390.0)?
      .add_source(config::File::from(args.config.clone()).required(false))
      .add_source(config::Environment::with_prefix("NAMED"))
      .set_override_option("store_path", args.store.as_deref().map(path_value))?
      .set_override_option("log_file", args.log_file.as_deref().map(path_value))?
      .build()
      .context("failed to read config")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise ClientConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.log_file = expand_tilde(&cfg.log_file);
    Ok(cfg)
  }
}

fn path_value(path: &Path) -> String { path.to_string_lossy().into_owned() }

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
