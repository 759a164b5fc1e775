//! Load user configuration from disk.

use std::{fs, path::Path};

use tracing::debug;

use crate::{Config, Error};

/// Load and validate a `Config` from a RON file at `path`.
///
/// A missing file is an error; callers that want defaults should check
/// existence first.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let cfg = Config::from_ron(&text).map_err(|e| e.with_path(path))?;
    debug!(
        path = %path.display(),
        templates = cfg.templates.len(),
        commands = cfg.chat.commands.len(),
        "config_loaded"
    );
    Ok(cfg)
}
