use std::path::PathBuf;

use mailharbor_common::PlatformError;

pub(super) const APP_NAME: &str = "mailharbor";

/// Definitions directory inside the container image.
pub const CONTAINER_CONFIG_DIR: &str = "/config";

/// Returns the definitions directory to use when none is given on the
/// command line.
///
/// Inside the container this is `/config` (the operator's bind mount). For
/// development outside the container it falls back to the per-user config
/// directory:
///
/// - Linux: `$XDG_CONFIG_HOME/mailharbor` (defaults to `~/.config/mailharbor`)
/// - macOS: `~/Library/Application Support/mailharbor`
pub fn default_config_dir() -> Result<PathBuf, PlatformError> {
    let container = PathBuf::from(CONTAINER_CONFIG_DIR);
    if container.is_dir() {
        return Ok(container);
    }
    Ok(dirs::config_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine config directory".into()))?
        .join(APP_NAME))
}
