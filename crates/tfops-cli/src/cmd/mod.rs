pub mod deploy;
pub mod setup_backend;

use anyhow::Context;
use std::path::Path;
use tfops_core::config::{Config, WarnLevel};
use tfops_core::paths;
use tfops_core::report::Reporter;

/// Load and validate `tfops.yaml`, surfacing warnings through the reporter.
pub fn load_config(root: &Path, reporter: &Reporter) -> anyhow::Result<Config> {
    let config = Config::load(root).with_context(|| {
        format!(
            "failed to load {}",
            paths::config_path(root).display()
        )
    })?;
    for warning in config.validate() {
        if warning.level == WarnLevel::Warning {
            reporter.warn(&warning.message);
        }
    }
    config.ensure_valid()?;
    Ok(config)
}
