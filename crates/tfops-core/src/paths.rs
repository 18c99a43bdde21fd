use crate::types::Environment;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Layout constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "tfops.yaml";
pub const DEFAULT_ENVIRONMENTS_DIR: &str = "environments";
pub const DEFAULT_VAR_FILE: &str = "terraform.tfvars";
pub const PLAN_ARTIFACT_PREFIX: &str = "tfplan";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn environment_dir(root: &Path, environments_dir: &str, env: Environment) -> PathBuf {
    root.join(environments_dir).join(env.as_str())
}

pub fn var_file_path(env_dir: &Path, var_file: &str) -> PathBuf {
    env_dir.join(var_file)
}

/// `tfplan-<env>-<unix seconds>`, relative to the environment directory.
pub fn plan_artifact_name(env: Environment, unix_secs: i64) -> String {
    format!("{PLAN_ARTIFACT_PREFIX}-{env}-{unix_secs}")
}

/// Relative tool paths such as `./tools/terraform` are anchored at the
/// project root. Bare names and absolute paths are returned unchanged.
pub fn resolve_binary(root: &Path, binary: &str) -> String {
    let path = Path::new(binary);
    if path.is_absolute() || path.components().count() < 2 {
        return binary.to_string();
    }
    root.join(path).to_string_lossy().into_owned()
}
