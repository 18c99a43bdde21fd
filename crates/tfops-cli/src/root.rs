use std::path::{Path, PathBuf};
use tfops_core::paths;

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `TFOPS_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `tfops.yaml` or `environments/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    discover_from(&cwd)
}

fn discover_from(start: &Path) -> PathBuf {
    let is_project = |dir: &Path| {
        dir.join(paths::CONFIG_FILE).is_file()
            || dir.join(paths::DEFAULT_ENVIRONMENTS_DIR).is_dir()
    };
    if let Some(dir) = start.ancestors().find(|d| is_project(d)) {
        return dir.to_path_buf();
    }
    if let Some(dir) = start.ancestors().find(|d| d.join(".git").is_dir()) {
        return dir.to_path_buf();
    }
    start.to_path_buf()
}
