use crate::error::{Result, TfopsError};
use crate::paths;
use crate::types::Environment;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// TerraformConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TerraformConfig {
    #[serde(default = "default_binary")]
    pub binary: String,
    #[serde(default = "default_var_file")]
    pub var_file: String,
    #[serde(default = "default_environments_dir")]
    pub environments_dir: String,
}

fn default_binary() -> String {
    "terraform".to_string()
}

fn default_var_file() -> String {
    paths::DEFAULT_VAR_FILE.to_string()
}

fn default_environments_dir() -> String {
    paths::DEFAULT_ENVIRONMENTS_DIR.to_string()
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            var_file: default_var_file(),
            environments_dir: default_environments_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// BackendConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_bucket_prefix")]
    pub bucket_prefix: String,
    #[serde(default = "default_lock_table")]
    pub lock_table: String,
    #[serde(default = "default_poll_secs")]
    pub lock_table_poll_secs: u64,
    #[serde(default = "default_max_polls")]
    pub lock_table_max_polls: u32,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket_prefix() -> String {
    "soc-terraform-state".to_string()
}

fn default_lock_table() -> String {
    "soc-terraform-locks".to_string()
}

// Same cadence as the AWS SDK `table_exists` waiter.
fn default_poll_secs() -> u64 {
    20
}

fn default_max_polls() -> u32 {
    25
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            bucket_prefix: default_bucket_prefix(),
            lock_table: default_lock_table(),
            lock_table_poll_secs: default_poll_secs(),
            lock_table_max_polls: default_max_polls(),
        }
    }
}

impl BackendConfig {
    pub fn bucket_for(&self, env: Environment) -> String {
        format!("{}-{}", self.bucket_prefix, env)
    }

    /// One state bucket per environment, in `Environment::all()` order.
    pub fn bucket_names(&self) -> Vec<String> {
        Environment::all()
            .iter()
            .map(|env| self.bucket_for(*env))
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.lock_table_poll_secs)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub terraform: TerraformConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Config {
    /// Load `tfops.yaml` from `root`. A missing file means all defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Self::from_yaml(&data)
    }

    pub fn from_yaml(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Config::default());
        }
        let cfg: Config = serde_yaml::from_str(data)?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if self.terraform.binary.trim().is_empty() {
            error("terraform.binary must not be empty".to_string());
        }
        if self.terraform.var_file.trim().is_empty() {
            error("terraform.var_file must not be empty".to_string());
        }
        if self.terraform.environments_dir.trim().is_empty() {
            error("terraform.environments_dir must not be empty".to_string());
        }
        if self.backend.region.trim().is_empty() {
            error("backend.region must not be empty".to_string());
        }
        if self.backend.lock_table.trim().is_empty() {
            error("backend.lock_table must not be empty".to_string());
        }
        if self.backend.bucket_prefix.trim().is_empty() {
            error("backend.bucket_prefix must not be empty".to_string());
        } else {
            for bucket in self.backend.bucket_names() {
                if let Some(reason) = bucket_name_problem(&bucket) {
                    error(format!("bucket name '{bucket}' is invalid: {reason}"));
                }
            }
        }

        if self.backend.lock_table_max_polls == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "backend.lock_table_max_polls=0: lock table readiness will never be observed"
                    .to_string(),
            });
        }

        warnings
    }

    /// Fail on the first `Error`-level warning.
    pub fn ensure_valid(&self) -> Result<Vec<ConfigWarning>> {
        let warnings = self.validate();
        if let Some(err) = warnings.iter().find(|w| w.level == WarnLevel::Error) {
            return Err(TfopsError::InvalidConfig(err.message.clone()));
        }
        Ok(warnings)
    }
}

fn bucket_name_problem(name: &str) -> Option<&'static str> {
    if name.len() < 3 || name.len() > 63 {
        return Some("must be between 3 and 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Some("only lowercase letters, digits, '.' and '-' are allowed");
    }
    let first = name.chars().next();
    let last = name.chars().last();
    let alnum = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !alnum(first) || !alnum(last) {
        return Some("must start and end with a letter or digit");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.terraform.binary, "terraform");
        assert_eq!(cfg.terraform.var_file, "terraform.tfvars");
        assert_eq!(cfg.backend.region, "us-east-1");
    }

    #[test]
    fn default_bucket_set_covers_every_environment() {
        let cfg = BackendConfig::default();
        assert_eq!(
            cfg.bucket_names(),
            vec![
                "soc-terraform-state-dev",
                "soc-terraform-state-staging",
                "soc-terraform-state-prod",
            ]
        );
        assert_eq!(cfg.lock_table, "soc-terraform-locks");
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let cfg = Config::from_yaml(
            "terraform:\n  binary: /opt/tf/bin/terraform\nbackend:\n  region: eu-west-1\n",
        )
        .unwrap();
        assert_eq!(cfg.terraform.binary, "/opt/tf/bin/terraform");
        assert_eq!(cfg.terraform.environments_dir, "environments");
        assert_eq!(cfg.backend.region, "eu-west-1");
        assert_eq!(cfg.backend.lock_table_max_polls, 25);
    }

    #[test]
    fn load_reads_file_from_root() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("tfops.yaml"),
            "backend:\n  bucket_prefix: acme-state\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.backend.bucket_for(Environment::Prod), "acme-state-prod");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::from_yaml("terraform:\n  bin: terraform\n").is_err());
        assert!(Config::from_yaml("extra: true\n").is_err());
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_rejects_bad_bucket_prefix() {
        let mut cfg = Config::default();
        cfg.backend.bucket_prefix = "SOC_State".to_string();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| w.level == WarnLevel::Error));
        assert!(warnings[0].message.contains("SOC_State-dev"));
        assert!(matches!(
            cfg.ensure_valid(),
            Err(TfopsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_zero_polls_is_only_a_warning() {
        let mut cfg = Config::default();
        cfg.backend.lock_table_max_polls = 0;
        let warnings = cfg.ensure_valid().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }

    #[test]
    fn validate_empty_binary() {
        let mut cfg = Config::default();
        cfg.terraform.binary = "  ".to_string();
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.message.contains("terraform.binary")));
    }
}
