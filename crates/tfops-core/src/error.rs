use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TfopsError {
    #[error("unknown environment '{0}': expected one of dev, staging, prod")]
    UnknownEnvironment(String),

    #[error("unknown action '{0}': expected one of plan, apply, destroy, validate, format, output")]
    UnknownAction(String),

    #[error("environment '{name}' not found at {}", path.display())]
    EnvironmentNotFound { name: String, path: PathBuf },

    #[error("{} not found at {}", file, path.display())]
    VarFileMissing { file: String, path: PathBuf },

    #[error("Terraform not found ({0}). Please install Terraform.")]
    TerraformNotFound(String),

    #[error("failed to start '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("command failed with exit code {}: {command}{}", code_label(*code), stderr_suffix(stderr))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("AWS credentials not found. Please configure AWS CLI. ({0})")]
    CredentialsNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn code_label(code: Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\nError output: {trimmed}")
    }
}

pub type Result<T> = std::result::Result<T, TfopsError>;
