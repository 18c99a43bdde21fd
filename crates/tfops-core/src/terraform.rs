//! Terraform invocations as structured argument lists.

use crate::process::CommandSpec;
use std::path::{Path, PathBuf};

/// Builds every Terraform command the deployer issues, all rooted in one
/// environment directory.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
    var_file: String,
    workdir: PathBuf,
}

impl Terraform {
    pub fn new(binary: impl Into<String>, var_file: impl Into<String>, workdir: &Path) -> Self {
        Self {
            binary: binary.into(),
            var_file: var_file.into(),
            workdir: workdir.to_path_buf(),
        }
    }

    fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandSpec::new(self.binary.clone())
            .args(args)
            .current_dir(self.workdir.clone())
    }

    fn var_file_arg(&self) -> String {
        format!("-var-file={}", self.var_file)
    }

    pub fn version(&self) -> CommandSpec {
        self.command(["version"])
    }

    pub fn init(&self) -> CommandSpec {
        self.command(["init"])
    }

    pub fn validate(&self) -> CommandSpec {
        self.command(["validate"])
    }

    pub fn fmt(&self) -> CommandSpec {
        self.command(["fmt", "-recursive"])
    }

    pub fn plan(&self, out: Option<&str>) -> CommandSpec {
        let spec = self.command(["plan".to_string(), self.var_file_arg()]);
        match out {
            Some(file) => spec.arg(format!("-out={file}")),
            None => spec,
        }
    }

    /// Apply a saved plan. Terraform does not prompt for saved plans.
    pub fn apply_plan(&self, plan_file: &str) -> CommandSpec {
        self.command(["apply", plan_file])
    }

    pub fn apply_with_vars(&self, auto_approve: bool) -> CommandSpec {
        let spec = self.command(["apply".to_string(), self.var_file_arg()]);
        if auto_approve {
            spec.arg("-auto-approve")
        } else {
            spec
        }
    }

    pub fn destroy(&self, auto_approve: bool) -> CommandSpec {
        let spec = self.command(["destroy".to_string(), self.var_file_arg()]);
        if auto_approve {
            spec.arg("-auto-approve")
        } else {
            spec
        }
    }

    pub fn output_json(&self) -> CommandSpec {
        self.command(["output", "-json"])
    }
}

/// `aws --version`, used only to warn when the companion CLI is missing.
pub fn aws_cli_version(workdir: &Path) -> CommandSpec {
    CommandSpec::new("aws")
        .arg("--version")
        .current_dir(workdir)
}
