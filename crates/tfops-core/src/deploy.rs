//! Deployment sequencing for one environment.
//!
//! Order per run: prerequisites, optional `terraform init`, then the action.
//! `apply` always plans first; `apply` and `destroy` pass through the
//! confirmation gate unless the run is unattended.

use crate::config::TerraformConfig;
use crate::error::{Result, TfopsError};
use crate::outputs::{self, Outputs};
use crate::paths;
use crate::process::{Capture, CommandOutput, CommandRunner, CommandSpec};
use crate::prompt::Confirm;
use crate::report::Reporter;
use crate::terraform::{self, Terraform};
use crate::types::{Action, Environment};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the confirmation gate and pass `-auto-approve` where applicable.
    pub auto_approve: bool,
    pub skip_init: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The operator declined at the confirmation gate. Not a failure.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prerequisites {
    pub terraform_version: String,
    pub aws_cli_version: Option<String>,
}

pub struct Deployer<'a> {
    environment: Environment,
    env_dir: PathBuf,
    var_file: String,
    terraform: Terraform,
    runner: &'a dyn CommandRunner,
    reporter: &'a Reporter,
}

impl<'a> Deployer<'a> {
    /// Resolve the environment directory under `root`; it must exist.
    pub fn new(
        root: &Path,
        config: &TerraformConfig,
        environment: Environment,
        runner: &'a dyn CommandRunner,
        reporter: &'a Reporter,
    ) -> Result<Self> {
        let env_dir = paths::environment_dir(root, &config.environments_dir, environment);
        if !env_dir.is_dir() {
            return Err(TfopsError::EnvironmentNotFound {
                name: environment.to_string(),
                path: env_dir,
            });
        }
        Ok(Self {
            environment,
            terraform: Terraform::new(
                paths::resolve_binary(root, &config.binary),
                config.var_file.clone(),
                &env_dir,
            ),
            var_file: config.var_file.clone(),
            env_dir,
            runner,
            reporter,
        })
    }

    pub fn run(
        &self,
        action: Action,
        options: RunOptions,
        confirm: &mut dyn Confirm,
    ) -> Result<Outcome> {
        tracing::debug!(environment = %self.environment, %action, ?options, "deploy run");
        self.check_prerequisites()?;

        if !options.skip_init {
            self.init()?;
        }

        // Apply always plans before the operator is asked.
        let plan_file = match action {
            Action::Apply => Some(self.plan()?),
            _ => None,
        };

        if action.is_gated() && !options.auto_approve {
            let question = self.confirmation_question(action);
            if !confirm.confirm(self.reporter, &question)? {
                self.reporter.warn(&format!(
                    "{} cancelled by user",
                    capitalize(action.as_str())
                ));
                return Ok(Outcome::Cancelled);
            }
        }

        match action {
            Action::Validate => self.validate()?,
            Action::Format => self.format()?,
            Action::Plan => {
                self.plan()?;
            }
            Action::Apply => {
                self.apply(plan_file.as_deref(), options.auto_approve)?;
                self.output();
            }
            Action::Destroy => self.destroy(options.auto_approve)?,
            Action::Output => {
                self.output();
            }
        }

        self.reporter.success(&format!(
            "Action '{}' completed successfully for environment '{}'",
            action, self.environment
        ));
        Ok(Outcome::Completed)
    }

    fn confirmation_question(&self, action: Action) -> String {
        match action {
            Action::Destroy => format!(
                "⚠️  Are you sure you want to DESTROY all resources in {}?",
                self.environment
            ),
            _ => format!(
                "Do you want to {action} these changes to {}?",
                self.environment
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Terraform and the variables file are required; the AWS CLI is not.
    pub fn check_prerequisites(&self) -> Result<Prerequisites> {
        self.reporter.info("Checking prerequisites...");

        let version = self.terraform.version();
        let terraform_version = match self.execute(&version, Capture::Piped) {
            Ok(out) => out.stdout.lines().next().unwrap_or_default().trim().to_string(),
            Err(e) => return Err(TfopsError::TerraformNotFound(e.to_string())),
        };
        self.reporter
            .success(&format!("Terraform found: {terraform_version}"));

        let aws_cli_version = match self.execute(
            &terraform::aws_cli_version(&self.env_dir),
            Capture::Piped,
        ) {
            Ok(out) => {
                let version = out.stdout.trim().to_string();
                self.reporter.success(&format!("AWS CLI found: {version}"));
                Some(version)
            }
            Err(e) => {
                tracing::warn!(error = %e, "aws cli unavailable");
                self.reporter
                    .warn("AWS CLI not found. Make sure AWS credentials are configured.");
                None
            }
        };

        let var_file = paths::var_file_path(&self.env_dir, &self.var_file);
        if !var_file.is_file() {
            return Err(TfopsError::VarFileMissing {
                file: self.var_file.clone(),
                path: var_file,
            });
        }

        self.reporter.success("Prerequisites check completed");
        Ok(Prerequisites {
            terraform_version,
            aws_cli_version,
        })
    }

    pub fn init(&self) -> Result<()> {
        self.reporter.info("Initializing Terraform...");
        self.execute(&self.terraform.init(), Capture::Inherit)?;
        self.reporter.success("Terraform initialized");
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.reporter.info("Validating Terraform configuration...");
        self.execute(&self.terraform.validate(), Capture::Inherit)?;
        self.reporter.success("Configuration is valid");
        Ok(())
    }

    pub fn format(&self) -> Result<()> {
        self.reporter.info("Formatting Terraform configuration...");
        self.execute(&self.terraform.fmt(), Capture::Inherit)?;
        self.reporter.success("Configuration formatted");
        Ok(())
    }

    /// Plan into a fresh artifact and return its file name.
    pub fn plan(&self) -> Result<String> {
        self.reporter.info("Running Terraform plan...");
        let plan_file =
            paths::plan_artifact_name(self.environment, chrono::Utc::now().timestamp());
        self.execute(&self.terraform.plan(Some(&plan_file)), Capture::Inherit)?;
        self.reporter.success("Terraform plan completed");
        Ok(plan_file)
    }

    /// Apply a saved plan when it exists on disk, otherwise apply straight
    /// from the variables file.
    pub fn apply(&self, plan_file: Option<&str>, auto_approve: bool) -> Result<()> {
        self.reporter.info("Applying Terraform configuration...");
        let spec = match plan_file {
            Some(file) if self.env_dir.join(file).is_file() => self.terraform.apply_plan(file),
            Some(file) => {
                tracing::debug!(plan = file, "plan artifact missing, applying from variables");
                self.terraform.apply_with_vars(auto_approve)
            }
            None => self.terraform.apply_with_vars(auto_approve),
        };
        self.execute(&spec, Capture::Inherit)?;
        self.reporter.success("Terraform apply completed");
        Ok(())
    }

    pub fn destroy(&self, auto_approve: bool) -> Result<()> {
        self.reporter.info("Destroying Terraform infrastructure...");
        self.execute(&self.terraform.destroy(auto_approve), Capture::Inherit)?;
        self.reporter.success("Terraform destroy completed");
        Ok(())
    }

    /// Print outputs. Never fails: any problem degrades to a warning and an
    /// empty result.
    pub fn output(&self) -> Outputs {
        self.reporter.info("Getting Terraform outputs...");
        let parsed = self
            .execute(&self.terraform.output_json(), Capture::Piped)
            .and_then(|out| outputs::parse_outputs(&out.stdout));
        match parsed {
            Ok(values) => {
                self.reporter.success("Infrastructure outputs:");
                for (name, text) in outputs::display_lines(&values) {
                    self.reporter.line(&format!("  {name}: {text}"));
                }
                values
            }
            Err(e) => {
                tracing::warn!(error = %e, "terraform output unavailable");
                self.reporter.warn("Could not retrieve outputs");
                Outputs::new()
            }
        }
    }

    fn execute(&self, spec: &CommandSpec, capture: Capture) -> Result<CommandOutput> {
        self.reporter.info(&format!("Running: {spec}"));
        self.runner.run(spec, capture)?.check(spec)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
