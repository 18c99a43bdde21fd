use clap::Parser;
use std::path::PathBuf;
use tfops_aws::AwsBackend;
use tfops_core::bootstrap::{BootstrapPlan, BootstrapReport, Bootstrapper};
use tfops_core::report::Reporter;

#[derive(Parser, Debug)]
#[command(
    name = "setup-backend",
    about = "Create the S3 state buckets and DynamoDB lock table for the Terraform backend",
    version
)]
pub struct SetupBackendArgs {
    /// Project root holding tfops.yaml
    #[arg(long, env = "TFOPS_ROOT", hide = true)]
    pub root: Option<PathBuf>,
}

pub fn run(args: &SetupBackendArgs, reporter: &Reporter) -> anyhow::Result<BootstrapReport> {
    reporter.line("🚀 Setting up AWS resources for the Terraform backend...");

    let root = crate::root::resolve_root(args.root.as_deref());
    let config = super::load_config(&root, reporter)?;
    let region = &config.backend.region;

    let backend = AwsBackend::connect(region)?;
    reporter.success(&format!("AWS clients initialized for region: {}", backend.region()));

    let bootstrapper = Bootstrapper::new(&backend, reporter);
    let report = bootstrapper.run(&BootstrapPlan::from_config(&config.backend));
    bootstrapper.print_summary(&report);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        SetupBackendArgs::command().debug_assert();
    }

    #[test]
    fn takes_no_operational_flags() {
        assert!(SetupBackendArgs::try_parse_from(["setup-backend", "--force"]).is_err());
        assert!(SetupBackendArgs::try_parse_from(["setup-backend"]).is_ok());
    }
}
