use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::Parser;
use std::path::PathBuf;
use tfops_core::deploy::{Deployer, Outcome, RunOptions};
use tfops_core::process::SystemRunner;
use tfops_core::prompt::LineConfirm;
use tfops_core::report::Reporter;
use tfops_core::types::{Action, Environment};

#[derive(Parser, Debug)]
#[command(
    name = "deploy",
    about = "Plan, apply, destroy, validate, format or inspect a Terraform environment",
    version,
    after_help = "Examples:\n  deploy --environment dev --action plan\n  deploy --environment prod --action apply --auto-approve\n  deploy --environment dev --action destroy\n  deploy --environment staging --action validate"
)]
pub struct DeployArgs {
    /// Target environment
    #[arg(
        long,
        short = 'e',
        value_parser = PossibleValuesParser::new(Environment::names())
            .try_map(|s| s.parse::<Environment>())
    )]
    pub environment: Environment,

    /// Action to perform
    #[arg(
        long,
        short = 'a',
        value_parser = PossibleValuesParser::new(Action::names())
            .try_map(|s| s.parse::<Action>())
    )]
    pub action: Action,

    /// Skip interactive approval for apply/destroy
    #[arg(long)]
    pub auto_approve: bool,

    /// Skip terraform init
    #[arg(long)]
    pub skip_init: bool,

    /// Project root (default: auto-detect from tfops.yaml, environments/ or .git/)
    #[arg(long, env = "TFOPS_ROOT")]
    pub root: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

pub fn run(args: &DeployArgs, reporter: &Reporter) -> anyhow::Result<Outcome> {
    let root = crate::root::resolve_root(args.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved project root");
    let config = super::load_config(&root, reporter)?;

    let runner = SystemRunner;
    let deployer = Deployer::new(
        &root,
        &config.terraform,
        args.environment,
        &runner,
        reporter,
    )?;
    let options = RunOptions {
        auto_approve: args.auto_approve,
        skip_init: args.skip_init,
    };
    let mut confirm = LineConfirm::stdin();
    let outcome = deployer.run(args.action, options, &mut confirm)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        DeployArgs::command().debug_assert();
    }

    #[test]
    fn parses_short_and_long_flags() {
        let args = DeployArgs::try_parse_from([
            "deploy", "-e", "prod", "--action", "destroy", "--auto-approve",
        ])
        .unwrap();
        assert_eq!(args.environment, Environment::Prod);
        assert_eq!(args.action, Action::Destroy);
        assert!(args.auto_approve);
        assert!(!args.skip_init);
    }

    #[test]
    fn rejects_unknown_environment_and_action() {
        assert!(DeployArgs::try_parse_from(["deploy", "-e", "qa", "-a", "plan"]).is_err());
        assert!(DeployArgs::try_parse_from(["deploy", "-e", "dev", "-a", "refresh"]).is_err());
    }

    #[test]
    fn environment_and_action_are_required() {
        assert!(DeployArgs::try_parse_from(["deploy", "-a", "plan"]).is_err());
        assert!(DeployArgs::try_parse_from(["deploy", "-e", "dev"]).is_err());
    }
}
