use clap::Parser;
use tfops_cli::cmd::deploy::{self, DeployArgs};
use tfops_cli::logging;
use tfops_core::deploy::Outcome;

fn main() {
    let args = DeployArgs::parse();
    logging::init_tracing();
    let reporter = logging::reporter(args.no_color);

    match deploy::run(&args, &reporter) {
        Ok(Outcome::Completed) | Ok(Outcome::Cancelled) => {}
        Err(e) => {
            reporter.error(&format!("Deployment failed: {e:#}"));
            std::process::exit(1);
        }
    }
}
