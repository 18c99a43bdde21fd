use clap::Parser;
use tfops_cli::cmd::setup_backend::{self, SetupBackendArgs};
use tfops_cli::logging;

fn main() {
    let args = SetupBackendArgs::parse();
    logging::init_tracing();
    let reporter = logging::reporter(false);

    match setup_backend::run(&args, &reporter) {
        Ok(report) if report.is_success() => {}
        Ok(_) => std::process::exit(1),
        Err(e) => {
            reporter.error(&format!("Backend setup failed: {e:#}"));
            std::process::exit(1);
        }
    }
}
