use tfops_core::report::{ReportStyle, Reporter};

/// Diagnostic logging goes to stderr, quiet unless `RUST_LOG` asks for more.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Operator output on stdout. `--no-color` or a non-empty `NO_COLOR` turns
/// styling off.
pub fn reporter(no_color: bool) -> Reporter {
    let env_no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
    Reporter::stdout(ReportStyle {
        color: !(no_color || env_no_color),
        timestamps: true,
    })
}
