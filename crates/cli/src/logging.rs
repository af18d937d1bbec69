use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default level for this workspace's crates, picked from the verbosity flags.
pub fn default_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Build the filter: `RUST_LOG` first, then directives for our own crates.
pub fn build_filter(quiet: bool, verbose: bool) -> EnvFilter {
    let level = default_level(quiet, verbose);
    let mut filter = EnvFilter::from_default_env();
    for target in ["orphan_sweep", "sweep_core"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Install the global subscriber. Events go to stderr so stdout stays clean
/// for reports and `--json` output.
///
/// Calling this twice in one process is a no-op for the second call.
pub fn init_logging(quiet: bool, verbose: bool, json: bool) {
    let filter = build_filter(quiet, verbose);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr).with_target(false)).try_init()
    };

    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
}
