//! Stderr logging for the estimator CLI.
//!
//! The live fetch pulls in the HTTP and TLS stacks and the HTML parser, which
//! are chatty at debug level. Their targets are pinned to `warn` so
//! `SME_LOG_LEVEL=debug` shows the scraper and planner decisions only.

use std::io::IsTerminal;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Dependency targets held at `warn` regardless of the base level.
pub const NOISY_MODULES: &[&str] = &[
    "hyper",
    "hyper_util",
    "reqwest",
    "h2",
    "rustls",
    "html5ever",
    "selectors",
];

/// Build the filter directive string for a base level.
fn build_directives(log_level: &str) -> String {
    let mut directives = String::from(log_level);

    for module in NOISY_MODULES {
        directives.push_str(&format!(",{}=warn", module));
    }

    directives
}

/// `RUST_LOG` wins when it is set.
fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::new(build_directives(log_level))
}

/// Install the process-wide subscriber for the CLI.
///
/// Everything is written to stderr; stdout carries only the decision table or
/// `--json` output. `log_format` is `"json"` or `"pretty"`, and any other
/// value falls back to pretty with a warning. A second call keeps the first
/// subscriber.
pub fn init_logging(log_level: &str, log_format: &str) {
    let subscriber = tracing_subscriber::registry().with(build_filter(log_level));
    let json = log_format.eq_ignore_ascii_case("json");

    if json {
        // One object per event; the engine opens no spans.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .with_span_list(false)
            .with_target(true);
        let _ = subscriber.with(fmt_layer).try_init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_target(false);
        let _ = subscriber.with(fmt_layer).try_init();
    }

    if !json && !log_format.eq_ignore_ascii_case("pretty") {
        tracing::warn!(log_format = %log_format, "Unknown log format, using pretty");
    }
    tracing::debug!(log_level = %log_level, json, "Logging initialized");
}
