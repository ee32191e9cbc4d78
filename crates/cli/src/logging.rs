use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// levels. Logs go to stderr so stdout stays clean for results.
pub fn init_logging(config: &LoggingConfig) {
    let level = if config.verbose {
        "debug"
    } else {
        config.levels.directive()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let show_file = config.format.location.show_file;
    let show_line = config.format.location.show_line;

    // Use Layer::boxed() to unify the types of the branches
    let fmt_layer = if config.format.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_file(show_file)
            .with_line_number(show_line)
            .boxed()
    } else if !config.format.show_time {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(show_file)
            .with_file(show_file)
            .with_line_number(show_line)
            .without_time()
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(show_file)
            .with_file(show_file)
            .with_line_number(show_line)
            .boxed()
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("warning: a tracing subscriber was already installed");
    }
}
