use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter, e.g. `suggest=debug`.
pub const LOG_ENV: &str = "SUGGEST_LOG";

/// Filter used when `SUGGEST_LOG` is unset: quiet by default, louder per `-v`.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,suggest=info",
        2 => "info,suggest=debug",
        _ => "debug,suggest=trace",
    }
}

/// Installs the global subscriber, writing to stderr so stdout stays clean
/// for command output. Safe to call more than once.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
