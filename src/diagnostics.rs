use tracing_subscriber::EnvFilter;

/// Environment variable holding the log target selector, e.g.
/// `NG_JEST_LOG=ng_jest_transform=debug`. Unset means diagnostics stay off.
pub const LOG_ENV_VAR: &str = "NG_JEST_LOG";

/// Install the diagnostic subscriber. Safe to call more than once; later
/// calls are no-ops if a global subscriber is already set.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
