use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber. `-v` flags take precedence over
/// `RUST_LOG`, which takes precedence over the default `info` level.
pub fn initialize(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
