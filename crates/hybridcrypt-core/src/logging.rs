//! Logger bootstrap shared by the CLI and the desktop deck.

use env_logger::{Builder, Env};

/// Install the process-wide logger.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies. Calling this more
/// than once keeps the first logger.
pub fn init(default_level: &str) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}
