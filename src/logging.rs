//! Logging setup.
//!
//! Quiet by default (`warn`). `RUST_LOG` takes precedence:
//! ```bash
//! RUST_LOG=debug checkheaders main.c
//! RUST_LOG=checkheaders::parser=trace checkheaders main.c
//! ```

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Initialize logging with `default` as the filter when `RUST_LOG` is unset.
///
/// Only the first call takes effect.
pub fn init_with_level(default: &str) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(default)
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .without_time()
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

pub fn init() {
    init_with_level("warn");
}
