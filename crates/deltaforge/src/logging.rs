//! Log output for applications embedding deltaforge.
//!
//! The scoring crates only emit `tracing` events; nothing is printed until
//! a subscriber is installed. [`init`] installs a formatting subscriber
//! filtered by `RUST_LOG`, falling back to [`DEFAULT_FILTER`].

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "deltaforge=info";

static INIT: OnceLock<()> = OnceLock::new();

/// Installs the global subscriber.
///
/// Safe to call multiple times - only the first call has effect. A
/// subscriber installed by the application beforehand is left alone.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        install(filter);
    });
}

/// Like [`init`], with an explicit filter such as
/// `"deltaforge_scoring=trace"` instead of `RUST_LOG`.
pub fn init_with_filter(directives: &str) {
    INIT.get_or_init(|| install(EnvFilter::new(directives)));
}

fn install(filter: EnvFilter) {
    let directives = filter.to_string();
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(filter = %directives, "logging initialized");
    }
}
