//! Operator log on stderr.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "warn,slfsrv=debug"
    } else if verbose {
        "warn,slfsrv=info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the flags.
pub fn init(verbose: bool, debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, debug)));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "warn");
        assert_eq!(default_directive(true, false), "warn,slfsrv=info");
        assert_eq!(default_directive(true, true), "warn,slfsrv=debug");
        assert_eq!(default_directive(false, true), "warn,slfsrv=debug");
    }
}
