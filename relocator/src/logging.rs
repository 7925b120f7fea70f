//! Diagnostic tracing for the relocator binary.
//!
//! Library code only emits `tracing` events. The subscriber is installed once
//! by `main`, and the per-run summary travels in
//! [`InstantiateReport`](crate::instantiate::InstantiateReport) instead of
//! global state.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=relocator=debug relocator example.com/acme/payouts
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn init_installs_global_subscriber() {
        init();
        assert!(tracing::dispatcher::has_been_set());
        tracing::warn!("subscriber installed");
    }
}
