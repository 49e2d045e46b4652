use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Level selection comes from `RUST_LOG`, falling back to `info`. Debug
/// builds use human-readable output; release builds emit JSON so the
/// execution runner's log pipeline can ingest queue events directly.
///
/// Call once at process start; later calls would panic on the global
/// subscriber already being set, so embedders that install their own
/// subscriber should skip this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if cfg!(debug_assertions) {
        builder.with_target(true).init();
    } else {
        builder.json().init();
    }
}
