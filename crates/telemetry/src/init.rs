// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Initializes the global `tracing` subscriber.
///
/// `json` selects one JSON object per line; otherwise a compact human-readable
/// format is used. `RUST_LOG` takes precedence over `default_filter`. Records
/// emitted through the `log` facade are bridged into the subscriber.
pub fn init_tracing(json: bool, default_filter: &str) -> Result<(), anyhow::Error> {
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    });
    let compact_layer = (!json).then(|| {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
    });
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    let subscriber = Registry::default()
        .with(filter)
        .with(json_layer)
        .with(compact_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
