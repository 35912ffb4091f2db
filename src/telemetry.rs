use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the JSON structured logger.
///
/// `RUST_LOG` overrides `default_level`. Records emitted through the `log`
/// crate are forwarded to the same subscriber.
pub fn init_telemetry(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .json();

    // A subscriber may already be installed (e.g. by an earlier test)
    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
    {
        eprintln!("Telemetry already initialised: {}", e);
    }
}
