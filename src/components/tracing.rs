use std::sync::Once;

use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

const APP_NAME: &str = "notification-dispatcher";

static INIT: Once = Once::new();

/// Installs the JSON subscriber and routes `log` records into it. Safe to call more than once.
pub fn init_telemetry() {
    INIT.call_once(|| {
        if let Err(err) = LogTracer::init() {
            eprintln!("log records won't reach the tracing subscriber: {err}");
        }

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let formatting_layer = BunyanFormattingLayer::new(APP_NAME.into(), std::io::stdout);

        let subscriber = Registry::default()
            .with(env_filter)
            .with(JsonStorageLayer)
            .with(formatting_layer);

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("tracing subscriber already set: {err}");
        }
    });
}
