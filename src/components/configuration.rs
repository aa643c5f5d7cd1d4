use clap::Parser;
use config::{ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Parser, Debug, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Host
    #[clap(long, value_parser)]
    pub host: Option<String>,

    /// Port to expose the server
    #[clap(short, long, value_parser)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub auth_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MessagingConfig {
    pub url: String,
    pub project_id: String,
    pub access_token: String,
    pub android_icon: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeliveryConfig {
    /// Wait for the push submission before answering the trigger.
    pub await_delivery: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub messaging: MessagingConfig,
    pub delivery: DeliveryConfig,
    pub env: String, // prd / stg / dev
    pub wkc_metrics_bearer_token: String,
    pub trigger_token: String,
}

const ENV_PREFIX: &str = "DISPATCHER";

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        log::debug!("Args: {:#?}", args);

        Self::from_args(args)
    }

    /// Builds the configuration from `configuration.toml`, `DISPATCHER_*` variables and `args`.
    ///
    /// Nested keys use a double underscore, e.g. `DISPATCHER_STORE__AUTH_TOKEN`.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", args.host)?
            .set_override_option("server.port", args.port.map(i64::from))?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("store.url", "http://127.0.0.1:9000")? // emulator -> local env
            .set_default("store.auth_token", "")?
            .set_default("messaging.url", "https://fcm.googleapis.com")?
            .set_default("messaging.project_id", "local-project")?
            .set_default("messaging.access_token", "")?
            .set_default("messaging.android_icon", "notification_icon")?
            .set_default("delivery.await_delivery", true)?
            .set_default("env", "dev")?
            .set_default("wkc_metrics_bearer_token", "")?
            .set_default("trigger_token", "")?
            .build()?;

        config.try_deserialize()
    }
}
