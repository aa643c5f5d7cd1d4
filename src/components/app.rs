use std::sync::Arc;

use crate::{
    dispatcher::{DeliveryMode, NotificationDispatcher},
    metrics::Metrics,
};

use super::{
    configuration::Config,
    health::HealthComponent,
    messaging::{FcmComponent, PushMessenger},
    store::{RealtimeDatabaseComponent, RoomStore},
};

pub struct AppComponents {
    pub health: HealthComponent,
    pub config: Config,
    pub metrics: Arc<Metrics>,
    pub dispatcher: NotificationDispatcher,
}

/// Replacements for the external clients, mainly for tests.
#[derive(Default)]
pub struct CustomComponents {
    pub store: Option<Arc<dyn RoomStore>>,
    pub messenger: Option<Arc<dyn PushMessenger>>,
}

impl AppComponents {
    pub fn new(custom_config: Option<Config>, custom_components: Option<CustomComponents>) -> Self {
        let config = custom_config
            .unwrap_or_else(|| Config::new().expect("Couldn't read the configuration"));
        let custom = custom_components.unwrap_or_default();

        let store = custom
            .store
            .unwrap_or_else(|| AppComponents::init_store_component(&config));
        let messenger = custom
            .messenger
            .unwrap_or_else(|| AppComponents::init_messaging_component(&config));

        let metrics = Arc::new(Metrics::new());
        let health = AppComponents::init_health_component(store.clone());

        let mode = DeliveryMode::from_config(config.delivery.await_delivery);

        let dispatcher = NotificationDispatcher::new(
            store,
            messenger,
            metrics.clone(),
            mode,
            config.messaging.android_icon.clone(),
        );

        Self {
            health,
            config,
            metrics,
            dispatcher,
        }
    }

    fn init_health_component(store: Arc<dyn RoomStore>) -> HealthComponent {
        let mut health = HealthComponent::default();
        health.register_store("realtime_database", store);
        health
    }

    fn init_store_component(config: &Config) -> Arc<dyn RoomStore> {
        Arc::new(RealtimeDatabaseComponent::new(
            config.store.url.clone(),
            config.store.auth_token.clone(),
        ))
    }

    fn init_messaging_component(config: &Config) -> Arc<dyn PushMessenger> {
        Arc::new(FcmComponent::new(
            config.messaging.url.clone(),
            config.messaging.project_id.clone(),
            config.messaging.access_token.clone(),
        ))
    }
}
