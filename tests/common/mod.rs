use std::sync::{Arc, Mutex};

use actix_web::{body::MessageBody, dev::ServiceFactory, web::Data, App};
use async_trait::async_trait;
use mockall::mock;
use notification_dispatcher::{
    components::{
        app::{AppComponents, CustomComponents},
        configuration::{Args, Config},
        messaging::{BatchResponse, MulticastMessage, PushMessenger, SendResponse},
        store::RoomStore,
    },
    dispatcher::{DeliveryMode, NotificationDispatcher},
    domain::{
        error::{MessagingError, StoreError},
        room::{Room, UserProfile},
    },
    get_app_router,
    metrics::Metrics,
};
use serde_json::json;

mock! {
    pub Store {}

    #[async_trait]
    impl RoomStore for Store {
        async fn get_room(&self, room_id: &str) -> Result<Option<Room>, StoreError>;
        async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
        async fn ping(&self) -> bool;
    }
}

mock! {
    pub Messenger {}

    #[async_trait]
    impl PushMessenger for Messenger {
        async fn send_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse, MessagingError>;
    }
}

pub fn get_configuration() -> Config {
    let mut config = Config::from_args(Args::default()).expect("Couldn't read the configuration");
    config.wkc_metrics_bearer_token = String::new();
    config.trigger_token = String::new();
    config.delivery.await_delivery = true;
    config
}

/// Room `r1` with `u1` ("Ann") and `u2` ("Bo").
pub fn two_user_room() -> Room {
    room_from(json!({
        "users": {
            "u1": { "name": "Ann", "selectedFlower": "rose", "selectedFeeling": "calm" },
            "u2": { "name": "Bo", "selectedFlower": "tulip" }
        },
        "messages": {},
        "zoneStatus": {}
    }))
}

pub fn room_from(value: serde_json::Value) -> Room {
    serde_json::from_value(value).expect("to be a room")
}

/// Store answering with `room` for `r1` and the given tokens for both participants.
pub fn store_with(room: Option<Room>, tokens: Option<Vec<&'static str>>) -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_get_room()
        .returning(move |room_id| Ok(if room_id == "r1" { room.clone() } else { None }));
    store.expect_get_user_profile().returning(move |user_id| {
        Ok(match (&tokens, user_id) {
            (Some(tokens), "u1" | "u2") => Some(UserProfile::with_tokens(tokens)),
            _ => None,
        })
    });
    store.expect_ping().returning(|| true);
    store
}

/// Messenger that accepts everything and keeps what it was asked to send.
pub fn recording_messenger() -> (MockMessenger, Arc<Mutex<Vec<MulticastMessage>>>) {
    let sent = Arc::new(Mutex::new(vec![]));
    let recorded = sent.clone();

    let mut messenger = MockMessenger::new();
    messenger.expect_send_multicast().returning(move |message| {
        recorded.lock().unwrap().push(message.clone());
        Ok(accepted(message))
    });

    (messenger, sent)
}

pub fn accepted(message: &MulticastMessage) -> BatchResponse {
    BatchResponse::from_responses(
        message
            .tokens
            .iter()
            .map(|token| SendResponse {
                token: token.clone(),
                message_id: Some(format!("projects/test/messages/{token}")),
                error: None,
            })
            .collect(),
    )
}

pub fn build_dispatcher(store: MockStore, messenger: MockMessenger, mode: DeliveryMode) -> NotificationDispatcher {
    build_dispatcher_with_metrics(store, messenger, mode, Arc::new(Metrics::new()))
}

pub fn build_dispatcher_with_metrics(
    store: MockStore,
    messenger: MockMessenger,
    mode: DeliveryMode,
    metrics: Arc<Metrics>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Arc::new(store),
        Arc::new(messenger),
        metrics,
        mode,
        "notification_icon".to_string(),
    )
}

pub fn get_app_data(config: Config, store: MockStore, messenger: MockMessenger) -> Data<AppComponents> {
    let components = CustomComponents {
        store: Some(Arc::new(store)),
        messenger: Some(Arc::new(messenger)),
    };
    Data::new(AppComponents::new(Some(config), Some(components)))
}

pub fn get_app(
    app_data: &Data<AppComponents>,
) -> App<
    impl ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    get_app_router(app_data)
}
