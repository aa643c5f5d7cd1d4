mod common;
pub use common::*;

use std::{sync::Arc, time::Duration};

use notification_dispatcher::{
    components::messaging::{BatchResponse, SendResponse},
    dispatcher::{resolve_counterpart, DeliveryMode, HandlerOutcome},
    domain::{
        change_event::ChangeEvent,
        error::{Abstention, MessagingError, StoreError},
        trigger::Trigger,
    },
    metrics::Metrics,
};
use serde_json::json;

fn flower_event() -> ChangeEvent {
    ChangeEvent::updated("rooms/r1/users/u1/selectedFlower", json!("rose"), json!("lily"))
}

fn zone_event(before: &str, after: &str) -> ChangeEvent {
    ChangeEvent::updated(
        "rooms/r1/zoneStatus/u1/home",
        json!({ "status": before, "zoneName": "Home" }),
        json!({ "status": after, "zoneName": "Home" }),
    )
}

#[actix_web::test]
async fn flower_selection_notifies_the_counterpart() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes,
        vec![(
            Trigger::FlowerUpdated,
            HandlerOutcome::Notified {
                recipient: "u2".to_string(),
                tokens: 1
            }
        )]
    );

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].tokens, vec!["tok1"]);
    assert_eq!(sent[0].notification.title, "New Flower.");
    assert_eq!(sent[0].notification.body, "Ann selected a new flower.");

    let android = sent[0].android.as_ref().unwrap();
    assert!(android.notification.default_vibrate_timings);
    assert_eq!(android.notification.icon, "notification_icon");
}

#[actix_web::test]
async fn feeling_selection_uses_the_label() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    for feeling in ["inlove", "mysterious"] {
        let event = ChangeEvent::updated(
            "rooms/r1/users/u1/selectedFeeling",
            json!("calm"),
            json!(feeling),
        );
        dispatcher.dispatch(&event).await;
    }

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].notification.title, "Change in the mood.");
    assert_eq!(sent[0].notification.body, "Ann feels in love.");
    assert_eq!(sent[1].notification.body, "Ann feels mysterious.");
}

#[actix_web::test]
async fn feeling_missing_from_the_event_is_read_from_the_room() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let event = ChangeEvent::updated(
        "rooms/r1/users/u1/selectedFeeling",
        json!("sad"),
        serde_json::Value::Null,
    );
    dispatcher.dispatch(&event).await;

    assert_eq!(sent.lock().unwrap()[0].notification.body, "Ann feels calm.");
}

#[actix_web::test]
async fn created_items_use_their_author() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1", "tok2"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let message = ChangeEvent::created(
        "rooms/r1/messages/m1",
        json!({ "uid": "u2", "text": "see you at eight" }),
    );
    let wish = ChangeEvent::created(
        "rooms/r1/wishlist/hiking/w1",
        json!({ "uid": "u1", "title": "Alps" }),
    );
    let entry = ChangeEvent::created(
        "rooms/r1/journal/e1",
        json!({ "authorId": "u1", "content": "dear diary" }),
    );

    for event in [message, wish, entry] {
        let outcomes = dispatcher.dispatch(&event).await;
        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0].1, HandlerOutcome::Notified { tokens: 2, .. }));
    }

    let sent = sent.lock().unwrap();
    assert_eq!(sent[0].notification.title, "New message.");
    assert_eq!(sent[0].notification.body, "Bo sent a new message.");
    assert!(!sent[0].notification.body.contains("eight"));

    assert_eq!(sent[1].notification.title, "New wish.");
    assert_eq!(sent[1].notification.body, "Ann added a new wish.");

    assert_eq!(sent[2].notification.title, "Ann just wrote something 👀");
    assert_eq!(sent[2].notification.body, "There's a new journal entry from Ann.");
    assert!(!sent[2].notification.body.contains("diary"));
}

#[actix_web::test]
async fn created_item_without_author_is_skipped() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let event = ChangeEvent::created("rooms/r1/messages/m1", json!({ "text": "hi" }));
    let outcomes = dispatcher.dispatch(&event).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::ActingUserUnknown)
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn created_item_by_a_stranger_is_skipped() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let event = ChangeEvent::created("rooms/r1/messages/m1", json!({ "uid": "u9", "text": "hi" }));
    let outcomes = dispatcher.dispatch(&event).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::UserDataMissing("r1".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn counterpart_entry_that_is_not_an_object_sends_nothing() {
    let (messenger, sent) = recording_messenger();
    let room = room_from(json!({ "users": { "u1": { "name": "Ann" }, "u2": "Bo" } }));
    let dispatcher = build_dispatcher(store_with(Some(room), Some(vec!["tok1"])), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::UserDataMissing("r1".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn unreadable_feeling_does_not_block_other_triggers() {
    let (messenger, sent) = recording_messenger();
    let room = room_from(json!({
        "users": {
            "u1": { "name": "Ann", "selectedFeeling": 3 },
            "u2": { "name": "Bo", "selectedFeeling": { "key": "calm" } }
        }
    }));
    let dispatcher = build_dispatcher(store_with(Some(room), Some(vec!["tok1"])), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert!(matches!(outcomes[0].1, HandlerOutcome::Notified { tokens: 1, .. }));
    assert_eq!(sent.lock().unwrap()[0].notification.body, "Ann selected a new flower.");
}

#[actix_web::test]
async fn missing_room_sends_nothing() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(store_with(None, Some(vec!["tok1"])), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::RoomNotFound("r1".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn solo_room_sends_nothing() {
    let (messenger, sent) = recording_messenger();
    let room = room_from(json!({ "users": { "u1": { "name": "Ann" } } }));
    let dispatcher = build_dispatcher(store_with(Some(room), Some(vec!["tok1"])), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::NoCounterpart("r1".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_users_send_nothing() {
    let (messenger, sent) = recording_messenger();
    let room = room_from(json!({ "users": ["u1", "u2"] }));
    let dispatcher = build_dispatcher(store_with(Some(room), Some(vec!["tok1"])), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::UsersMissing("r1".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn nameless_user_sends_nothing() {
    let rooms = [
        json!({ "users": { "u1": { "name": "Ann" }, "u2": { "selectedFlower": "tulip" } } }),
        json!({ "users": { "u1": { "name": "" }, "u2": { "name": "Bo" } } }),
    ];

    for room in rooms {
        let (messenger, sent) = recording_messenger();
        let dispatcher = build_dispatcher(
            store_with(Some(room_from(room)), Some(vec!["tok1"])),
            messenger,
            DeliveryMode::Awaited,
        );

        let outcomes = dispatcher.dispatch(&flower_event()).await;

        assert_eq!(
            outcomes[0].1,
            HandlerOutcome::Skipped(Abstention::NameMissing("r1".to_string()))
        );
        assert!(sent.lock().unwrap().is_empty());
    }
}

#[actix_web::test]
async fn counterpart_without_tokens_gets_nothing() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(store_with(Some(two_user_room()), Some(vec![])), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::NoTokens("u2".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn counterpart_without_profile_gets_nothing() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(store_with(Some(two_user_room()), None), messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert_eq!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::ProfileNotFound("u2".to_string()))
    );
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn store_failures_are_absorbed() {
    let mut store = MockStore::new();
    store.expect_get_room().returning(|_| {
        Err(StoreError::Status {
            status: 503,
            path: "rooms/r1".to_string(),
        })
    });
    store.expect_get_user_profile().never();

    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(store, messenger, DeliveryMode::Awaited);

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert!(matches!(
        outcomes[0].1,
        HandlerOutcome::Skipped(Abstention::StoreUnavailable(_))
    ));
    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn zone_arrival_and_departure_fire_once() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let arrival = dispatcher.dispatch(&zone_event("outside", "inside")).await;
    assert_eq!(arrival.len(), 2);
    assert!(matches!(arrival[0], (Trigger::ZoneEntered, HandlerOutcome::Notified { .. })));
    assert_eq!(arrival[1], (Trigger::ZoneExited, HandlerOutcome::NotApplicable));

    let departure = dispatcher.dispatch(&zone_event("inside", "outside")).await;
    assert_eq!(departure[0], (Trigger::ZoneEntered, HandlerOutcome::NotApplicable));
    assert!(matches!(departure[1], (Trigger::ZoneExited, HandlerOutcome::Notified { .. })));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].notification.title, "Zone arrival");
    assert_eq!(sent[0].notification.body, "Ann arrived at Home");
    assert_eq!(sent[1].notification.title, "Zone departure");
    assert_eq!(sent[1].notification.body, "Ann left Home");
}

#[actix_web::test]
async fn zone_without_transition_fires_nothing() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    for (before, after) in [("inside", "inside"), ("outside", "outside")] {
        let outcomes = dispatcher.dispatch(&zone_event(before, after)).await;
        assert!(outcomes
            .iter()
            .all(|(_, outcome)| *outcome == HandlerOutcome::NotApplicable));
    }

    assert!(sent.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn departure_reads_the_zone_name_it_left() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Awaited,
    );

    let event = ChangeEvent::updated(
        "rooms/r1/zoneStatus/u1/gym",
        json!({ "status": "inside", "zoneName": "Gym" }),
        json!({ "status": "outside" }),
    );
    dispatcher.dispatch(&event).await;

    let nameless = ChangeEvent::updated(
        "rooms/r1/zoneStatus/u1/gym",
        json!({ "status": "outside" }),
        json!({ "status": "inside" }),
    );
    let outcomes = dispatcher.dispatch(&nameless).await;
    assert_eq!(
        outcomes[0],
        (
            Trigger::ZoneEntered,
            HandlerOutcome::Skipped(Abstention::ZoneNameMissing)
        )
    );

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].notification.body, "Ann left Gym");
}

#[actix_web::test]
async fn push_rejection_does_not_change_the_outcome() {
    let mut messenger = MockMessenger::new();
    messenger
        .expect_send_multicast()
        .times(1)
        .returning(|_| Err(MessagingError::InvalidArgument("quota exceeded".to_string())));

    let metrics = Arc::new(Metrics::new());
    let dispatcher = build_dispatcher_with_metrics(
        store_with(Some(two_user_room()), Some(vec!["tok1", "tok2"])),
        messenger,
        DeliveryMode::Awaited,
        metrics.clone(),
    );

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert!(matches!(outcomes[0].1, HandlerOutcome::Notified { .. }));
    assert_eq!(
        metrics
            .delivery_failures_total_collector
            .with_label_values(&["onFlowerUpdated"])
            .get(),
        2
    );
}

#[actix_web::test]
async fn partial_token_failures_are_only_logged() {
    let mut messenger = MockMessenger::new();
    messenger.expect_send_multicast().times(1).returning(|message| {
        Ok(BatchResponse::from_responses(
            message
                .tokens
                .iter()
                .map(|token| SendResponse {
                    token: token.clone(),
                    message_id: None,
                    error: Some("Requested entity was not found.".to_string()),
                })
                .collect(),
        ))
    });

    let metrics = Arc::new(Metrics::new());
    let dispatcher = build_dispatcher_with_metrics(
        store_with(Some(two_user_room()), Some(vec!["stale"])),
        messenger,
        DeliveryMode::Awaited,
        metrics.clone(),
    );

    let outcomes = dispatcher.dispatch(&flower_event()).await;

    assert!(matches!(outcomes[0].1, HandlerOutcome::Notified { tokens: 1, .. }));
    assert_eq!(
        metrics
            .delivery_failures_total_collector
            .with_label_values(&["onFlowerUpdated"])
            .get(),
        1
    );
    assert!(metrics
        .encode()
        .contains("notification_dispatcher_delivery_failures_total{trigger=\"onFlowerUpdated\"} 1"));
}

#[actix_web::test]
async fn detached_delivery_still_sends() {
    let (messenger, sent) = recording_messenger();
    let dispatcher = build_dispatcher(
        store_with(Some(two_user_room()), Some(vec!["tok1"])),
        messenger,
        DeliveryMode::Detached,
    );

    let outcomes = dispatcher.dispatch(&flower_event()).await;
    assert!(matches!(outcomes[0].1, HandlerOutcome::Notified { .. }));

    for _ in 0..50 {
        if !sent.lock().unwrap().is_empty() {
            break;
        }
        actix_web::rt::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[actix_web::test]
async fn unwatched_reference_runs_no_handler() {
    let (messenger, _) = recording_messenger();
    let mut store = MockStore::new();
    store.expect_get_room().never();

    let dispatcher = build_dispatcher(store, messenger, DeliveryMode::Awaited);
    let event = ChangeEvent::updated("rooms/r1/settings/theme", json!("dark"), json!("light"));

    assert!(dispatcher.dispatch(&event).await.is_empty());
}

#[actix_web::test]
async fn resolves_the_counterpart_of_either_side() {
    let store = Arc::new(store_with(Some(two_user_room()), Some(vec!["tok1"])));

    let counterpart = resolve_counterpart(store.as_ref(), "r1", "u2").await.unwrap();

    assert_eq!(counterpart.acting_user_name, "Bo");
    assert_eq!(counterpart.other_user_id, "u1");
    assert_eq!(counterpart.other_user_name, "Ann");
    assert_eq!(counterpart.tokens, vec!["tok1"]);
}
