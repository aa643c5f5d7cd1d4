use std::sync::Arc;

use serde_json::Value;

use crate::{
    components::{
        messaging::{AndroidConfig, AndroidNotification, MulticastMessage, PushMessenger},
        store::RoomStore,
    },
    domain::{
        change_event::ChangeEvent,
        error::Abstention,
        notification::NotificationContent,
        trigger::{PathParams, Trigger},
        zone::{ZoneStatus, ZoneTransition},
    },
    metrics::Metrics,
};

use super::{
    counterpart::{resolve_counterpart, Counterpart},
    delivery::{Delivery, DeliveryMode},
};

/// Result of running one handler for one change event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// A multicast was handed to delivery for the counterpart's devices.
    Notified { recipient: String, tokens: usize },
    /// Preconditions failed, nobody is notified.
    Skipped(Abstention),
    /// The change isn't one this handler reacts to, e.g. a zone update without the watched edge.
    NotApplicable,
}

impl HandlerOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Notified { .. } => "notified",
            Self::Skipped(_) => "skipped",
            Self::NotApplicable => "not_applicable",
        }
    }
}

/// Who acted and what to tell the other participant.
struct Plan {
    acting_user_id: String,
    content: NotificationContent,
}

/// Reacts to room changes by pushing a notification to the other participant.
///
/// Holds no state across invocations, concurrent events are handled independently.
pub struct NotificationDispatcher {
    store: Arc<dyn RoomStore>,
    delivery: Delivery,
    metrics: Arc<Metrics>,
    android_icon: String,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn RoomStore>,
        messenger: Arc<dyn PushMessenger>,
        metrics: Arc<Metrics>,
        mode: DeliveryMode,
        android_icon: String,
    ) -> Self {
        Self {
            store,
            delivery: Delivery::new(messenger, metrics.clone(), mode),
            metrics,
            android_icon,
        }
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery.mode()
    }

    /// Runs every handler whose path pattern and change kind accept the event.
    pub async fn dispatch(&self, event: &ChangeEvent) -> Vec<(Trigger, HandlerOutcome)> {
        let matching = Trigger::matching(&event.reference, event.kind);
        if matching.is_empty() {
            log::debug!("No trigger watches {}, ignoring", event.reference);
        }

        let mut outcomes = Vec::with_capacity(matching.len());
        for (trigger, params) in matching {
            let outcome = self.handle(trigger, &params, event).await;
            outcomes.push((trigger, outcome));
        }
        outcomes
    }

    #[tracing::instrument(
        name = "Handle change event",
        skip(self, trigger, params, event),
        fields(trigger = trigger.name(), reference = %event.reference)
    )]
    pub async fn handle(
        &self,
        trigger: Trigger,
        params: &PathParams,
        event: &ChangeEvent,
    ) -> HandlerOutcome {
        self.metrics.record_event(trigger);

        let room_id = match params.get("roomId") {
            Some(room_id) => room_id,
            None => return HandlerOutcome::NotApplicable,
        };

        let plan = match plan(trigger, params, event) {
            Ok(Some(plan)) => plan,
            Ok(None) => return HandlerOutcome::NotApplicable,
            Err(abstention) => return self.abstain(trigger, abstention),
        };

        log::debug!(
            "[{}] User {} changed {} in room {}",
            trigger.name(),
            plan.acting_user_id,
            event.reference,
            room_id
        );

        let counterpart =
            match resolve_counterpart(self.store.as_ref(), room_id, &plan.acting_user_id).await {
                Ok(counterpart) => counterpart,
                Err(abstention) => return self.abstain(trigger, abstention),
            };

        let content = with_stored_feeling(plan.content, &counterpart);
        let message = self.compose(&content, &counterpart);

        log::debug!(
            "[{}] Sending notification to {}",
            trigger.name(),
            counterpart.other_user_name
        );

        let tokens = message.tokens.len();
        self.metrics.record_notification_sent(trigger);
        self.delivery.deliver(trigger, message).await;

        HandlerOutcome::Notified {
            recipient: counterpart.other_user_id,
            tokens,
        }
    }

    fn compose(&self, content: &NotificationContent, counterpart: &Counterpart) -> MulticastMessage {
        MulticastMessage {
            tokens: counterpart.tokens.clone(),
            notification: content.render(&counterpart.acting_user_name),
            android: Some(AndroidConfig {
                notification: AndroidNotification {
                    default_vibrate_timings: true,
                    icon: self.android_icon.clone(),
                },
            }),
        }
    }

    fn abstain(&self, trigger: Trigger, abstention: Abstention) -> HandlerOutcome {
        if abstention.is_routine() {
            log::debug!("[{}] {}, skipping notification", trigger.name(), abstention);
        } else {
            log::warn!("[{}] {}, skipping notification", trigger.name(), abstention);
        }
        self.metrics.record_abstention(trigger, &abstention);
        HandlerOutcome::Skipped(abstention)
    }
}

/// Decides the acting user and the content. `Ok(None)` means the handler doesn't fire.
fn plan(
    trigger: Trigger,
    params: &PathParams,
    event: &ChangeEvent,
) -> Result<Option<Plan>, Abstention> {
    let path_user = || params.get("userId").map(str::to_string);

    let (acting_user_id, content) = match trigger {
        Trigger::FlowerUpdated => (path_user(), NotificationContent::FlowerSelected),
        Trigger::FeelingUpdated => (
            path_user(),
            NotificationContent::FeelingSelected {
                feeling: event
                    .after
                    .as_ref()
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
        ),
        Trigger::NewMessage => (
            event.after_field("uid").map(str::to_string),
            NotificationContent::MessageSent,
        ),
        Trigger::NewWish => (
            event.after_field("uid").map(str::to_string),
            NotificationContent::WishAdded,
        ),
        Trigger::NewJournalEntry => (
            event.after_field("authorId").map(str::to_string),
            NotificationContent::JournalEntryWritten,
        ),
        Trigger::ZoneEntered | Trigger::ZoneExited => {
            let before = ZoneStatus::from_snapshot(event.before.as_ref());
            let after = ZoneStatus::from_snapshot(event.after.as_ref());

            let expected = if trigger == Trigger::ZoneEntered {
                ZoneTransition::Entered
            } else {
                ZoneTransition::Exited
            };
            if ZoneTransition::detect(before.as_ref(), after.as_ref()) != Some(expected) {
                return Ok(None);
            }

            // arrival names the zone it entered, departure the one it left
            let snapshot = match expected {
                ZoneTransition::Entered => after,
                ZoneTransition::Exited => before,
            };
            let zone_name = snapshot
                .as_ref()
                .and_then(ZoneStatus::zone_name)
                .ok_or(Abstention::ZoneNameMissing)?
                .to_string();

            let content = match expected {
                ZoneTransition::Entered => NotificationContent::ZoneArrival { zone_name },
                ZoneTransition::Exited => NotificationContent::ZoneDeparture { zone_name },
            };
            (path_user(), content)
        }
    };

    let acting_user_id = acting_user_id
        .filter(|id| !id.is_empty())
        .ok_or(Abstention::ActingUserUnknown)?;

    Ok(Some(Plan {
        acting_user_id,
        content,
    }))
}

/// Fills a feeling missing from the event with the one stored in the room.
fn with_stored_feeling(content: NotificationContent, counterpart: &Counterpart) -> NotificationContent {
    match content {
        NotificationContent::FeelingSelected { feeling: None } => {
            NotificationContent::FeelingSelected {
                feeling: counterpart.acting_user.selected_feeling.clone(),
            }
        }
        content => content,
    }
}
