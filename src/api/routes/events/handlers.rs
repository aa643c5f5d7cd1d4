use actix_web::{
    post,
    web::{self, Data},
    HttpResponse,
};
use serde::{Deserialize, Serialize};

use crate::{
    components::app::AppComponents,
    dispatcher::HandlerOutcome,
    domain::{change_event::ChangeEvent, trigger::Trigger},
    generate_uuid_v4,
};

pub const EVENTS_URI: &str = "/v1/events";

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub struct HandledTrigger {
    pub trigger: Trigger,
    pub outcome: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl HandledTrigger {
    fn new(trigger: Trigger, outcome: HandlerOutcome) -> Self {
        let label = outcome.label().to_string();
        let (reason, recipient) = match outcome {
            HandlerOutcome::Notified { recipient, .. } => (None, Some(recipient)),
            HandlerOutcome::Skipped(abstention) => (Some(abstention.reason().to_string()), None),
            HandlerOutcome::NotApplicable => (None, None),
        };

        Self {
            trigger,
            outcome: label,
            reason,
            recipient,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ChangeEventResponse {
    pub event_id: String,
    pub handled: Vec<HandledTrigger>,
}

/// Entry point for the realtime database triggers.
///
/// Always answers 200 once the envelope is decoded, so a skipped or failed notification
/// never makes the trigger infrastructure retry.
#[post("/v1/events")]
pub async fn change_event_handler(
    body: web::Json<ChangeEvent>,
    app_data: Data<AppComponents>,
) -> HttpResponse {
    let event = body.into_inner();
    let event_id = event.id.clone().unwrap_or_else(generate_uuid_v4);

    log::debug!("Change event {} on {}", event_id, event.reference);

    let handled = app_data
        .dispatcher
        .dispatch(&event)
        .await
        .into_iter()
        .map(|(trigger, outcome)| HandledTrigger::new(trigger, outcome))
        .collect();

    HttpResponse::Ok().json(ChangeEventResponse { event_id, handled })
}
