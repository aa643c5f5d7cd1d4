use std::sync::Arc;

use crate::{
    components::messaging::{MulticastMessage, PushMessenger},
    domain::trigger::Trigger,
    metrics::Metrics,
};

/// Whether the handler waits for the push submission before it completes.
///
/// Either way the outcome is only logged, it never reaches the trigger infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Submission finishes before the handler returns, so a suspended host can't drop it.
    Awaited,
    /// Submission runs on its own task and the handler returns right away.
    Detached,
}

impl DeliveryMode {
    pub fn from_config(await_delivery: bool) -> Self {
        if await_delivery {
            Self::Awaited
        } else {
            Self::Detached
        }
    }
}

#[derive(Clone)]
pub struct Delivery {
    messenger: Arc<dyn PushMessenger>,
    metrics: Arc<Metrics>,
    mode: DeliveryMode,
}

impl Delivery {
    pub fn new(messenger: Arc<dyn PushMessenger>, metrics: Arc<Metrics>, mode: DeliveryMode) -> Self {
        Self {
            messenger,
            metrics,
            mode,
        }
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub async fn deliver(&self, trigger: Trigger, message: MulticastMessage) {
        let submission = submit(
            self.messenger.clone(),
            self.metrics.clone(),
            trigger,
            message,
        );

        match self.mode {
            DeliveryMode::Awaited => submission.await,
            DeliveryMode::Detached => {
                tokio::spawn(submission);
            }
        }
    }
}

async fn submit(
    messenger: Arc<dyn PushMessenger>,
    metrics: Arc<Metrics>,
    trigger: Trigger,
    message: MulticastMessage,
) {
    log::debug!(
        "[{}] Sending notification to tokens: {:?}",
        trigger.name(),
        message.tokens
    );

    match messenger.send_multicast(&message).await {
        Ok(response) => {
            log::debug!(
                "[{}] Successfully sent message: {} sent, {} failed",
                trigger.name(),
                response.success_count,
                response.failure_count
            );
            for failed in response.responses.iter().filter(|r| !r.is_success()) {
                log::error!(
                    "[{}] Error sending message to token {}: {}",
                    trigger.name(),
                    failed.token,
                    failed.error.as_deref().unwrap_or_default()
                );
            }
            if response.failure_count > 0 {
                metrics.record_delivery_failures(trigger, response.failure_count as u64);
            }
        }
        Err(err) => {
            log::error!("[{}] Error sending message: {}", trigger.name(), err);
            metrics.record_delivery_failures(trigger, message.tokens.len() as u64);
        }
    }
}
