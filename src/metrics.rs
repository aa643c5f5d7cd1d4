use prometheus::{self, Encoder, IntCounterVec, Opts, Registry};

use crate::domain::{error::Abstention, trigger::Trigger};

#[derive(Clone)]
pub struct Metrics {
    pub events_total_collector: IntCounterVec,
    pub notifications_sent_total_collector: IntCounterVec,
    pub notifications_skipped_total_collector: IntCounterVec,
    pub delivery_failures_total_collector: IntCounterVec,
    pub registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

const EVENTS: (&str, &str) = (
    "notification_dispatcher_events_total",
    "Change events received per trigger",
);
const NOTIFICATIONS_SENT: (&str, &str) = (
    "notification_dispatcher_notifications_sent_total",
    "Notifications submitted to the push provider per trigger",
);
const NOTIFICATIONS_SKIPPED: (&str, &str) = (
    "notification_dispatcher_notifications_skipped_total",
    "Handler runs that abstained from notifying, per trigger and reason",
);
const DELIVERY_FAILURES: (&str, &str) = (
    "notification_dispatcher_delivery_failures_total",
    "Push submissions rejected by the provider or failed per token",
);

impl Metrics {
    pub fn new() -> Self {
        let events_total_collector = Self::create_int_counter_vec(EVENTS, &["trigger"])
            .expect("Metrics definition is correct, so notification_dispatcher_events_total metric should be created successfully");

        let notifications_sent_total_collector =
            Self::create_int_counter_vec(NOTIFICATIONS_SENT, &["trigger"])
            .expect("Metrics definition is correct, so notification_dispatcher_notifications_sent_total metric should be created successfully");

        let notifications_skipped_total_collector =
            Self::create_int_counter_vec(NOTIFICATIONS_SKIPPED, &["trigger", "reason"])
            .expect("Metrics definition is correct, so notification_dispatcher_notifications_skipped_total metric should be created successfully");

        let delivery_failures_total_collector =
            Self::create_int_counter_vec(DELIVERY_FAILURES, &["trigger"])
            .expect("Metrics definition is correct, so notification_dispatcher_delivery_failures_total metric should be created successfully");

        let registry = Registry::new();

        registry
            .register(Box::new(events_total_collector.clone()))
            .expect("Events Collector metrics should be correct, so EVENTS can be registered successfully");

        registry
            .register(Box::new(notifications_sent_total_collector.clone()))
            .expect("Notifications Sent Collector metrics should be correct, so NOTIFICATIONS_SENT can be registered successfully");

        registry
            .register(Box::new(notifications_skipped_total_collector.clone()))
            .expect("Notifications Skipped Collector metrics should be correct, so NOTIFICATIONS_SKIPPED can be registered successfully");

        registry
            .register(Box::new(delivery_failures_total_collector.clone()))
            .expect("Delivery Failures Collector metrics should be correct, so DELIVERY_FAILURES can be registered successfully");

        Metrics {
            events_total_collector,
            notifications_sent_total_collector,
            notifications_skipped_total_collector,
            delivery_failures_total_collector,
            registry,
        }
    }

    fn create_int_counter_vec(
        metric: (&str, &str),
        labels: &[&str],
    ) -> Result<IntCounterVec, prometheus::Error> {
        let opts = Opts::new(metric.0, metric.1);
        IntCounterVec::new(opts, labels)
    }

    pub fn record_event(&self, trigger: Trigger) {
        self.events_total_collector
            .with_label_values(&[trigger.name()])
            .inc();
    }

    pub fn record_notification_sent(&self, trigger: Trigger) {
        self.notifications_sent_total_collector
            .with_label_values(&[trigger.name()])
            .inc();
    }

    pub fn record_abstention(&self, trigger: Trigger, abstention: &Abstention) {
        self.notifications_skipped_total_collector
            .with_label_values(&[trigger.name(), abstention.reason()])
            .inc();
    }

    pub fn record_delivery_failures(&self, trigger: Trigger, failures: u64) {
        self.delivery_failures_total_collector
            .with_label_values(&[trigger.name()])
            .inc_by(failures);
    }

    /// Text exposition of every registered collector.
    pub fn encode(&self) -> String {
        let encoder = prometheus::TextEncoder::new();

        let mut buffer = Vec::new();
        if let Err(err) = encoder.encode(&self.registry.gather(), &mut buffer) {
            log::debug!("metrics > Could not encode metrics: {}", err);
        };

        match String::from_utf8(buffer) {
            Ok(v) => v,
            Err(err) => {
                log::debug!("metrics > Metrics could not be from_utf8'd: {}", err);
                String::default()
            }
        }
    }
}
