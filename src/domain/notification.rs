use serde::{Deserialize, Serialize};

use super::feeling::feeling_label;

/// Title and body shown on the counterpart's device.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

/// What happened, from the acting user's side. Content of messages and entries is never carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationContent {
    FlowerSelected,
    FeelingSelected { feeling: Option<String> },
    MessageSent,
    WishAdded,
    JournalEntryWritten,
    ZoneArrival { zone_name: String },
    ZoneDeparture { zone_name: String },
}

impl NotificationContent {
    pub fn render(&self, acting_user_name: &str) -> Notification {
        let name = acting_user_name;
        let (title, body) = match self {
            Self::FlowerSelected => (
                "New Flower.".to_string(),
                format!("{name} selected a new flower."),
            ),
            Self::FeelingSelected { feeling } => (
                "Change in the mood.".to_string(),
                format!("{name} feels {}.", feeling_label(feeling.as_deref())),
            ),
            Self::MessageSent => (
                "New message.".to_string(),
                format!("{name} sent a new message."),
            ),
            Self::WishAdded => ("New wish.".to_string(), format!("{name} added a new wish.")),
            Self::JournalEntryWritten => (
                format!("{name} just wrote something 👀"),
                format!("There's a new journal entry from {name}."),
            ),
            Self::ZoneArrival { zone_name } => (
                "Zone arrival".to_string(),
                format!("{name} arrived at {zone_name}"),
            ),
            Self::ZoneDeparture { zone_name } => (
                "Zone departure".to_string(),
                format!("{name} left {zone_name}"),
            ),
        };

        Notification { title, body }
    }
}
