use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::change_event::ChangeKind;

/// The handlers wired to the realtime database.
///
/// The zone status path is watched twice, once per edge direction.
#[derive(Deserialize, Serialize, PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Trigger {
    #[serde(rename = "onFlowerUpdated")]
    FlowerUpdated,
    #[serde(rename = "onFeelingUpdated")]
    FeelingUpdated,
    #[serde(rename = "onNewMessage")]
    NewMessage,
    #[serde(rename = "onNewWish")]
    NewWish,
    #[serde(rename = "onNewJournalEntry")]
    NewJournalEntry,
    #[serde(rename = "onZoneEntered")]
    ZoneEntered,
    #[serde(rename = "onZoneExited")]
    ZoneExited,
}

pub const ALL_TRIGGERS: [Trigger; 7] = [
    Trigger::FlowerUpdated,
    Trigger::FeelingUpdated,
    Trigger::NewMessage,
    Trigger::NewWish,
    Trigger::NewJournalEntry,
    Trigger::ZoneEntered,
    Trigger::ZoneExited,
];

impl Trigger {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlowerUpdated => "onFlowerUpdated",
            Self::FeelingUpdated => "onFeelingUpdated",
            Self::NewMessage => "onNewMessage",
            Self::NewWish => "onNewWish",
            Self::NewJournalEntry => "onNewJournalEntry",
            Self::ZoneEntered => "onZoneEntered",
            Self::ZoneExited => "onZoneExited",
        }
    }

    pub fn path_pattern(&self) -> PathPattern {
        let pattern = match self {
            Self::FlowerUpdated => "rooms/{roomId}/users/{userId}/selectedFlower",
            Self::FeelingUpdated => "rooms/{roomId}/users/{userId}/selectedFeeling",
            Self::NewMessage => "rooms/{roomId}/messages/{messageId}",
            Self::NewWish => "rooms/{roomId}/wishlist/{activityId}/{wishId}",
            Self::NewJournalEntry => "rooms/{roomId}/journal/{entryId}",
            Self::ZoneEntered | Self::ZoneExited => "rooms/{roomId}/zoneStatus/{userId}/{zoneId}",
        };
        PathPattern::new(pattern)
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::NewMessage | Self::NewWish | Self::NewJournalEntry => ChangeKind::Created,
            Self::FlowerUpdated | Self::FeelingUpdated | Self::ZoneEntered | Self::ZoneExited => {
                ChangeKind::Updated
            }
        }
    }

    /// Triggers whose path pattern and change kind accept the given reference.
    pub fn matching(reference: &str, kind: ChangeKind) -> Vec<(Trigger, PathParams)> {
        ALL_TRIGGERS
            .iter()
            .filter(|trigger| trigger.kind() == kind)
            .filter_map(|trigger| {
                trigger
                    .path_pattern()
                    .capture(reference)
                    .map(|params| (*trigger, params))
            })
            .collect()
    }
}

/// Parameters captured from a reference, keyed by the name between braces.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Slash separated pattern like `rooms/{roomId}/journal/{entryId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(segment.to_string()),
                }
            })
            .collect();
        Self { segments }
    }

    /// Captures the parameters when `reference` has exactly the pattern's shape.
    pub fn capture(&self, reference: &str) -> Option<PathParams> {
        let parts = split_path(reference).collect::<Vec<&str>>();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), part.to_string());
                }
            }
        }
        Some(PathParams(params))
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
