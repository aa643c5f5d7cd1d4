use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INSIDE_STATUS: &str = "inside";

/// Value stored under `rooms/{roomId}/zoneStatus/{userId}/{zoneId}`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub zone_name: Option<String>,
}

impl ZoneStatus {
    /// Lenient read of a snapshot, anything that isn't a zone object reads as empty.
    pub fn from_snapshot(snapshot: Option<&Value>) -> Option<Self> {
        snapshot
            .filter(|value| value.is_object())
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    pub fn is_inside(&self) -> bool {
        self.status.as_deref() == Some(INSIDE_STATUS)
    }

    pub fn zone_name(&self) -> Option<&str> {
        self.zone_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Edge of the two-state inside/outside detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTransition {
    Entered,
    Exited,
}

impl ZoneTransition {
    pub fn detect(before: Option<&ZoneStatus>, after: Option<&ZoneStatus>) -> Option<Self> {
        let was_inside = before.map_or(false, ZoneStatus::is_inside);
        let is_inside = after.map_or(false, ZoneStatus::is_inside);

        match (was_inside, is_inside) {
            (false, true) => Some(Self::Entered),
            (true, false) => Some(Self::Exited),
            _ => None,
        }
    }
}
