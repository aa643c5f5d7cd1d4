use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Snapshot of `rooms/{roomId}` as stored by the client application.
///
/// Only the user mapping is interpreted, the nested collections (messages, wishlist,
/// journal, zoneStatus) are owned by the clients and ignored here.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Room {
    #[serde(default)]
    pub users: Option<Value>,
}

/// Room-scoped view of a participant.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomUser {
    #[serde(default, deserialize_with = "string_or_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub selected_flower: Option<Value>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub selected_feeling: Option<String>,
}

/// Client-written fields aren't validated, a value of another type reads as absent.
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Some(value),
        _ => None,
    })
}

impl RoomUser {
    /// Display name, treating an empty string as missing.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

impl Room {
    /// The user mapping, only when it is a JSON object.
    pub fn members(&self) -> Option<&Map<String, Value>> {
        self.users.as_ref().and_then(Value::as_object)
    }

    /// First user id, in lexicographic order, that differs from `acting_user_id`.
    pub fn other_user_id(&self, acting_user_id: &str) -> Option<&str> {
        self.members()?
            .keys()
            .find(|id| id.as_str() != acting_user_id)
            .map(String::as_str)
    }

    /// Parses the entry of `user_id`. Entries that aren't objects are treated as missing.
    pub fn member(&self, user_id: &str) -> Option<RoomUser> {
        let entry = self.members()?.get(user_id)?;
        if !entry.is_object() {
            return None;
        }
        serde_json::from_value(entry.clone()).ok()
    }
}

/// Global profile stored under `users/{userId}`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    #[serde(default, alias = "fcmTokens")]
    pub fcmtokens: Option<DeviceTokens>,
}

/// Device token collection. Clients have written it both as a list and as a keyed mapping.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DeviceTokens {
    List(Vec<Option<String>>),
    Keyed(BTreeMap<String, Value>),
}

impl UserProfile {
    pub fn with_tokens(tokens: &[&str]) -> Self {
        Self {
            fcmtokens: Some(DeviceTokens::List(
                tokens.iter().map(|token| Some(token.to_string())).collect(),
            )),
        }
    }

    /// Non-empty tokens in storage order.
    pub fn tokens(&self) -> Vec<String> {
        let tokens: Vec<String> = match &self.fcmtokens {
            None => vec![],
            Some(DeviceTokens::List(list)) => list.iter().flatten().cloned().collect(),
            // `{pushId: token}` keeps the token as value, `{token: true}` keeps it as key
            Some(DeviceTokens::Keyed(map)) => map
                .iter()
                .filter_map(|(key, value)| match value {
                    Value::String(token) => Some(token.clone()),
                    Value::Bool(true) => Some(key.clone()),
                    _ => None,
                })
                .collect(),
        };

        tokens
            .into_iter()
            .filter(|token| !token.is_empty())
            .collect()
    }
}
