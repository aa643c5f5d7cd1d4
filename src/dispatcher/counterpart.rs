use crate::{
    components::store::RoomStore,
    domain::{error::Abstention, room::RoomUser},
};

/// Everything needed to notify the other participant of a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Counterpart {
    pub room_id: String,
    pub acting_user_id: String,
    pub acting_user: RoomUser,
    pub acting_user_name: String,
    pub other_user_id: String,
    pub other_user_name: String,
    pub tokens: Vec<String>,
}

/// Resolves the other participant of `room_id` and their device tokens.
///
/// Performs two sequential reads, the room and then the counterpart's profile. Every
/// precondition failure comes back as an [`Abstention`].
pub async fn resolve_counterpart(
    store: &dyn RoomStore,
    room_id: &str,
    acting_user_id: &str,
) -> Result<Counterpart, Abstention> {
    let room = store
        .get_room(room_id)
        .await
        .map_err(|err| Abstention::StoreUnavailable(err.to_string()))?
        .ok_or_else(|| Abstention::RoomNotFound(room_id.to_string()))?;

    if room.members().is_none() {
        return Err(Abstention::UsersMissing(room_id.to_string()));
    }

    let other_user_id = room
        .other_user_id(acting_user_id)
        .ok_or_else(|| Abstention::NoCounterpart(room_id.to_string()))?
        .to_string();

    let (acting_user, other_user) = match (room.member(acting_user_id), room.member(&other_user_id)) {
        (Some(acting_user), Some(other_user)) => (acting_user, other_user),
        _ => return Err(Abstention::UserDataMissing(room_id.to_string())),
    };

    let (acting_user_name, other_user_name) =
        match (acting_user.display_name(), other_user.display_name()) {
            (Some(acting), Some(other)) => (acting.to_string(), other.to_string()),
            _ => return Err(Abstention::NameMissing(room_id.to_string())),
        };

    let profile = store
        .get_user_profile(&other_user_id)
        .await
        .map_err(|err| Abstention::StoreUnavailable(err.to_string()))?
        .ok_or_else(|| Abstention::ProfileNotFound(other_user_id.clone()))?;

    let tokens = profile.tokens();
    if tokens.is_empty() {
        return Err(Abstention::NoTokens(other_user_id));
    }

    Ok(Counterpart {
        room_id: room_id.to_string(),
        acting_user_id: acting_user_id.to_string(),
        acting_user,
        acting_user_name,
        other_user_id,
        other_user_name,
        tokens,
    })
}
