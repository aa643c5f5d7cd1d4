use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: String,
    pub message: String,
}

#[derive(Error, Debug, Clone)]
pub enum CommonError {
    #[error("Not found")]
    NotFound(String),
    #[error("Bad request {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized(String),
    #[error("Unknown Internal Error")]
    Unknown(String),
}

impl PartialEq for CommonError {
    fn eq(&self, other: &Self) -> bool {
        core::mem::discriminant(self) == core::mem::discriminant(other)
    }
}

impl CommonError {
    pub fn name(&self) -> String {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::BadRequest(_) => "BadRequest",
            Self::Unauthorized(_) => "Unauthorized",
            Self::Unknown(_) => "Unknown",
        }
        .to_string()
    }
}

/// Failure while reading from the realtime database.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request to the realtime database failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("realtime database answered with status {status} for {path}")]
    Status { status: u16, path: String },
    #[error("couldn't decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Failure while submitting a multicast push.
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("invalid multicast message: {0}")]
    InvalidArgument(String),
}

/// Reason a handler declined to notify the other participant.
///
/// None of these reach the trigger infrastructure, they are logged and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Abstention {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("room {0} has no users")]
    UsersMissing(String),
    #[error("the acting user of the created item is unknown")]
    ActingUserUnknown,
    #[error("no other user found in room {0}")]
    NoCounterpart(String),
    #[error("user data missing in room {0}")]
    UserDataMissing(String),
    #[error("user names missing in room {0}")]
    NameMissing(String),
    #[error("user {0} not found")]
    ProfileNotFound(String),
    #[error("no tokens found for user {0}")]
    NoTokens(String),
    #[error("zone name missing")]
    ZoneNameMissing,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Abstention {
    /// Stable label used in metrics and in the ingress summary.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::RoomNotFound(_) => "room_not_found",
            Self::UsersMissing(_) => "users_missing",
            Self::ActingUserUnknown => "acting_user_unknown",
            Self::NoCounterpart(_) => "no_counterpart",
            Self::UserDataMissing(_) => "user_data_missing",
            Self::NameMissing(_) => "name_missing",
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::NoTokens(_) => "no_tokens",
            Self::ZoneNameMissing => "zone_name_missing",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Whether the abstention is expected in normal operation and only worth a debug line.
    pub fn is_routine(&self) -> bool {
        matches!(self, Self::NoCounterpart(_) | Self::NoTokens(_))
    }
}
