use crate::models::{GameId, ResultCode, SteamId};
use crate::sdk::CallbackKind;
use thiserror::Error;

/// Errors raised by the callback pipeline and the online interfaces
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OnlineError {
    #[error("Callback for wrong game (expected {expected}, got {actual})")]
    WrongGame { expected: GameId, actual: GameId },

    #[error("Steam SDK unavailable: {0}")]
    SdkUnavailable(&'static str),

    #[error("Stats not received yet")]
    NotReady,

    #[error("No handler accepts {0:?} callbacks")]
    UnhandledCallback(CallbackKind),

    #[error("Steam reported failure: {0}")]
    SdkReportedFailure(ResultCode),

    #[error("Steam call failed: {0}")]
    CallFailed(String),

    #[error("Not the current Steam user: {0}")]
    NotCurrentUser(SteamId),

    #[error("Invalid rich presence token '{0}', valid tokens look like #token")]
    InvalidPresenceToken(String),

    #[error("Rich presence rejected for key '{key}': {reason}")]
    PresenceRejected { key: String, reason: String },

    #[error("Invalid overlay URL: {0}")]
    InvalidUrl(String),
}

pub type OnlineResult<T> = Result<T, OnlineError>;
