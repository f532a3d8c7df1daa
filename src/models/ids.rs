use serde::{Deserialize, Serialize};
use std::fmt;

/// 64-bit Steam user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SteamId(pub u64);

impl SteamId {
    /// The "nil" id the SDK hands out when no user is logged on
    pub const NIL: SteamId = SteamId(0);

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application id as assigned on the Steamworks partner site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AppId(pub u32);

impl AppId {
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 64-bit game id carried by stats callbacks.
///
/// For plain Steam applications the low 24 bits hold the app id and the
/// remaining bits are zero, so `GameId::from(AppId(480))` equals `GameId(480)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// App id stored in the low 24 bits
    pub fn app_id(&self) -> AppId {
        AppId((self.0 & 0x00FF_FFFF) as u32)
    }
}

impl From<AppId> for GameId {
    fn from(app_id: AppId) -> Self {
        GameId(u64::from(app_id.0) & 0x00FF_FFFF)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
