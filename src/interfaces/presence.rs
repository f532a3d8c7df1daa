// Rich presence interface
//
// Docs for the keys used here:
// https://partner.steamgames.com/doc/api/ISteamFriends#richpresencelocalization

use crate::error::{OnlineError, OnlineResult};
use crate::models::SteamId;
use crate::sdk::{
    self, FriendsApi, MAX_RICH_PRESENCE_KEY_LENGTH, MAX_RICH_PRESENCE_KEYS,
    MAX_RICH_PRESENCE_VALUE_LENGTH, SteamSdk,
};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::Arc;

const FRIENDS_FACET: &str = "ISteamFriends";

/// Plain text shown in the friends list
pub const STATUS_KEY: &str = "status";

/// Localization token shown in the friends list
pub const STEAM_DISPLAY_KEY: &str = "steam_display";

pub struct Presence {
    sdk: Arc<dyn SteamSdk>,

    /// Localization tokens look like `#token`
    token_pattern: Regex,
}

impl Presence {
    pub fn new(sdk: Arc<dyn SteamSdk>) -> Self {
        Self {
            sdk,
            token_pattern: Regex::new(r"(?s)^#.+").expect("Invalid presence token regex"),
        }
    }

    fn ensure_current_user(&self, player: SteamId, context: &str) -> OnlineResult<()> {
        if sdk::is_current_user(self.sdk.as_ref(), player) {
            return Ok(());
        }
        tracing::warn!("{}: Not current steam user", context);
        Err(OnlineError::NotCurrentUser(player))
    }

    fn friends(&self, context: &str) -> OnlineResult<&dyn FriendsApi> {
        self.sdk.friends().ok_or_else(|| {
            tracing::warn!("{}: Can't get {}", context, FRIENDS_FACET);
            OnlineError::SdkUnavailable(FRIENDS_FACET)
        })
    }

    pub fn clear_rich_presence(&self, player: SteamId) -> OnlineResult<()> {
        self.ensure_current_user(player, "ClearRichPresence")?;
        self.friends("ClearRichPresence")?.clear_rich_presence();
        Ok(())
    }

    pub fn set_rich_presence_status(&self, player: SteamId, message: &str) -> OnlineResult<()> {
        self.ensure_current_user(player, "SetRichPresenceStatus")?;
        self.set_steam_rich_presence(STATUS_KEY, message)
    }

    /// Set a localized display `token` and its substitutions
    ///
    /// Substitutions are pushed in insertion order; a rejected substitution
    /// is logged and does not fail the call.
    pub fn set_rich_presence_steam_display(
        &self,
        player: SteamId,
        token: &str,
        substitutions: &IndexMap<String, String>,
    ) -> OnlineResult<()> {
        self.ensure_current_user(player, "SetRichPresenceSteamDisplay")?;

        if !self.token_pattern.is_match(token) {
            tracing::warn!(
                "SetRichPresenceSteamDisplay: Token = {} is not a valid token. Valid tokens look like this: #token, #name",
                token
            );
            return Err(OnlineError::InvalidPresenceToken(token.to_string()));
        }

        self.set_steam_rich_presence(STEAM_DISPLAY_KEY, token)?;

        for (key, value) in substitutions {
            // Already logged
            let _ = self.set_steam_rich_presence(key, value);
        }
        Ok(())
    }

    fn set_steam_rich_presence(&self, key: &str, value: &str) -> OnlineResult<()> {
        if self.friends("SetSteamRichPresence")?.set_rich_presence(key, value) {
            return Ok(());
        }

        let reason = rejection_reason(key, value);
        tracing::warn!(
            "SetSteamRichPresence: Cannot push rich presence for Key = {}, Value = {}. {}",
            key,
            value,
            reason
        );
        Err(OnlineError::PresenceRejected {
            key: key.to_string(),
            reason,
        })
    }
}

/// Most likely reason the SDK refused a key/value pair
fn rejection_reason(key: &str, value: &str) -> String {
    if key.is_empty() {
        "Key is empty".to_string()
    } else if key.len() >= MAX_RICH_PRESENCE_KEY_LENGTH {
        format!("Key is too long ({})", key.len())
    } else if value.len() >= MAX_RICH_PRESENCE_VALUE_LENGTH {
        format!("Value is too long ({})", value.len())
    } else {
        format!(
            "Maximum number of rich presence keys ({}) reached, clear presence",
            MAX_RICH_PRESENCE_KEYS
        )
    }
}
