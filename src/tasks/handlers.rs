// Callback handlers and the table that routes raw callbacks to them
//
// Handlers run on the worker thread. They may query the SDK (which is
// Send + Sync) but never touch game-thread state; their only output is the
// event they return, which the pump enqueues.

use super::event::AsyncEvent;
use crate::error::{OnlineError, OnlineResult};
use crate::models::{
    AsyncResult, GameId, ResultCode, UserAchievementStored, UserStatsReceived, UserStatsStored,
    UserStatsUnloaded,
};
use crate::sdk::{self, CallbackKind, RawCallback, SteamSdk};
use std::collections::HashMap;

/// Converts one raw callback into an event, or explains why it was dropped
pub type CallbackHandler =
    Box<dyn Fn(&dyn SteamSdk, RawCallback) -> OnlineResult<AsyncEvent> + Send + Sync>;

/// Handler table keyed by callback kind
#[derive(Default)]
pub struct CallbackRegistry {
    handlers: HashMap<CallbackKind, CallbackHandler>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the four stats/achievement handlers installed
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(CallbackKind::UserStatsStored, on_user_stats_stored);
        registry.register(CallbackKind::UserStatsReceived, on_user_stats_received);
        registry.register(CallbackKind::UserStatsUnloaded, on_user_stats_unloaded);
        registry.register(CallbackKind::UserAchievementStored, on_user_achievement_stored);
        registry
    }

    /// Install `handler` for `kind`, replacing any previous one
    pub fn register<F>(&mut self, kind: CallbackKind, handler: F)
    where
        F: Fn(&dyn SteamSdk, RawCallback) -> OnlineResult<AsyncEvent> + Send + Sync + 'static,
    {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            tracing::debug!("Replaced handler for {:?}", kind);
        }
    }

    pub fn is_registered(&self, kind: CallbackKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Route `raw` to the handler registered for its kind
    pub fn dispatch(&self, sdk: &dyn SteamSdk, raw: RawCallback) -> OnlineResult<AsyncEvent> {
        let kind = raw.kind();
        match self.handlers.get(&kind) {
            Some(handler) => handler(sdk, raw),
            None => Err(OnlineError::UnhandledCallback(kind)),
        }
    }
}

fn ensure_current_game(sdk: &dyn SteamSdk, game_id: GameId) -> OnlineResult<()> {
    if sdk::is_current_game(sdk, game_id) {
        return Ok(());
    }

    let expected = sdk.utils().map(|utils| utils.game_id()).unwrap_or_default();
    Err(OnlineError::WrongGame {
        expected,
        actual: game_id,
    })
}

/// `UserStatsStored`: result of a store request for the current user
pub fn on_user_stats_stored(sdk: &dyn SteamSdk, raw: RawCallback) -> OnlineResult<AsyncEvent> {
    let kind = raw.kind();
    let RawCallback::UserStatsStored { game_id, result } = raw else {
        return Err(OnlineError::UnhandledCallback(kind));
    };
    ensure_current_game(sdk, game_id)?;
    tracing::trace!("OnUserStatsStored");

    let user = sdk::current_user(sdk);
    if !result.is_success() {
        tracing::error!("OnUserStatsStored: Error = {}", result);
        if result == ResultCode::FAIL {
            tracing::error!(
                "Invalid stats data set, stats have been reverted to state prior to last write."
            );
        } else if result == ResultCode::INVALID_PARAM {
            tracing::error!(
                "One or more stats we set broke a constraint. Stats have been reverted to state prior to last write."
            );
        }
    }

    Ok(AsyncEvent::new(AsyncResult::StatsStored(UserStatsStored {
        success: result.is_success(),
        user,
        result,
    })))
}

/// `UserStatsReceived`: stats for a user arrived (or failed to)
pub fn on_user_stats_received(sdk: &dyn SteamSdk, raw: RawCallback) -> OnlineResult<AsyncEvent> {
    let kind = raw.kind();
    let RawCallback::UserStatsReceived {
        game_id,
        result,
        user,
    } = raw
    else {
        return Err(OnlineError::UnhandledCallback(kind));
    };
    ensure_current_game(sdk, game_id)?;
    tracing::trace!("OnUserStatsReceived");

    if !result.is_success() {
        tracing::error!(
            "Failed to obtain steam user stats, user: {} error: {}",
            user,
            result
        );
        if result == ResultCode::FAIL {
            tracing::error!(
                "OnUserStatsReceived: user {} has no stats entries",
                user
            );
        }
    }

    Ok(AsyncEvent::new(AsyncResult::StatsReceived(UserStatsReceived {
        success: result.is_success(),
        user,
        is_current_user: sdk::is_current_user(sdk, user),
        result,
    })))
}

/// `UserStatsUnloaded`: carries no game id, so it is never filtered
pub fn on_user_stats_unloaded(sdk: &dyn SteamSdk, raw: RawCallback) -> OnlineResult<AsyncEvent> {
    let kind = raw.kind();
    let RawCallback::UserStatsUnloaded { user } = raw else {
        return Err(OnlineError::UnhandledCallback(kind));
    };
    tracing::trace!("OnUserStatsUnloaded");

    Ok(AsyncEvent::new(AsyncResult::StatsUnloaded(UserStatsUnloaded {
        success: true,
        user,
        is_current_user: sdk::is_current_user(sdk, user),
    })))
}

/// `UserAchievementStored`: achievement stored or progress indicated
pub fn on_user_achievement_stored(
    sdk: &dyn SteamSdk,
    raw: RawCallback,
) -> OnlineResult<AsyncEvent> {
    let kind = raw.kind();
    let RawCallback::UserAchievementStored {
        game_id,
        group_achievement,
        achievement_name,
        current_progress,
        max_progress,
    } = raw
    else {
        return Err(OnlineError::UnhandledCallback(kind));
    };
    ensure_current_game(sdk, game_id)?;
    tracing::trace!("OnUserAchievementStored");

    Ok(AsyncEvent::new(AsyncResult::AchievementStored(
        UserAchievementStored {
            success: true,
            achievement_name,
            current_progress,
            max_progress,
            group_achievement,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppId, SteamId};
    use crate::sdk::test_support::MockedSdk;

    fn sdk() -> MockedSdk {
        MockedSdk {
            utils: Some(MockedSdk::utils_for(AppId(480), SteamId(1000))),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_handlers_cover_all_kinds() {
        let registry = CallbackRegistry::with_default_handlers();
        assert_eq!(registry.len(), 4);
        for kind in CallbackKind::ALL {
            assert!(registry.is_registered(kind));
        }
    }

    #[test]
    fn test_wrong_game_is_rejected() {
        let registry = CallbackRegistry::with_default_handlers();
        let result = registry.dispatch(
            &sdk(),
            RawCallback::UserStatsReceived {
                game_id: GameId(570),
                result: ResultCode::OK,
                user: SteamId(1000),
            },
        );

        assert_eq!(
            result,
            Err(OnlineError::WrongGame {
                expected: GameId(480),
                actual: GameId(570),
            })
        );
    }

    #[test]
    fn test_failed_store_becomes_failed_result() {
        let registry = CallbackRegistry::with_default_handlers();
        let event = registry
            .dispatch(
                &sdk(),
                RawCallback::UserStatsStored {
                    game_id: GameId(480),
                    result: ResultCode::INVALID_PARAM,
                },
            )
            .unwrap();

        assert_eq!(
            event.into_result(),
            AsyncResult::StatsStored(UserStatsStored {
                success: false,
                user: SteamId(1000),
                result: ResultCode::INVALID_PARAM,
            })
        );
    }

    #[test]
    fn test_received_marks_current_user() {
        let registry = CallbackRegistry::with_default_handlers();
        let mine = registry
            .dispatch(
                &sdk(),
                RawCallback::UserStatsReceived {
                    game_id: GameId(480),
                    result: ResultCode::OK,
                    user: SteamId(1000),
                },
            )
            .unwrap();
        let theirs = registry
            .dispatch(
                &sdk(),
                RawCallback::UserStatsReceived {
                    game_id: GameId(480),
                    result: ResultCode::OK,
                    user: SteamId(2000),
                },
            )
            .unwrap();

        assert!(matches!(mine.result(), AsyncResult::StatsReceived(r) if r.is_current_user));
        assert!(matches!(theirs.result(), AsyncResult::StatsReceived(r) if !r.is_current_user));
    }

    #[test]
    fn test_unloaded_skips_game_check() {
        let registry = CallbackRegistry::with_default_handlers();
        let event = registry
            .dispatch(&sdk(), RawCallback::UserStatsUnloaded { user: SteamId(1000) })
            .unwrap();
        assert!(event.result().success());
    }

    #[test]
    fn test_unregistered_kind() {
        let registry = CallbackRegistry::new();
        let result = registry.dispatch(&sdk(), RawCallback::UserStatsUnloaded { user: SteamId(1) });
        assert_eq!(
            result,
            Err(OnlineError::UnhandledCallback(CallbackKind::UserStatsUnloaded))
        );
    }

    #[test]
    fn test_custom_handler_replaces_default() {
        let mut registry = CallbackRegistry::with_default_handlers();
        registry.register(CallbackKind::UserStatsUnloaded, |_, _| {
            Err(OnlineError::CallFailed("ignored".to_string()))
        });

        let result = registry.dispatch(&sdk(), RawCallback::UserStatsUnloaded { user: SteamId(1) });
        assert!(result.is_err());
        assert_eq!(registry.len(), 4);
    }
}
