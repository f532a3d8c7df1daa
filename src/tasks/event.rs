use crate::models::{
    AsyncResult, UserAchievementStored, UserStatsReceived, UserStatsStored, UserStatsUnloaded,
};
use std::fmt;

/// Receiver of dispatched events on the game thread
///
/// Implemented by [`StatsAndAchievements`](crate::interfaces::StatsAndAchievements),
/// which broadcasts each result to its subscribers.
pub trait AsyncEventTarget {
    fn on_user_stats_received(&mut self, result: UserStatsReceived);
    fn on_user_stats_stored(&mut self, result: UserStatsStored);
    fn on_user_stats_unloaded(&mut self, result: UserStatsUnloaded);
    fn on_user_achievement_stored(&mut self, result: UserAchievementStored);
}

/// One queued result on its way from the worker thread to the game thread
///
/// Owned by the outbound queue once enqueued, consumed by
/// [`trigger_delegates`](Self::trigger_delegates).
#[derive(Debug, Clone, PartialEq)]
pub struct AsyncEvent {
    result: AsyncResult,
    description: String,
}

impl AsyncEvent {
    pub fn new(result: AsyncResult) -> Self {
        let description = describe(&result);
        Self {
            result,
            description,
        }
    }

    pub fn result(&self) -> &AsyncResult {
        &self.result
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn into_result(self) -> AsyncResult {
        self.result
    }

    /// Post-processing on the game thread, before delegates fire
    pub fn finalize(&self) {
        tracing::debug!("Finalize {}", self.description);
    }

    /// Hand the result to its target, consuming the event
    pub fn trigger_delegates(self, target: &mut dyn AsyncEventTarget) {
        match self.result {
            AsyncResult::StatsReceived(result) => target.on_user_stats_received(result),
            AsyncResult::StatsStored(result) => target.on_user_stats_stored(result),
            AsyncResult::StatsUnloaded(result) => target.on_user_stats_unloaded(result),
            AsyncResult::AchievementStored(result) => target.on_user_achievement_stored(result),
        }
    }
}

impl fmt::Display for AsyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

fn describe(result: &AsyncResult) -> String {
    match result {
        AsyncResult::StatsStored(r) => format!(
            "StatsStoredEvent success: {} User: {} Result: {}",
            r.success, r.user, r.result
        ),
        AsyncResult::StatsReceived(r) => format!(
            "StatsReceivedEvent success: {} User: {} CurrentUser: {} Result: {}",
            r.success, r.user, r.is_current_user, r.result
        ),
        AsyncResult::StatsUnloaded(r) => format!("StatsUnloadedEvent User: {}", r.user),
        AsyncResult::AchievementStored(r) => format!(
            "AchievementStoredEvent AchievementName = {}, CurrentProgress = {}, MaxProgress = {}",
            r.achievement_name, r.current_progress, r.max_progress
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResultCode, SteamId};

    #[derive(Default)]
    struct Recorder {
        seen: Vec<&'static str>,
    }

    impl AsyncEventTarget for Recorder {
        fn on_user_stats_received(&mut self, _: UserStatsReceived) {
            self.seen.push("received");
        }
        fn on_user_stats_stored(&mut self, _: UserStatsStored) {
            self.seen.push("stored");
        }
        fn on_user_stats_unloaded(&mut self, _: UserStatsUnloaded) {
            self.seen.push("unloaded");
        }
        fn on_user_achievement_stored(&mut self, _: UserAchievementStored) {
            self.seen.push("achievement");
        }
    }

    #[test]
    fn test_description_for_stats_stored() {
        let event = AsyncEvent::new(AsyncResult::StatsStored(UserStatsStored {
            success: false,
            user: SteamId(5),
            result: ResultCode::FAIL,
        }));

        assert_eq!(
            event.description(),
            "StatsStoredEvent success: false User: 5 Result: '2' Fail (failure)"
        );
        assert_eq!(event.to_string(), event.description());
    }

    #[test]
    fn test_description_for_achievement() {
        let event = AsyncEvent::new(AsyncResult::AchievementStored(UserAchievementStored {
            success: true,
            achievement_name: "ACH_TRAVEL_FAR".to_string(),
            current_progress: 4,
            max_progress: 10,
            group_achievement: false,
        }));

        assert!(event.description().contains("ACH_TRAVEL_FAR"));
        assert!(event.description().contains("CurrentProgress = 4"));
    }

    #[test]
    fn test_trigger_routes_by_kind() {
        let mut recorder = Recorder::default();

        AsyncEvent::new(AsyncResult::StatsUnloaded(UserStatsUnloaded {
            success: true,
            user: SteamId(1),
            is_current_user: true,
        }))
        .trigger_delegates(&mut recorder);

        AsyncEvent::new(AsyncResult::StatsStored(UserStatsStored {
            success: true,
            user: SteamId(1),
            result: ResultCode::OK,
        }))
        .trigger_delegates(&mut recorder);

        assert_eq!(recorder.seen, vec!["unloaded", "stored"]);
    }
}
