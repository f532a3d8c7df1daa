use super::{ResultCode, SteamId};
use crate::error::OnlineError;

/// Latest stats and achievements for a user have been received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatsReceived {
    pub success: bool,
    pub user: SteamId,
    pub is_current_user: bool,
    pub result: ResultCode,
}

/// Result of a request to store the current user's stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatsStored {
    pub success: bool,
    pub user: SteamId,
    pub result: ResultCode,
}

/// A user's stats have been unloaded by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatsUnloaded {
    pub success: bool,
    pub user: SteamId,
    pub is_current_user: bool,
}

/// Result of storing an achievement on the server, or of an "indicate
/// progress" call.
///
/// If both `current_progress` and `max_progress` are zero the achievement
/// has been fully unlocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAchievementStored {
    pub success: bool,
    pub achievement_name: String,
    pub current_progress: u32,
    pub max_progress: u32,
    pub group_achievement: bool,
}

impl UserAchievementStored {
    pub fn is_unlocked(&self) -> bool {
        self.current_progress == 0 && self.max_progress == 0
    }
}

/// Outcome of one asynchronous platform operation.
///
/// Created once when the raw SDK callback fires and consumed once by the
/// subscriber broadcast on the game thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsyncResult {
    StatsReceived(UserStatsReceived),
    StatsStored(UserStatsStored),
    StatsUnloaded(UserStatsUnloaded),
    AchievementStored(UserAchievementStored),
}

impl AsyncResult {
    pub fn success(&self) -> bool {
        match self {
            AsyncResult::StatsReceived(r) => r.success,
            AsyncResult::StatsStored(r) => r.success,
            AsyncResult::StatsUnloaded(r) => r.success,
            AsyncResult::AchievementStored(r) => r.success,
        }
    }

    /// Subject user, when the callback carries one
    pub fn user(&self) -> Option<SteamId> {
        match self {
            AsyncResult::StatsReceived(r) => Some(r.user),
            AsyncResult::StatsStored(r) => Some(r.user),
            AsyncResult::StatsUnloaded(r) => Some(r.user),
            AsyncResult::AchievementStored(_) => None,
        }
    }

    /// The SDK-reported failure, if this result is a failed one
    pub fn failure(&self) -> Option<OnlineError> {
        let code = match self {
            AsyncResult::StatsReceived(r) => r.result,
            AsyncResult::StatsStored(r) => r.result,
            AsyncResult::StatsUnloaded(_) | AsyncResult::AchievementStored(_) => return None,
        };

        (!code.is_success()).then_some(OnlineError::SdkReportedFailure(code))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            AsyncResult::StatsReceived(_) => "StatsReceived",
            AsyncResult::StatsStored(_) => "StatsStored",
            AsyncResult::StatsUnloaded(_) => "StatsUnloaded",
            AsyncResult::AchievementStored(_) => "AchievementStored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_achievement_unlocked_when_progress_zero() {
        let stored = UserAchievementStored {
            success: true,
            achievement_name: "ACH_WIN_ONE_GAME".to_string(),
            current_progress: 0,
            max_progress: 0,
            group_achievement: false,
        };
        assert!(stored.is_unlocked());

        let progress = UserAchievementStored {
            current_progress: 3,
            max_progress: 10,
            ..stored
        };
        assert!(!progress.is_unlocked());
    }

    #[test]
    fn test_failure_reports_result_code() {
        let result = AsyncResult::StatsStored(UserStatsStored {
            success: false,
            user: SteamId(7),
            result: ResultCode::INVALID_PARAM,
        });

        assert!(!result.success());
        assert!(matches!(
            result.failure(),
            Some(OnlineError::SdkReportedFailure(ResultCode::INVALID_PARAM))
        ));
        assert_eq!(result.user(), Some(SteamId(7)));
    }

    #[test]
    fn test_success_has_no_failure() {
        let result = AsyncResult::StatsReceived(UserStatsReceived {
            success: true,
            user: SteamId(7),
            is_current_user: true,
            result: ResultCode::OK,
        });
        assert!(result.failure().is_none());
        assert_eq!(result.kind_name(), "StatsReceived");
    }
}
