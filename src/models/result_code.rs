use serde::{Deserialize, Serialize};
use std::fmt;

/// Result code reported by the SDK in callbacks (Steam `EResult`).
///
/// Kept as a newtype over the raw value so codes added by newer SDK
/// versions still round-trip; [`ResultCode::name`] and
/// [`ResultCode::description`] cover the codes known at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultCode(pub i32);

/// (code, symbolic name, description)
const KNOWN_CODES: &[(i32, &str, &str)] = &[
    (1, "OK", "success"),
    (2, "Fail", "failure"),
    (3, "NoConnection", "no connection"),
    (5, "InvalidPassword", "invalid password/ticket"),
    (6, "LoggedInElsewhere", "same user logged in elsewhere"),
    (7, "InvalidProtocolVer", "incorrect protocol version"),
    (8, "InvalidParam", "a parameter is incorrect"),
    (9, "FileNotFound", "file not found"),
    (10, "Busy", "called method busy, no action taken"),
    (11, "InvalidState", "called object in invalid state"),
    (12, "InvalidName", "invalid name"),
    (13, "InvalidEmail", "invalid email"),
    (14, "DuplicateName", "duplicate name"),
    (15, "AccessDenied", "access denied"),
    (16, "Timeout", "operation timed out"),
    (17, "Banned", "VAC banned"),
    (18, "AccountNotFound", "account not found"),
    (19, "InvalidSteamID", "steamid invalid"),
    (20, "ServiceUnavailable", "requested service currently unavailable"),
    (21, "NotLoggedOn", "user is not logged on"),
    (22, "Pending", "request is pending - may be in process, or waiting on third party"),
    (23, "EncryptionFailure", "encryption or decryption failed"),
    (24, "InsufficientPrivilege", "insufficient privilege"),
    (25, "LimitExceeded", "limit exceeded"),
    (26, "Revoked", "access revoked"),
    (27, "Expired", "license or guest pass expired"),
    (28, "AlreadyRedeemed", "guest pass already redeemed"),
    (29, "DuplicateRequest", "duplicate request, already occurred, ignoring"),
    (30, "AlreadyOwned", "already owned"),
    (31, "IPNotFound", "IP address not found"),
    (32, "PersistFailed", "failed to write change to data store"),
    (33, "LockingFailed", "failed to acquire access lock for operation"),
    (34, "LogonSessionReplaced", "logon session replaced"),
    (35, "ConnectFailed", "connect failed"),
    (36, "HandshakeFailed", "handshake failed"),
    (37, "IOFailure", "input/output failure"),
    (38, "RemoteDisconnect", "remote disconnect"),
    (39, "ShoppingCartNotFound", "failed to find shopping cart requested"),
    (40, "Blocked", "blocked"),
    (41, "Ignored", "ignored"),
    (42, "NoMatch", "nothing matching request found"),
    (43, "AccountDisabled", "account disabled"),
    (44, "ServiceReadOnly", "service not accepting content changes right now"),
    (45, "AccountNotFeatured", "account not featured"),
    (46, "AdministratorOK", "allowed to take this action, but only because requester is admin"),
    (47, "ContentVersion", "version mismatch in transmitted content"),
    (48, "TryAnotherCM", "try another connection manager"),
    (49, "PasswordRequiredToKickSession", "you are already logged in elsewhere, this cached credential login has failed"),
    (50, "AlreadyLoggedInElsewhere", "already logged in elsewhere, must wait"),
    (51, "Suspended", "operation suspended/paused"),
    (52, "Cancelled", "operation cancelled"),
    (53, "DataCorruption", "operation cancelled due to corrupt data"),
    (54, "DiskFull", "operation cancelled due to lack of disk space"),
    (55, "RemoteCallFailed", "remote call or IPC call failed"),
    (56, "PasswordUnset", "password not verified, as it's unset serverside"),
    (57, "ExternalAccountUnlinked", "external account not linked to a steam account"),
    (58, "PSNTicketInvalid", "PSN ticket invalid"),
    (59, "ExternalAccountAlreadyLinked", "external account linked to other account"),
    (60, "RemoteFileConflict", "sync cannot resume, conflict between local and remote files"),
    (61, "IllegalPassword", "requested password not legal"),
    (62, "SameAsPreviousValue", "new value same as old"),
    (63, "AccountLogonDenied", "account login denied due to 2nd factor auth failure"),
    (64, "CannotUseOldPassword", "requested password not legal"),
    (65, "InvalidLoginAuthCode", "account login denied, invalid auth code"),
    (66, "AccountLogonDeniedNoMail", "account login denied due to 2nd factor auth failure"),
    (67, "HardwareNotCapableOfIPT", "hardware not capable of IPT"),
    (68, "IPTInitError", "IPT init error"),
    (69, "ParentalControlRestricted", "operation failed due to parental controls"),
    (70, "FacebookQueryError", "facebook query returned error"),
    (71, "ExpiredLoginAuthCode", "account login denied, expired auth code"),
    (72, "IPLoginRestrictionFailed", "IP login restriction failed"),
    (73, "AccountLockedDown", "account locked down"),
    (74, "AccountLogonDeniedVerifiedEmailRequired", "verified email required"),
    (75, "NoMatchingURL", "no matching URL"),
];

impl ResultCode {
    pub const OK: ResultCode = ResultCode(1);
    pub const FAIL: ResultCode = ResultCode(2);
    pub const NO_CONNECTION: ResultCode = ResultCode(3);
    pub const INVALID_PARAM: ResultCode = ResultCode(8);
    pub const TIMEOUT: ResultCode = ResultCode(16);
    pub const SERVICE_UNAVAILABLE: ResultCode = ResultCode(20);
    pub const NOT_LOGGED_ON: ResultCode = ResultCode(21);
    pub const LIMIT_EXCEEDED: ResultCode = ResultCode(25);

    pub fn raw(&self) -> i32 {
        self.0
    }

    pub fn is_success(&self) -> bool {
        *self == Self::OK
    }

    fn lookup(&self) -> Option<&'static (i32, &'static str, &'static str)> {
        KNOWN_CODES.iter().find(|(code, _, _)| *code == self.0)
    }

    /// Symbolic name, e.g. `InvalidParam`
    pub fn name(&self) -> Option<&'static str> {
        self.lookup().map(|(_, name, _)| *name)
    }

    /// Human-readable description
    pub fn description(&self) -> Option<&'static str> {
        self.lookup().map(|(_, _, desc)| *desc)
    }
}

impl Default for ResultCode {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lookup() {
            Some((code, name, desc)) => write!(f, "'{}' {} ({})", code, name, desc),
            None => write!(f, "Unknown result code: {} (check Steam SDK)", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_is_success() {
        assert!(ResultCode::OK.is_success());
        assert!(!ResultCode::FAIL.is_success());
        assert!(!ResultCode(0).is_success());
    }

    #[test]
    fn test_known_code_display() {
        assert_eq!(
            ResultCode::INVALID_PARAM.to_string(),
            "'8' InvalidParam (a parameter is incorrect)"
        );
        assert_eq!(ResultCode::TIMEOUT.name(), Some("Timeout"));
    }

    #[test]
    fn test_unknown_code_display() {
        let code = ResultCode(9999);
        assert_eq!(code.name(), None);
        assert_eq!(code.to_string(), "Unknown result code: 9999 (check Steam SDK)");
    }

    #[test]
    fn test_table_has_unique_codes() {
        let mut codes: Vec<i32> = KNOWN_CODES.iter().map(|(c, _, _)| *c).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }
}
