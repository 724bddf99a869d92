//! Security event kinds.

use serde::{Deserialize, Serialize};

/// Kind of an append-only security event.
///
/// A closed enumeration with a total string mapping; unknown strings from
/// the database are a data-corruption error, not a fallback variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    /// A login attempt failed (unknown email or wrong password).
    LoginFailed,
    /// An account was locked, or a locked/deactivated account was used.
    AccountBlocked,
    /// Something worth an operator's attention, e.g. a session token
    /// presented for a deactivated account.
    SuspiciousActivity,
    /// An administrator changed their password.
    PasswordChanged,
}

impl SecurityEventKind {
    /// Stable string form used in the database and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LoginFailed => "login_failed",
            Self::AccountBlocked => "account_blocked",
            Self::SuspiciousActivity => "suspicious_activity",
            Self::PasswordChanged => "password_changed",
        }
    }
}

impl std::fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SecurityEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login_failed" => Ok(Self::LoginFailed),
            "account_blocked" => Ok(Self::AccountBlocked),
            "suspicious_activity" => Ok(Self::SuspiciousActivity),
            "password_changed" => Ok(Self::PasswordChanged),
            _ => Err(format!("invalid security event kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_total() {
        for kind in [
            SecurityEventKind::LoginFailed,
            SecurityEventKind::AccountBlocked,
            SecurityEventKind::SuspiciousActivity,
            SecurityEventKind::PasswordChanged,
        ] {
            assert_eq!(kind.as_str().parse::<SecurityEventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!("login_succeeded".parse::<SecurityEventKind>().is_err());
    }
}
