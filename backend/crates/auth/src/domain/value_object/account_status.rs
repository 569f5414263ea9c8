//! Account Status Value Object
//!
//! The four independent account flags a principal carries. Login and token
//! acceptance both require every flag to hold.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub enabled: bool,
    pub account_non_expired: bool,
    pub account_non_locked: bool,
    pub credentials_non_expired: bool,
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self::active()
    }
}

impl AccountStatus {
    /// Fully usable account
    pub const fn active() -> Self {
        Self {
            enabled: true,
            account_non_expired: true,
            account_non_locked: true,
            credentials_non_expired: true,
        }
    }

    /// Check if login is allowed
    #[inline]
    pub const fn can_login(&self) -> bool {
        self.enabled
            && self.account_non_expired
            && self.account_non_locked
            && self.credentials_non_expired
    }

    /// Name of the first failing flag, for logs
    pub fn blocking_reason(&self) -> Option<&'static str> {
        if !self.enabled {
            Some("disabled")
        } else if !self.account_non_expired {
            Some("account_expired")
        } else if !self.account_non_locked {
            Some("locked")
        } else if !self.credentials_non_expired {
            Some("credentials_expired")
        } else {
            None
        }
    }
}
