//! Principal Capability
//!
//! What the token codec and authentication gate need to know about an
//! authenticated party. Implemented by composition on flat entities.

use crate::domain::value_object::{account_status::AccountStatus, password::EmployeePassword};

pub trait Principal {
    /// Unique identifier placed in the token `sub` claim (the email)
    fn subject(&self) -> &str;

    /// Permission strings plus the `ROLE_<NAME>` authority
    fn authorities(&self) -> Vec<String>;

    fn credentials(&self) -> &EmployeePassword;

    fn account_status(&self) -> AccountStatus;

    fn is_enabled(&self) -> bool {
        self.account_status().can_login()
    }
}
