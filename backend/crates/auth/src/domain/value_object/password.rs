//! Employee Password Value Objects
//!
//! Domain wrappers over `platform::password`.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::password::{EmployeePassword, RawPassword};
//!
//! let raw = RawPassword::new("password1".to_string()).unwrap();
//! let hashed = EmployeePassword::from_raw(&raw, None).unwrap();
//! assert!(hashed.verify(&raw, None));
//! ```

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Password as submitted by the client
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a submitted password against the registration policy
    ///
    /// ## Errors
    /// `AuthError::Validation` with a user-facing message
    pub fn new(raw: String) -> AuthResult<Self> {
        ClearTextPassword::new(raw)
            .map(Self)
            .map_err(|e| AuthError::Validation(Self::describe(&e)))
    }

    fn describe(error: &PasswordPolicyError) -> String {
        match error {
            PasswordPolicyError::TooShort { min, .. } => {
                format!("Password must be at least {min} characters")
            }
            PasswordPolicyError::TooLong { max, .. } => {
                format!("Password must be at most {max} characters")
            }
            PasswordPolicyError::EmptyOrWhitespace => "Password cannot be empty".to_string(),
            PasswordPolicyError::InvalidCharacter => {
                "Password contains invalid characters".to_string()
            }
        }
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Stored credential: Argon2id PHC string
#[derive(Clone, PartialEq, Eq)]
pub struct EmployeePassword(HashedPassword);

impl EmployeePassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        raw.inner()
            .hash(pepper)
            .map(Self)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|e: PasswordHashError| {
                AuthError::Internal(format!("Stored credential unreadable: {e}"))
            })
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification of a submitted password
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for EmployeePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmployeePassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_password_policy() {
        assert!(RawPassword::new("password1".to_string()).is_ok());
        assert!(matches!(
            RawPassword::new("wrong".to_string()),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            RawPassword::new(String::new()),
            Err(AuthError::Validation(_))
        ));
        let too_long = "a".repeat(platform::password::MAX_PASSWORD_LENGTH + 1);
        assert!(RawPassword::new(too_long).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let raw = RawPassword::new("password1".to_string()).unwrap();
        let hashed = EmployeePassword::from_raw(&raw, None).unwrap();
        assert!(hashed.verify(&raw, None));

        let other = RawPassword::new("password2".to_string()).unwrap();
        assert!(!hashed.verify(&other, None));
    }

    #[test]
    fn test_pepper_must_match() {
        let raw = RawPassword::new("kennel-cough".to_string()).unwrap();
        let hashed = EmployeePassword::from_raw(&raw, Some(b"pepper")).unwrap();
        assert!(hashed.verify(&raw, Some(b"pepper")));
        assert!(!hashed.verify(&raw, None));
    }

    #[test]
    fn test_phc_roundtrip_and_redaction() {
        let raw = RawPassword::new("kennel-cough".to_string()).unwrap();
        let hashed = EmployeePassword::from_raw(&raw, None).unwrap();
        let restored = EmployeePassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, None));

        assert!(format!("{raw:?}").contains("REDACTED"));
        assert!(!format!("{hashed:?}").contains("argon2"));
        assert!(EmployeePassword::from_phc_string("plain-text").is_err());
    }
}
