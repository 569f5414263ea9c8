//! Password Hashing and Verification
//!
//! Staff credentials are checked against a length policy, normalized, and
//! stored as Argon2id PHC strings. Clear text lives only inside
//! [`ClearTextPassword`], which wipes itself on drop.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Minimum password length in code points
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length in code points
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Argon2id cost for new hashes: 19 MiB, 2 passes, 1 lane
pub const ARGON2_MEMORY_KIB: u32 = 19_456;
pub const ARGON2_ITERATIONS: u32 = 2;
pub const ARGON2_PARALLELISM: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Control characters other than tab and newline
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Policy
// ============================================================================

/// Length rules applied to submitted passwords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            max_length: MAX_PASSWORD_LENGTH,
        }
    }
}

impl PasswordPolicy {
    /// Check an already-normalized password
    pub fn check(&self, normalized: &str) -> Result<(), PasswordPolicyError> {
        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Code points, not bytes
        let actual = normalized.chars().count();
        if actual < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
                actual,
            });
        }
        if actual > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max: self.max_length,
                actual,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(())
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Submitted password, NFKC-normalized and validated
///
/// Not `Clone`. Debug output is redacted and memory is wiped on drop.
///
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("kennel-cough-42".to_string()).unwrap();
/// let hashed = password.hash(None).unwrap();
/// assert!(hashed.verify(&password, None));
/// ```
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Normalize and validate against [`PasswordPolicy::default`]
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        Self::with_policy(raw, &PasswordPolicy::default())
    }

    pub fn with_policy(raw: String, policy: &PasswordPolicy) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw);
        let password = Self(raw.nfkc().collect());

        policy.check(&password.0)?;
        Ok(password)
    }

    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    /// Password bytes with the pepper appended, wiped on drop
    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut combined = Zeroizing::new(self.0.as_bytes().to_vec());
        if let Some(p) = pepper {
            combined.extend_from_slice(p);
        }
        combined
    }

    /// Hash with Argon2id and a fresh salt
    ///
    /// `pepper` must be the same value later passed to [`HashedPassword::verify`].
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        self.hash_with(&current_hasher()?, pepper)
    }

    fn hash_with(
        &self,
        hasher: &Argon2<'_>,
        pepper: Option<&[u8]>,
    ) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = hasher
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClearTextPassword([REDACTED])")
    }
}

fn current_hasher() -> Result<Argon2<'static>, PasswordHashError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2 hash in PHC string format, as stored in the database
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Accept a stored PHC string after checking that it parses
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify in constant time. An unreadable hash never matches.
    ///
    /// Cost parameters come from the PHC string, so hashes made with older
    /// settings still verify.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(&password.peppered(pepper), &parsed)
            .is_ok()
    }

    /// Whether the hash uses another algorithm or a weaker cost than new hashes
    pub fn needs_rehash(&self) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return true;
        };
        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        match Params::try_from(&parsed) {
            Ok(params) => {
                params.m_cost() < ARGON2_MEMORY_KIB
                    || params.t_cost() < ARGON2_ITERATIONS
                    || params.p_cost() < ARGON2_PARALLELISM
            }
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword([HASH])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hash(password: &ClearTextPassword) -> HashedPassword {
        let params = Params::new(1024, 1, 1, None).unwrap();
        let hasher = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        password.hash_with(&hasher, None).unwrap()
    }

    #[test]
    fn test_length_boundaries() {
        assert!(ClearTextPassword::new("abcdefgh".to_string()).is_ok());
        assert_eq!(
            ClearTextPassword::new("abcdefg".to_string()).unwrap_err(),
            PasswordPolicyError::TooShort { min: 8, actual: 7 }
        );
        assert!(ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH)).is_ok());
        assert_eq!(
            ClearTextPassword::new("a".repeat(MAX_PASSWORD_LENGTH + 1)).unwrap_err(),
            PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: MAX_PASSWORD_LENGTH + 1
            }
        );
    }

    #[test]
    fn test_blank_passwords_rejected() {
        for raw in ["", "          "] {
            assert_eq!(
                ClearTextPassword::new(raw.to_string()).unwrap_err(),
                PasswordPolicyError::EmptyOrWhitespace
            );
        }
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(
            ClearTextPassword::new("vet\u{0007}clinic".to_string()).unwrap_err(),
            PasswordPolicyError::InvalidCharacter
        );
        assert!(ClearTextPassword::new("tab\tallowed".to_string()).is_ok());
    }

    #[test]
    fn test_length_counts_code_points() {
        // 8 code points, 24 bytes
        assert!(ClearTextPassword::new("犬猫兎鳥魚亀蛇馬".to_string()).is_ok());
    }

    #[test]
    fn test_nfkc_equivalent_inputs_verify() {
        // Full-width digit normalizes to ASCII
        let full_width = ClearTextPassword::new("password１".to_string()).unwrap();
        let ascii = ClearTextPassword::new("password1".to_string()).unwrap();

        let hashed = ascii.hash(None).unwrap();
        assert!(hashed.verify(&full_width, None));
    }

    #[test]
    fn test_custom_policy() {
        let strict = PasswordPolicy {
            min_length: 12,
            max_length: 64,
        };
        assert!(ClearTextPassword::with_policy("password1".to_string(), &strict).is_err());
        assert!(ClearTextPassword::with_policy("longer-password1".to_string(), &strict).is_ok());
    }

    #[test]
    fn test_verify_respects_pepper() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let pepper = b"clinic-pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"other-pepper")));

        let wrong = ClearTextPassword::new_unchecked("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong, Some(pepper)));
    }

    #[test]
    fn test_stored_hash_restores() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let stored = password.hash(None).unwrap().as_phc_string().to_string();

        assert!(stored.starts_with("$argon2id$"));
        let restored = HashedPassword::from_phc_string(stored).unwrap();
        assert!(restored.verify(&password, None));

        assert!(matches!(
            HashedPassword::from_phc_string("not_a_valid_hash"),
            Err(PasswordHashError::InvalidHashFormat)
        ));
    }

    #[test]
    fn test_needs_rehash_tracks_cost() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        assert!(!password.hash(None).unwrap().needs_rehash());

        let cheap = cheap_hash(&password);
        assert!(cheap.needs_rehash());
        assert!(cheap.verify(&password, None));
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new_unchecked("secret".to_string());
        assert_eq!(format!("{password:?}"), "ClearTextPassword([REDACTED])");

        let hashed = cheap_hash(&password);
        assert_eq!(format!("{hashed:?}"), "HashedPassword([HASH])");
    }
}
