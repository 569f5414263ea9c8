//! Hashing, encoding and comparison helpers shared by the auth layers

use std::fmt::Write as _;

use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

/// Bytes of the digest kept in a [`token_fingerprint`]
const FINGERPRINT_BYTES: usize = 8;

pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Standard alphabet with padding; surrounding whitespace is ignored
pub fn from_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded.trim())
}

/// Log-safe label for a bearer token
///
/// Lowercase hex of the leading digest bytes. Equal tokens share a label;
/// the token cannot be recovered from it.
pub fn token_fingerprint(token: &str) -> String {
    let digest = sha256(token.as_bytes());
    digest[..FINGERPRINT_BYTES]
        .iter()
        .fold(String::with_capacity(FINGERPRINT_BYTES * 2), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}

/// Byte comparison whose running time depends only on the length
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_vectors() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(sha256(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_base64_decoding() {
        assert_eq!(from_base64("cGV0d2VsbA==").unwrap(), b"petwell");
        assert_eq!(from_base64("cGV0d2VsbA==\n").unwrap(), b"petwell");
        assert!(from_base64("not base64!").is_err());
    }

    #[test]
    fn test_token_fingerprint() {
        let token = "header.payload.signature";
        let fp = token_fingerprint(token);

        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(fp, hex::encode(&sha256(token.as_bytes())[..FINGERPRINT_BYTES]));
        assert_ne!(fp, token_fingerprint("header.payload.other"));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"token-a", b"token-a"));
        assert!(!constant_time_eq(b"token-a", b"token-b"));
        assert!(!constant_time_eq(b"token", b"token-a"));
        assert!(constant_time_eq(b"", b""));
    }
}
