//! Salted password credentials.
//!
//! # Invariants
//! - Plaintext passwords are never stored or logged.
//! - Digest comparison runs in time independent of the first mismatch.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{Debug, Formatter};
use uuid::Uuid;

const STRETCH_ROUNDS: u32 = 4096;

/// Stored verifier for one identity password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub salt: String,
    /// Lowercase hex SHA-256, stretched `STRETCH_ROUNDS` times.
    pub digest: String,
}

impl Credential {
    /// Hashes `password` under a freshly generated salt.
    pub fn from_password(password: &str) -> Self {
        Self::with_salt(Uuid::new_v4().simple().to_string(), password)
    }

    pub fn with_salt(salt: impl Into<String>, password: &str) -> Self {
        let salt = salt.into();
        let digest = derive_digest(&salt, password);
        Self { salt, digest }
    }

    pub fn verify(&self, password: &str) -> bool {
        let candidate = derive_digest(&self.salt, password);
        constant_time_eq(candidate.as_bytes(), self.digest.as_bytes())
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("salt", &self.salt)
            .field("digest", &"<redacted>")
            .finish()
    }
}

fn derive_digest(salt: &str, password: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..STRETCH_ROUNDS {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .finalize();
    }
    format!("{digest:x}")
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
