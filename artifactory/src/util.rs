//! Helpers shared by the resource handlers

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use tfplug::Dynamic;

const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Hex SHA-256 of `value`
pub fn hash_string(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// State function for secrets: only the hash is ever stored
pub fn hash_state(value: &Dynamic) -> Dynamic {
    match value.as_string() {
        Some(s) => Dynamic::String(hash_string(s)),
        None => value.clone(),
    }
}

/// Random password for users created without one
pub fn generate_password() -> String {
    // Artifactory's default policy wants a digit and both cases
    loop {
        let candidate: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(GENERATED_PASSWORD_LENGTH)
            .map(char::from)
            .collect();
        if candidate.chars().any(|c| c.is_ascii_digit())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_uppercase())
        {
            return candidate;
        }
    }
}
