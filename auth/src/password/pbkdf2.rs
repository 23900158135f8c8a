use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

use super::errors::PasswordError;

/// PBKDF2 round count. Fixed: the persisted format does not record it.
pub const ITERATIONS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes (SHA-256 output size).
pub const KEY_LENGTH: usize = 32;

const SEPARATOR: char = ':';

/// Password hashing implementation.
///
/// Derives keys with PBKDF2-HMAC-SHA256 and persists them as
/// `<salt hex>:<derived key hex>`.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Hash string in `<salt hex>:<derived key hex>` format
    ///
    /// # Errors
    /// * `HashingFailed` - The OS random source could not produce a salt
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        let key = derive_key(password, &salt);

        Ok(format!(
            "{}{}{}",
            hex::encode(salt),
            SEPARATOR,
            hex::encode(key)
        ))
    }

    /// Check a plaintext candidate against a stored hash.
    ///
    /// Never fails: a malformed stored hash (missing or repeated separator,
    /// empty or non-hex halves) simply does not match.
    ///
    /// # Arguments
    /// * `password_hash` - Stored hash in `<salt hex>:<derived key hex>` format
    /// * `password_plain` - Plaintext candidate
    ///
    /// # Returns
    /// True if the candidate derives the stored key
    pub fn validate(&self, password_hash: &str, password_plain: &str) -> bool {
        let Some((salt, expected)) = parse_hash(password_hash) else {
            return false;
        };

        let derived = derive_key(password_plain, &salt);
        constant_time_eq(&derived, &expected)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_key(password: &str, salt: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ITERATIONS, &mut key);
    key
}

fn parse_hash(password_hash: &str) -> Option<(Vec<u8>, Vec<u8>)> {
    let (salt_hex, key_hex) = password_hash.split_once(SEPARATOR)?;

    if salt_hex.is_empty() || key_hex.is_empty() || key_hex.contains(SEPARATOR) {
        return None;
    }

    let salt = hex::decode(salt_hex).ok()?;
    let key = hex::decode(key_hex).ok()?;
    Some((salt, key))
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
