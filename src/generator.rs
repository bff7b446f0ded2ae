// src/generator.rs
use crate::error::{LedgerError, LedgerResult};
use sha2::{Digest, Sha256};

/// Fixed output alphabet: lowercase and uppercase letters, digits, and
/// eight symbols. All index arithmetic uses `CHARSET.len()`.
pub const CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

pub const MIN_LENGTH: usize = 8;
pub const MAX_LENGTH: usize = 32;

/// Rejects lengths outside `[MIN_LENGTH, MAX_LENGTH]` before any seed
/// material is consumed.
pub fn check_length(length: usize) -> LedgerResult<()> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(LedgerError::Validation(format!(
            "password length must be between {} and {}, got {}",
            MIN_LENGTH, MAX_LENGTH, length
        )));
    }
    Ok(())
}

/// The per-call inputs the password is derived from. Every field is
/// observable or guessable by third parties; nothing here is a secret.
#[derive(Debug, Clone)]
pub struct SeedMaterial<'a> {
    pub time: u64,
    pub entropy: [u8; 32],
    pub account: &'a str,
    pub sequence: u64,
}

/// Derives a printable pseudo-random string from the seed material by
/// hash chaining: an initial SHA-256 over the material, then one rehash
/// per output position, each picking `CHARSET[digest mod len]`.
///
/// This is a reproducible function of its inputs, NOT a secure random
/// source: anyone who can reconstruct (time, entropy block, account,
/// sequence) can reconstruct the password. Treat the output as a
/// convenience suggestion, never as cryptographic key material.
pub fn derive_password(material: &SeedMaterial<'_>, length: usize) -> LedgerResult<String> {
    check_length(length)?;

    let mut hasher = Sha256::new();
    hasher.update(material.time.to_be_bytes());
    hasher.update(material.entropy);
    hasher.update(material.account.as_bytes());
    hasher.update(material.sequence.to_be_bytes());
    let mut seed: [u8; 32] = hasher.finalize().into();

    let mut password = String::with_capacity(length);
    for position in 0..length {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update((position as u64).to_be_bytes());
        seed = hasher.finalize().into();

        let mut word = [0u8; 8];
        word.copy_from_slice(&seed[..8]);
        let index = u64::from_be_bytes(word);
        password.push(CHARSET[(index % CHARSET.len() as u64) as usize] as char);
    }
    Ok(password)
}
