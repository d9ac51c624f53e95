// ── Credential crypto ──
//
// AES-256-GCM helpers for remote credentials generated on behalf of a
// tenant. The per-company key lives in one protocol data record and the
// encrypted credentials in another, both base64 for storage as plain
// strings. Output format: `nonce (12 bytes) || ciphertext || tag`.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};

use crate::error::CoreError;

const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;

/// Generate a fresh random AES-256 key, base64-encoded for storage.
pub fn gen_key() -> String {
    let mut bytes = [0u8; KEY_SIZE];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Generate a random alphanumeric password.
pub fn gen_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Encrypt `plaintext` under a base64 key from [`gen_key`], returning
/// base64 ciphertext.
pub fn encrypt(key_b64: &str, plaintext: &str) -> Result<String, CoreError> {
    let cipher = cipher_for(key_b64)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CoreError::Crypto("encryption failed".into()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend(ciphertext);
    Ok(BASE64.encode(out))
}

/// Decrypt a value produced by [`encrypt`].
pub fn decrypt(key_b64: &str, ciphertext_b64: &str) -> Result<String, CoreError> {
    let cipher = cipher_for(key_b64)?;

    let raw = BASE64
        .decode(ciphertext_b64)
        .map_err(|e| CoreError::Crypto(format!("invalid ciphertext encoding: {e}")))?;
    if raw.len() < NONCE_SIZE {
        return Err(CoreError::Crypto("ciphertext too short".into()));
    }

    let nonce = Nonce::from_slice(&raw[..NONCE_SIZE]);
    let plaintext = cipher
        .decrypt(nonce, &raw[NONCE_SIZE..])
        .map_err(|_| CoreError::Crypto("decryption failed".into()))?;

    String::from_utf8(plaintext)
        .map_err(|_| CoreError::Crypto("decrypted data is not UTF-8".into()))
}

fn cipher_for(key_b64: &str) -> Result<Aes256Gcm, CoreError> {
    let key = BASE64
        .decode(key_b64)
        .map_err(|e| CoreError::Crypto(format!("invalid key encoding: {e}")))?;
    if key.len() != KEY_SIZE {
        return Err(CoreError::Crypto(format!(
            "invalid key size: {} (expected {KEY_SIZE})",
            key.len()
        )));
    }
    Ok(Aes256Gcm::new(GenericArray::from_slice(&key)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = gen_key();
        let encrypted = encrypt(&key, r#"{"username":"acme-admin"}"#).unwrap();
        assert_eq!(
            decrypt(&key, &encrypted).unwrap(),
            r#"{"username":"acme-admin"}"#
        );
    }

    #[test]
    fn wrong_key_fails() {
        let encrypted = encrypt(&gen_key(), "secret").unwrap();
        assert!(decrypt(&gen_key(), &encrypted).is_err());
    }

    #[test]
    fn nonces_are_fresh_per_encryption() {
        let key = gen_key();
        assert_ne!(encrypt(&key, "x").unwrap(), encrypt(&key, "x").unwrap());
    }

    #[test]
    fn generated_passwords_have_requested_length() {
        let password = gen_password(24);
        assert_eq!(password.len(), 24);
        assert!(password.chars().all(char::is_alphanumeric));
    }
}
