//! AES-256-GCM authenticated encryption with a detached nonce.
//!
//! The engine applies this as the server-side envelope layer on top of the
//! client's own ciphertext. The nonce is generated fresh per call and returned
//! separately so the caller can persist it alongside the ciphertext; it is not
//! derivable afterwards, which is what makes scrubbing it an effective
//! cryptographic erasure.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::SymmetricKey;
use crate::random::generate_nonce;

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Encrypts plaintext using AES-256-GCM.
///
/// A fresh random nonce is generated per call and returned next to the
/// ciphertext. Both must be stored; decryption requires the exact nonce.
pub fn encrypt(
    key: &SymmetricKey,
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_SIZE]), CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce_bytes))
}

/// Decrypts ciphertext produced by [`encrypt`].
///
/// Fails with [`CryptoError::DecryptionFailed`] when the key, nonce, and
/// ciphertext are inconsistent (wrong key, nonce mismatch, or tampering).
///
/// The plaintext is wrapped in `Zeroizing` for automatic memory cleanup.
pub fn decrypt(
    key: &SymmetricKey,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "expected {} byte nonce, got {}",
            NONCE_SIZE,
            nonce.len()
        )));
    }

    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::InvalidInput(
            "ciphertext too short".to_string(),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    let nonce = Nonce::from_slice(nonce);

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))?;

    Ok(Zeroizing::new(plaintext))
}
