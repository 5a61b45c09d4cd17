use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use getrandom::fill;
use zeroize::Zeroizing;

use super::{NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{Error, Result};

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| Error::Rng)
}

/// Generate a fresh key-derivation salt
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    secure_random(&mut salt)?;
    Ok(salt)
}

/// Generate a fresh nonce. Never reuse one under the same derived key.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    Ok(nonce)
}

/// Encrypt plaintext, returning ciphertext and the detached authentication tag.
pub fn seal(
    key: &[u8; super::KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));

    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| Error::Encrypt)?;

    // The aead crate appends the tag; the envelope stores it detached.
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);
    Ok((ciphertext, tag))
}

/// Decrypt ciphertext, verifying the detached tag.
pub fn open(
    key: &[u8; super::KEY_LEN],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));

    let mut combined = Vec::with_capacity(ciphertext.len() + tag.len());
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), combined.as_slice())
        .map_err(|_| Error::Authentication)?;
    Ok(Zeroizing::new(plaintext))
}
