//! Cryptographic core: key derivation, AEAD sealing, and the envelope codec.

pub mod aead;
pub mod envelope;
pub mod kdf;

pub use envelope::{decrypt, decrypt_from_text, encrypt, encrypt_to_text, Envelope};
pub use kdf::derive_key;

/// The single supported AEAD construction.
pub const ALGORITHM: &str = "chacha20-poly1305";
/// Length of the key-derivation salt (32 bytes / 256 bits).
pub const SALT_LEN: usize = 32;
/// Length of the nonce (12 bytes for ChaCha20-Poly1305).
pub const NONCE_LEN: usize = 12;
/// Length of the Poly1305 authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Length of the encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
