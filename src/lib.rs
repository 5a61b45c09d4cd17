//! Passphrase-sealed envelope encryption and encrypted file storage.
//!
//! Two layers, strictly stacked: the envelope codec ([`encrypt`]/[`decrypt`]
//! and their text forms) turns plaintext into a self-describing JSON envelope
//! under a passphrase-derived key, and [`SealedStore`] persists those
//! envelopes as `.enc` files under a base directory. The store forwards the
//! passphrase captured at [`SealedStore::open`] to the codec on every call
//! and owns no other cryptographic material.

mod config;
mod crypto;
mod error;
mod gate;
mod store;

pub use config::{
    DATA_DIR_VAR, DEFAULT_DATA_DIR, MIN_PASSPHRASE_LEN, PASSPHRASE_VAR, StoreConfig,
};
pub use crypto::{
    ALGORITHM, Envelope, KEY_LEN, NONCE_LEN, SALT_LEN, TAG_LEN, decrypt, decrypt_from_text,
    derive_key, encrypt, encrypt_to_text,
};
pub use error::{Error, Result};
pub use gate::token_matches;
pub use store::{ENC_SUFFIX, SealedStore, normalize};
