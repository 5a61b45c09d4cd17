use argon2::{Algorithm, Argon2, Params, Version};

use super::KEY_LEN;
use crate::error::{Error, Result};

// Fixed derivation cost. Not caller-tunable: a weaker parameter set must not
// be reachable from any public surface.
const MEM_COST_KIB: u32 = 64 * 1024;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 1;

/// Derive a 256-bit encryption key from a passphrase and salt.
///
/// Deterministic: the same `(passphrase, salt)` pair always yields the same
/// key. The Argon2id cost parameters are a fixed policy constant.
pub fn derive_key(passphrase: &str, salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    let params = Params::new(MEM_COST_KIB, TIME_COST, PARALLELISM, Some(KEY_LEN))
        .map_err(|_| Error::KeyDerivation)?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|_| Error::KeyDerivation)?;

    Ok(key)
}
