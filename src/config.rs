use std::env;
use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Shortest passphrase the store will accept.
pub const MIN_PASSPHRASE_LEN: usize = 32;
/// Base directory used when none is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Environment variable holding the passphrase.
pub const PASSPHRASE_VAR: &str = "SEALBOX_PASSPHRASE";
/// Environment variable overriding the base data directory.
pub const DATA_DIR_VAR: &str = "SEALBOX_DATA_DIR";

/// Configuration injected into a [`crate::SealedStore`].
///
/// The passphrase lives here for the lifetime of the store and is never
/// persisted by this layer. Two stores built from different configs are fully
/// independent; nothing is process-global.
#[derive(Clone)]
pub struct StoreConfig {
    pub passphrase: Zeroizing<String>,
    pub base_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(passphrase: Zeroizing<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            passphrase,
            base_dir: base_dir.into(),
        }
    }

    /// Read config from the environment: `SEALBOX_PASSPHRASE` is required,
    /// `SEALBOX_DATA_DIR` falls back to `data/`.
    pub fn from_env() -> Result<Self> {
        let passphrase = env::var(PASSPHRASE_VAR)
            .map(Zeroizing::new)
            .map_err(|_| Error::Config(format!("{PASSPHRASE_VAR} is not set")))?;

        let base_dir = env::var_os(DATA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Ok(Self {
            passphrase,
            base_dir,
        })
    }

    /// The fail-secure floor: too short a passphrase means no store.
    pub(crate) fn validate(&self) -> Result<()> {
        let len = self.passphrase.chars().count();
        if len < MIN_PASSPHRASE_LEN {
            return Err(Error::Config(format!(
                "passphrase must be at least {MIN_PASSPHRASE_LEN} characters, got {len}"
            )));
        }
        Ok(())
    }
}
