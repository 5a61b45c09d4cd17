use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors surfaced by the envelope codec and the sealed store.
///
/// Decryption failures are deliberately opaque: wrong passphrase, flipped
/// ciphertext bits, and a corrupted tag all collapse into [`Error::Authentication`]
/// so callers cannot be used as a verification oracle.
#[derive(Debug)]
pub enum Error {
    /// Passphrase missing or below the minimum length floor.
    Config(String),
    /// Envelope names an AEAD construction this build does not support.
    UnsupportedAlgorithm(String),
    /// Tag verification failed: wrong passphrase, tampering, or corruption.
    Authentication,
    /// Stored text does not parse into an envelope, or a field has the
    /// wrong length. Detected before any cryptographic work.
    MalformedEnvelope(String),
    /// No file at the normalized path.
    NotFound(PathBuf),
    /// OS secure random source unavailable.
    Rng,
    /// Key derivation rejected its inputs.
    KeyDerivation,
    /// The cipher refused the plaintext (length overflow).
    Encrypt,
    /// Filesystem failure other than a missing file.
    Io(io::Error),
    /// A value failed to (de)serialize for `write_object`/`read_object`.
    Serde(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "configuration error: {msg}"),
            Error::UnsupportedAlgorithm(found) => {
                write!(f, "unsupported algorithm '{found}'")
            }
            Error::Authentication => {
                write!(f, "decryption failed: invalid passphrase or corrupted data")
            }
            Error::MalformedEnvelope(msg) => write!(f, "malformed envelope: {msg}"),
            Error::NotFound(path) => write!(f, "no stored object at '{}'", path.display()),
            Error::Rng => write!(f, "OS random generator unavailable"),
            Error::KeyDerivation => write!(f, "key derivation failed"),
            Error::Encrypt => write!(f, "encryption failed"),
            Error::Io(e) => write!(f, "storage I/O error: {e}"),
            Error::Serde(e) => write!(f, "value serialization failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
