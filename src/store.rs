//! Encrypted object store: envelopes on the filesystem.
//!
//! Every stored object is one envelope JSON file carrying the `.enc` suffix.
//! The store holds the passphrase captured at construction and forwards it to
//! the codec on every operation; it owns no other cryptographic material.
//!
//! Writes are atomic: data goes to a randomly named temp file which is synced
//! and renamed over the target, so a crash leaves either the old or the new
//! object, never a partial one. Two writers racing on one path still resolve
//! to last-writer-wins.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use getrandom::fill;
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::config::StoreConfig;
use crate::crypto;
use crate::error::{Error, Result};

/// Suffix carried by every stored envelope file.
pub const ENC_SUFFIX: &str = ".enc";

/// Append the envelope suffix unless the path already carries it. Idempotent.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.as_os_str().to_string_lossy().ends_with(ENC_SUFFIX) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(ENC_SUFFIX);
        PathBuf::from(name)
    }
}

/// A passphrase-sealed file store rooted at a base directory.
pub struct SealedStore {
    passphrase: Zeroizing<String>,
    base_dir: PathBuf,
}

impl SealedStore {
    /// Build a store from its configuration.
    ///
    /// This is the fail-secure gate: a missing or too-short passphrase yields
    /// [`Error::Config`] and no store. The host decides whether that aborts
    /// the process.
    pub fn open(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            passphrase: config.passphrase,
            base_dir: config.base_dir,
        })
    }

    /// The directory relative paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Normalized on-disk path for a logical object path.
    fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let normalized = normalize(path);
        if normalized.is_absolute() {
            normalized
        } else {
            self.base_dir.join(normalized)
        }
    }

    /// Directory paths are resolved without the envelope suffix.
    fn resolve_dir(&self, dir: impl AsRef<Path>) -> PathBuf {
        let dir = dir.as_ref();
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }

    /// Encrypt `bytes` and write the envelope to `normalize(path)`,
    /// creating parent directories as needed. Full overwrite.
    pub fn write(&self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let target = self.resolve(path);
        let text = crypto::encrypt_to_text(bytes, &self.passphrase)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        self.save_atomic(&target, text.as_bytes())
    }

    /// Read and decrypt the envelope at `normalize(path)`.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Zeroizing<Vec<u8>>> {
        let target = self.resolve(path);
        let text = fs::read_to_string(&target).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound(target.clone())
            } else {
                Error::Io(e)
            }
        })?;
        crypto::decrypt_from_text(&text, &self.passphrase)
    }

    /// Serialize `value` to canonical JSON and store it encrypted.
    pub fn write_object<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> Result<()> {
        let bytes = Zeroizing::new(serde_json::to_vec(value).map_err(Error::Serde)?);
        self.write(path, &bytes)
    }

    /// Read, decrypt, and deserialize a stored value.
    pub fn read_object<T: DeserializeOwned>(&self, path: impl AsRef<Path>) -> Result<T> {
        let bytes = self.read(path)?;
        serde_json::from_slice(&bytes).map_err(Error::Serde)
    }

    /// Advisory existence check; any access failure reads as "not there".
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.resolve(path).exists()
    }

    /// Remove the envelope at `normalize(path)`.
    pub fn delete(&self, path: impl AsRef<Path>) -> Result<()> {
        let target = self.resolve(path);
        fs::remove_file(&target).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::NotFound(target.clone())
            } else {
                Error::Io(e)
            }
        })
    }

    /// Names of envelope files directly under `dir`, sorted.
    ///
    /// Advisory like [`Self::exists`]: an unreadable or missing directory
    /// yields an empty list, never an error.
    pub fn list(&self, dir: impl AsRef<Path>) -> Vec<String> {
        let dir = self.resolve_dir(dir);
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(ENC_SUFFIX))
            .collect();
        names.sort();
        names
    }

    /// Write data to a temp file, sync it, and atomically replace the target.
    fn save_atomic(&self, target: &Path, data: &[u8]) -> Result<()> {
        let tmp_path = random_tmp_path(target)?;

        // securely create temp file (fail if exists)
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)?;

        tmp_file.write_all(data)?;
        tmp_file.sync_all()?; // fsync file
        drop(tmp_file);

        if let Err(e) = atomic_replace(&tmp_path, target) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        // fsync directory so the rename itself is persisted
        if let Some(parent) = target.parent() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }

        Ok(())
    }
}

/// Unique temp path in the target's directory, name drawn from the CSPRNG.
/// Format: `filename.tmp.<randomhex>`
fn random_tmp_path(target: &Path) -> Result<PathBuf> {
    let mut buf = [0u8; 8]; // 64 bit entropy
    fill(&mut buf).map_err(|_| Error::Rng)?;

    let rand_string = buf.iter().map(|b| format!("{:02x}", b)).collect::<String>();

    let file_name = target.file_name().unwrap_or_default().to_string_lossy();
    let tmp_name = format!("{}.tmp.{}", file_name, rand_string);

    Ok(target.with_file_name(tmp_name))
}

/// Atomically replaces the target file with the temporary file.
///
/// Uses Windows `ReplaceFileW` with `REPLACEFILE_WRITE_THROUGH` so the
/// operation is truly atomic and persisted to disk.
#[cfg(target_os = "windows")]
fn atomic_replace(tmp_path: &Path, target: &Path) -> Result<()> {
    use std::ffi::OsStr;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

    fn to_wide(s: &OsStr) -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    }

    // ReplaceFileW fails if the target does not exist yet; fall back to a
    // plain rename for the first write.
    if !target.exists() {
        fs::rename(tmp_path, target)?;
        return Ok(());
    }

    let target_w = to_wide(target.as_os_str());
    let tmp_w = to_wide(tmp_path.as_os_str());

    // SAFETY:
    // - Strings are valid UTF-16 and null-terminated
    // - Pointers remain valid during the call
    // - Windows does not retain the pointers after return
    let result = unsafe {
        ReplaceFileW(
            target_w.as_ptr(),
            tmp_w.as_ptr(),
            std::ptr::null(),
            REPLACEFILE_WRITE_THROUGH,
            std::ptr::null(),
            std::ptr::null(),
        )
    };

    if result == 0 {
        return Err(Error::Io(io::Error::last_os_error()));
    }

    Ok(())
}

/// Atomically replaces the target file with the temporary file.
///
/// On Unix, `rename()` is atomic when both paths are on the same filesystem.
#[cfg(not(target_os = "windows"))]
fn atomic_replace(tmp_path: &Path, target: &Path) -> Result<()> {
    fs::rename(tmp_path, target)?;
    Ok(())
}
