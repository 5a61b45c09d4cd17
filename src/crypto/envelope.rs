//! The self-describing encrypted envelope.
//!
//! An envelope carries everything needed to decrypt except the passphrase:
//! the algorithm tag, the key-derivation salt, the nonce, the detached
//! authentication tag, and the ciphertext. Its text form is a flat JSON
//! object with base64 fields:
//!
//! ```text
//! {"algorithm":"chacha20-poly1305","iv":"...","salt":"...",
//!  "authTag":"...","ciphertext":"..."}
//! ```

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{aead, kdf, ALGORITHM, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{Error, Result};

mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub algorithm: String,
    #[serde(rename = "iv", with = "b64")]
    pub nonce: Vec<u8>,
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    #[serde(rename = "authTag", with = "b64")]
    pub auth_tag: Vec<u8>,
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,
}

/// Encrypt plaintext under a passphrase into a fresh envelope.
///
/// Salt and nonce are drawn from the OS CSPRNG on every call, so two
/// envelopes for equal plaintext never match. Stateless; safe to call
/// concurrently.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Result<Envelope> {
    let salt = aead::generate_salt()?;
    let nonce = aead::generate_nonce()?;
    let key = Zeroizing::new(kdf::derive_key(passphrase, &salt)?);

    let (ciphertext, auth_tag) = aead::seal(&key, &nonce, plaintext)?;

    Ok(Envelope {
        algorithm: ALGORITHM.to_string(),
        nonce: nonce.to_vec(),
        salt: salt.to_vec(),
        auth_tag,
        ciphertext,
    })
}

/// Decrypt an envelope under a passphrase.
///
/// The algorithm tag is checked before any key derivation; field lengths are
/// checked before any cryptographic work. Every verification failure after
/// that point surfaces as the same opaque [`Error::Authentication`].
pub fn decrypt(envelope: &Envelope, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    if envelope.algorithm != ALGORITHM {
        return Err(Error::UnsupportedAlgorithm(envelope.algorithm.clone()));
    }
    if envelope.salt.len() != SALT_LEN {
        return Err(Error::MalformedEnvelope(format!(
            "salt must be {SALT_LEN} bytes"
        )));
    }
    if envelope.nonce.len() != NONCE_LEN {
        return Err(Error::MalformedEnvelope(format!(
            "iv must be {NONCE_LEN} bytes"
        )));
    }
    if envelope.auth_tag.len() != TAG_LEN {
        return Err(Error::MalformedEnvelope(format!(
            "authTag must be {TAG_LEN} bytes"
        )));
    }

    let key = Zeroizing::new(kdf::derive_key(passphrase, &envelope.salt)?);
    aead::open(&key, &envelope.nonce, &envelope.ciphertext, &envelope.auth_tag)
}

/// Encrypt straight to the JSON text form.
pub fn encrypt_to_text(plaintext: &[u8], passphrase: &str) -> Result<String> {
    let envelope = encrypt(plaintext, passphrase)?;
    serde_json::to_string(&envelope).map_err(Error::Serde)
}

/// Parse the JSON text form and decrypt.
///
/// A parse failure is [`Error::MalformedEnvelope`], distinct from a failed
/// authentication.
pub fn decrypt_from_text(text: &str, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(|e| Error::MalformedEnvelope(e.to_string()))?;
    decrypt(&envelope, passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASS: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let envelope = encrypt(b"hello world", PASS).unwrap();
        let plaintext = decrypt(&envelope, PASS).unwrap();
        assert_eq!(&*plaintext, b"hello world");
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let envelope = encrypt(b"", PASS).unwrap();
        assert!(envelope.ciphertext.is_empty());
        assert_eq!(&*decrypt(&envelope, PASS).unwrap(), b"");
    }

    #[test]
    fn wrong_passphrase_fails_closed() {
        let envelope = encrypt(b"hello world", PASS).unwrap();
        let err = decrypt(&envelope, "another-passphrase-of-32-chars!!").unwrap_err();
        assert!(matches!(err, Error::Authentication));
    }

    #[test]
    fn encryption_is_probabilistic() {
        let a = encrypt(b"same plaintext", PASS).unwrap();
        let b = encrypt(b"same plaintext", PASS).unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn bit_flips_are_detected_everywhere() {
        let envelope = encrypt(b"integrity matters", PASS).unwrap();

        for field in ["ciphertext", "authTag", "iv", "salt"] {
            let mut tampered = envelope.clone();
            let bytes = match field {
                "ciphertext" => &mut tampered.ciphertext,
                "authTag" => &mut tampered.auth_tag,
                "iv" => &mut tampered.nonce,
                _ => &mut tampered.salt,
            };
            bytes[0] ^= 0x01;

            let err = decrypt(&tampered, PASS).unwrap_err();
            assert!(
                matches!(err, Error::Authentication),
                "flipping a bit in {field} must fail authentication"
            );
        }
    }

    #[test]
    fn foreign_algorithm_rejected_before_derivation() {
        let mut envelope = encrypt(b"hello", PASS).unwrap();
        envelope.algorithm = "aes-128-cbc".to_string();

        match decrypt(&envelope, PASS).unwrap_err() {
            Error::UnsupportedAlgorithm(found) => assert_eq!(found, "aes-128-cbc"),
            other => panic!("expected UnsupportedAlgorithm, got: {other:?}"),
        }
    }

    #[test]
    fn truncated_tag_is_malformed_not_auth() {
        let mut envelope = encrypt(b"hello", PASS).unwrap();
        envelope.auth_tag.truncate(8);

        let err = decrypt(&envelope, PASS).unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)));
    }

    #[test]
    fn text_form_roundtrip() {
        let text = encrypt_to_text(b"over the wire", PASS).unwrap();
        let plaintext = decrypt_from_text(&text, PASS).unwrap();
        assert_eq!(&*plaintext, b"over the wire");
    }

    #[test]
    fn text_form_uses_expected_field_names() {
        let text = encrypt_to_text(b"x", PASS).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["algorithm"], ALGORITHM);
        for field in ["iv", "salt", "authTag", "ciphertext"] {
            assert!(value[field].is_string(), "missing field {field}");
        }
    }

    #[test]
    fn garbage_text_is_malformed_not_auth() {
        let err = decrypt_from_text("not json at all", PASS).unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)));

        let err = decrypt_from_text(r#"{"algorithm":"chacha20-poly1305"}"#, PASS).unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)));
    }
}
