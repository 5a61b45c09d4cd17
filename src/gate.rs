//! Token comparison for the host's authentication gate.
//!
//! The HTTP middleware itself lives in the host; this crate only supplies the
//! primitive it must use so header checks never become a timing oracle.

use subtle::ConstantTimeEq;

/// Constant-time comparison of a presented token against the configured one.
///
/// A length mismatch returns early; only the length leaks, never the content
/// position at which the tokens diverge.
pub fn token_matches(presented: &str, expected: &str) -> bool {
    let a = presented.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
