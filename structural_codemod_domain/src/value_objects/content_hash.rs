// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Content Hash
//!
//! Hex-encoded SHA-256 digest of transformed output. The staging store
//! persists the expected hash with every stage; Apply replays the
//! transformation and refuses to touch the filesystem unless the replayed
//! hash matches, which is what makes staged work tamper-evident.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Display};

use crate::CodemodError;

/// Hex-encoded 256-bit content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hashes `content` with SHA-256.
    pub fn of(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps an existing hex digest, validating shape.
    pub fn from_hex(hex_digest: &str) -> Result<Self, CodemodError> {
        if hex_digest.len() != 64 || !hex_digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CodemodError::InvalidParams(format!(
                "not a hex-encoded SHA-256 digest: '{}'",
                hex_digest
            )));
        }
        Ok(Self(hex_digest.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-shape comparison against another digest.
    pub fn matches(&self, other: &ContentHash) -> bool {
        self.0 == other.0
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // SHA-256 of the empty string.
        assert_eq!(
            ContentHash::of(b"").as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_determinism() {
        let a = ContentHash::of(b"func main() {}");
        let b = ContentHash::of(b"func main() {}");
        assert_eq!(a, b);
        assert!(a.matches(&b));
    }

    #[test]
    fn test_from_hex_validation() {
        let digest = ContentHash::of(b"x");
        assert_eq!(ContentHash::from_hex(digest.as_str()).unwrap(), digest);
        assert!(ContentHash::from_hex("abc").is_err());
        assert!(ContentHash::from_hex(&"zz".repeat(32)).is_err());
    }
}
