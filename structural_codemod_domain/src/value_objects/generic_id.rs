// /////////////////////////////////////////////////////////////////////////////
// Structural Codemod
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Generic Entity Identifier
//!
//! Type-safe, ULID-backed identifiers for domain entities. A marker type
//! parameter distinguishes id categories at compile time, so a `StageId`
//! can never be passed where a `SessionId` is expected even though both
//! are ULIDs underneath.
//!
//! ULIDs give the staging store temporal ordering for free: ids sort by
//! creation time, which keeps `ORDER BY id` queries chronological.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use ulid::Ulid;

use crate::CodemodError;

/// Category marker implemented by each concrete id type.
///
/// The default validation rejects nil ULIDs; categories may layer on
/// additional rules.
pub trait IdCategory {
    fn category_name() -> &'static str;

    fn validate_id(ulid: &Ulid) -> Result<(), CodemodError> {
        // Default implementation - can be overridden
        if *ulid == Ulid::nil() {
            return Err(CodemodError::InvalidParams(format!(
                "{} ID cannot be nil",
                Self::category_name()
            )));
        }
        Ok(())
    }
}

/// ULID wrapper parameterized by an [`IdCategory`] marker.
///
/// Serializes as the plain 26-character ULID string so ids round-trip
/// through JSON, SQLite TEXT columns, and API payloads unchanged.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub struct GenericId<T: IdCategory> {
    value: Ulid,
    _phantom: std::marker::PhantomData<T>,
}

// Custom serialization to use simple string format instead of JSON object
impl<T: IdCategory> Serialize for GenericId<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.to_string().serialize(serializer)
    }
}

impl<'de, T: IdCategory> Deserialize<'de> for GenericId<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ulid = Ulid::from_string(&s).map_err(|e| serde::de::Error::custom(e.to_string()))?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }
}

impl<T: IdCategory> GenericId<T> {
    /// Creates a new id with the current timestamp.
    pub fn new() -> Self {
        Self {
            value: Ulid::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Creates an id from an existing ULID, applying category validation.
    pub fn from_ulid(ulid: Ulid) -> Result<Self, CodemodError> {
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Creates an id pinned to a specific timestamp.
    ///
    /// Primary use case is boundary ids for time-range queries against the
    /// staging store.
    pub fn from_timestamp_ms(timestamp_ms: u64) -> Result<Self, CodemodError> {
        // Generate random bits for the ULID
        let random = rand::random::<u128>() & ((1u128 << 80) - 1); // Mask to 80 bits
        let ulid = Ulid::from_parts(timestamp_ms, random);
        T::validate_id(&ulid)?;
        Ok(Self {
            value: ulid,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Parses an id from its 26-character ULID string representation.
    pub fn from_string(s: &str) -> Result<Self, CodemodError> {
        let ulid = Ulid::from_str(s)
            .map_err(|e| CodemodError::InvalidParams(format!("Invalid entity ID format: {}", e)))?;
        Self::from_ulid(ulid)
    }

    /// Gets the underlying ULID value.
    pub fn as_ulid(&self) -> Ulid {
        self.value
    }

    /// Milliseconds since the Unix epoch encoded in the id.
    pub fn timestamp_ms(&self) -> u64 {
        self.value.timestamp_ms()
    }

    /// Creation time as a UTC datetime.
    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        let timestamp_ms = self.timestamp_ms();
        chrono::DateTime::from_timestamp_millis(timestamp_ms as i64).unwrap_or_else(chrono::Utc::now)
    }

    /// Category name of the marker type.
    pub fn category(&self) -> &'static str {
        T::category_name()
    }

    pub fn is_nil(&self) -> bool {
        self.value.0 == 0
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self {
            value: Ulid(0),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: IdCategory> Default for GenericId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IdCategory> Display for GenericId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: IdCategory> Hash for GenericId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T: IdCategory> FromStr for GenericId<T> {
    type Err = CodemodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl<T: IdCategory> From<GenericId<T>> for Ulid {
    fn from(id: GenericId<T>) -> Self {
        id.value
    }
}

impl<T: IdCategory> AsRef<Ulid> for GenericId<T> {
    fn as_ref(&self) -> &Ulid {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestMarker;

    impl IdCategory for TestMarker {
        fn category_name() -> &'static str {
            "test"
        }
    }

    type TestId = GenericId<TestMarker>;

    #[test]
    fn test_new_ids_are_unique() {
        let a = TestId::new();
        let b = TestId::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn test_string_round_trip() {
        let id = TestId::new();
        let parsed = TestId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_nil_rejected() {
        assert!(TestId::from_ulid(Ulid::nil()).is_err());
        assert!(TestId::from_string("invalid-ulid").is_err());
    }

    #[test]
    fn test_serde_uses_plain_string() {
        let id = TestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: TestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_timestamp_ordering() {
        let early = TestId::from_timestamp_ms(1_000_000).unwrap();
        let late = TestId::from_timestamp_ms(2_000_000).unwrap();
        assert!(early < late);
        assert_eq!(early.timestamp_ms(), 1_000_000);
    }
}
