//! Identity types for stash records

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters a record identifier may contain.
pub const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a record identifier in characters.
pub const ID_LEN: usize = 6;

/// Error returned when a string is not a well-formed record identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidRecordId {
    #[error("Invalid id length: expected {expected} characters, got {got}")]
    Length { expected: usize, got: usize },

    #[error("Invalid id character {found:?} at position {position}")]
    Character { found: char, position: usize },
}

/// Short random identifier naming a stored record.
///
/// Exactly [`ID_LEN`] characters drawn from `[a-z0-9]`, giving a space of
/// 36^6 (~2.2 billion) values. The identifier is the whole capability:
/// anyone holding it can fetch the record it names. Construction goes
/// through [`RecordId::generate`] or [`RecordId::parse`], so a `RecordId`
/// in hand is always well-formed and safe to embed in file names and SQL
/// parameters.
///
/// Generation does not check for collisions; a colliding id overwrites the
/// prior record (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut s = String::with_capacity(ID_LEN);
        for _ in 0..ID_LEN {
            let idx = rng.random_range(0..ID_ALPHABET.len());
            s.push(ID_ALPHABET[idx] as char);
        }
        RecordId(s)
    }

    /// Validate and wrap an externally supplied identifier.
    ///
    /// Rejects anything that is not exactly [`ID_LEN`] characters of
    /// `[a-z0-9]`; uppercase is rejected rather than folded.
    pub fn parse(s: &str) -> Result<Self, InvalidRecordId> {
        let count = s.chars().count();
        if count != ID_LEN {
            return Err(InvalidRecordId::Length {
                expected: ID_LEN,
                got: count,
            });
        }
        for (position, found) in s.chars().enumerate() {
            if !found.is_ascii_lowercase() && !found.is_ascii_digit() {
                return Err(InvalidRecordId::Character { found, position });
            }
        }
        Ok(RecordId(s.to_owned()))
    }

    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordId {
    type Error = InvalidRecordId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        RecordId::parse(&s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> String {
        id.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
