//! The identifier used to track selected transactions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::Error;

/// A normalized, non-empty transaction identifier.
///
/// The server renders IDs into checkbox values and returns them as JSON
/// integers, while local storage holds them as strings. Every entry point
/// normalizes to the same string form so that `"42"`, `" 42 "` and `42`
/// compare equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Create a transaction ID from raw text.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidTransactionId] if `raw`
    /// is empty after trimming whitespace.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            Err(Error::InvalidTransactionId(raw.to_owned()))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for TransactionId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionId::new(s)
    }
}

impl From<i64> for TransactionId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TransactionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Integer(i64),
            Unsigned(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Integer(id) => Ok(TransactionId::from(id)),
            RawId::Unsigned(id) => Ok(TransactionId(id.to_string())),
            RawId::Text(text) => TransactionId::new(&text).map_err(de::Error::custom),
        }
    }
}
