//! Records as they sit in the shared document
//!
//! Every client appends to the same array, and not every client agrees on
//! how a timestamp is spelled or which fields may be null. A
//! [`StoredRecord`] is an array element kept exactly as it was read, so an
//! append sends other writers' records back unchanged and a record this
//! version cannot interpret never blocks the pool.

use crate::error::{PoolError, PoolResult};
use crate::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One element of the document, held verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredRecord(Value);

impl StoredRecord {
    /// Wrap a raw JSON element
    #[inline]
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Encode a record for appending.
    ///
    /// # Errors
    /// `Validation` if the record cannot be represented as JSON.
    pub fn encode(record: &Record) -> PoolResult<Self> {
        serde_json::to_value(record)
            .map(Self)
            .map_err(|e| PoolError::validation(format!("record cannot be encoded: {e}")))
    }

    /// Interpret the element as a [`Record`].
    ///
    /// # Errors
    /// `Validation` when required fields are missing or malformed.
    pub fn decode(&self) -> PoolResult<Record> {
        Record::deserialize(&self.0)
            .map_err(|e| PoolError::validation(format!("unreadable record: {e}")))
    }

    /// The `id` field as written, if it is a string or number
    #[must_use]
    pub fn id_hint(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Borrow the raw element
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw element
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for StoredRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
