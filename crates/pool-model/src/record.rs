//! Submission records
//!
//! A [`Record`] is built once by the submitting client and never changed
//! afterwards. Wire names follow the existing `eggs.json` layout so documents
//! written by older clients keep decoding, and any field this version does not
//! know about is carried through untouched in [`Record::extra`].

use crate::entity::EntityMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use ulid::Ulid;

/// Unique record identifier
///
/// New ids are ULIDs, so they sort by creation time. Ids written by other
/// clients are accepted as arbitrary strings or as millisecond numbers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(id) => Self(id),
            Raw::Number(id) => Self(id.to_string()),
        })
    }
}

impl RecordId {
    /// Generate a fresh, timestamp-prefixed id
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One submitted egg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique id
    pub id: RecordId,
    /// Trainer who submitted the egg
    pub submitter: String,
    /// Canonical entity name
    #[serde(rename = "pokemon")]
    pub entity_name: String,
    /// Entity id
    #[serde(rename = "pokemonId")]
    pub entity_id: u32,
    /// Entity image URL
    #[serde(rename = "spriteUrl")]
    pub image_ref: String,
    /// Optional nickname (empty when unset)
    #[serde(default, deserialize_with = "null_as_default")]
    pub nickname: String,
    /// Optional ability
    #[serde(default, deserialize_with = "null_as_default")]
    pub ability: String,
    /// Optional held item
    #[serde(default, deserialize_with = "null_as_default")]
    pub item: String,
    /// Up to four moves
    #[serde(default, deserialize_with = "null_as_default")]
    pub moves: Vec<String>,
    /// Optional free-text message
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
    /// Fields written by other clients that this version does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Optional fields written as `null` read as their empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// Start building a record for a confirmed entity
    #[inline]
    #[must_use]
    pub fn builder(submitter: impl Into<String>, entity: &EntityMatch) -> RecordBuilder {
        RecordBuilder::new(submitter, entity)
    }

    /// Moves that are not blank
    pub fn moves(&self) -> impl Iterator<Item = &str> {
        self.moves.iter().map(String::as_str).filter(|m| !m.is_empty())
    }
}

/// Builder for [`Record`]
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    fn new(submitter: impl Into<String>, entity: &EntityMatch) -> Self {
        Self {
            record: Record {
                id: RecordId::generate(),
                submitter: submitter.into(),
                entity_name: entity.name.clone(),
                entity_id: entity.id,
                image_ref: entity.image_ref.clone(),
                nickname: String::new(),
                ability: String::new(),
                item: String::new(),
                moves: Vec::new(),
                message: String::new(),
                submitted_at: Utc::now(),
                extra: Map::new(),
            },
        }
    }

    /// Override the generated id
    #[must_use]
    pub fn id(mut self, id: RecordId) -> Self {
        self.record.id = id;
        self
    }

    /// Set nickname
    #[must_use]
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.record.nickname = nickname.into();
        self
    }

    /// Set ability
    #[must_use]
    pub fn ability(mut self, ability: impl Into<String>) -> Self {
        self.record.ability = ability.into();
        self
    }

    /// Set held item
    #[must_use]
    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.record.item = item.into();
        self
    }

    /// Set moves
    #[must_use]
    pub fn moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    /// Set message
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.record.message = message.into();
        self
    }

    /// Override the submission time
    #[must_use]
    pub fn submitted_at(mut self, at: DateTime<Utc>) -> Self {
        self.record.submitted_at = at;
        self
    }

    /// Finish
    #[inline]
    #[must_use]
    pub fn build(self) -> Record {
        self.record
    }
}
