//! Gallery view of the pool
//!
//! Elements that do not decode as a [`Record`] are left out of the cards but
//! still counted, so one malformed entry never hides the rest of the pool.

use pool_model::{capitalize, Document, PoolResult, Record, StoredRecord};
use pool_store::DocumentStore;
use std::fmt;

/// All submitted records, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gallery {
    cards: Vec<EggCard>,
    total: usize,
}

impl Gallery {
    /// Read the current document from `store`.
    ///
    /// # Errors
    /// The store's read error; the CLI shows it as `Failed to load eggs: ...`
    pub async fn load<S>(store: &S) -> PoolResult<Self>
    where
        S: DocumentStore<Record = StoredRecord>,
    {
        let snapshot = store.read().await?;
        tracing::debug!(
            records = snapshot.document.len(),
            version = %snapshot.version.short(),
            "Loaded gallery"
        );
        Ok(Self::from_document(&snapshot.document))
    }

    /// Gallery of an already-read document
    #[must_use]
    pub fn from_document(document: &Document<StoredRecord>) -> Self {
        let mut cards = Vec::with_capacity(document.len());
        for stored in document.newest_first() {
            match stored.decode() {
                Ok(record) => cards.push(EggCard::from(record)),
                Err(e) => {
                    let id = stored.id_hint().unwrap_or_default();
                    tracing::warn!(id = %id, "Skipping record: {}", e);
                }
            }
        }
        Self {
            cards,
            total: document.len(),
        }
    }

    /// Cards, newest first
    #[inline]
    #[must_use]
    pub fn cards(&self) -> &[EggCard] {
        &self.cards
    }

    /// Number of records in the document, shown or not
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.total
    }

    /// Whether nothing has been submitted yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Records that could not be shown
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.total - self.cards.len()
    }

    /// `1 egg submitted`, `12 eggs submitted`
    #[must_use]
    pub fn count_label(&self) -> String {
        let n = self.len();
        format!("{n} egg{} submitted", if n == 1 { "" } else { "s" })
    }
}

/// One record as shown in the gallery
#[derive(Debug, Clone, PartialEq)]
pub struct EggCard {
    /// Underlying record
    pub record: Record,
}

impl EggCard {
    /// Capitalized entity name
    #[must_use]
    pub fn title(&self) -> String {
        capitalize(&self.record.entity_name)
    }

    /// Labelled detail rows, omitting blank ones
    #[must_use]
    pub fn meta_rows(&self) -> Vec<(&'static str, &str)> {
        [("Ability", &self.record.ability), ("Item", &self.record.item)]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| (label, value.as_str()))
            .collect()
    }
}

impl From<Record> for EggCard {
    fn from(record: Record) -> Self {
        Self { record }
    }
}

impl From<&Record> for EggCard {
    fn from(record: &Record) -> Self {
        Self::from(record.clone())
    }
}

impl fmt::Display for EggCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = &self.record;
        write!(f, "{} (#{})", self.title(), record.entity_id)?;
        if !record.nickname.is_empty() {
            write!(f, " \"{}\"", record.nickname)?;
        }
        writeln!(f)?;
        for (label, value) in self.meta_rows() {
            writeln!(f, "  {label}: {value}")?;
        }
        let moves: Vec<&str> = record.moves().collect();
        if !moves.is_empty() {
            writeln!(f, "  Moves: {}", moves.join(", "))?;
        }
        if !record.message.is_empty() {
            writeln!(f, "  {}", record.message)?;
        }
        write!(f, "  From {}", record.submitter)
    }
}
