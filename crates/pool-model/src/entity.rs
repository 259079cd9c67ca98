//! Confirmed reference entity

use crate::names::capitalize;
use serde::{Deserialize, Serialize};

/// An entity confirmed by the remote single-item lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityMatch {
    /// National dex number
    pub id: u32,
    /// Canonical (lowercase slug) name
    pub name: String,
    /// Image URL
    pub image_ref: String,
}

impl EntityMatch {
    /// Create a new match
    #[inline]
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            image_ref: image_ref.into(),
        }
    }

    /// Name as shown to users (`pikachu` → `Pikachu`)
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> String {
        capitalize(&self.name)
    }

    /// Canonical label, e.g. `Pikachu (#25)`
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} (#{})", self.display_name(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_includes_id() {
        let entity = EntityMatch::new(25, "pikachu", "https://img/25.png");
        assert_eq!(entity.display_label(), "Pikachu (#25)");
    }
}
