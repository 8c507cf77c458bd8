//! Fixed set of document slots
//!
//! The collection always holds exactly [`SLOT_COUNT`] slots. The position of a
//! slot is its identity, so slots are never inserted, removed or reordered:
//! assigning a document produces a new collection with one slot replaced.

use serde::{Deserialize, Serialize};

use crate::store::SlotPersistence;

/// Number of slots shown in the grid
pub const SLOT_COUNT: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    #[error("slot index {index} is outside 0..{SLOT_COUNT}")]
    InvalidIndex { index: usize },
}

/// Metadata and content of one uploaded document.
///
/// Field names on the wire follow the layout already present in stored state,
/// so existing `documents` values keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub name: String,
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
    /// Document bytes as a `data:` URI
    #[serde(rename = "fileData")]
    pub file_data: String,
}

impl DocumentRecord {
    pub fn new(
        name: impl Into<String>,
        upload_date: impl Into<String>,
        file_data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            upload_date: upload_date.into(),
            file_data: file_data.into(),
        }
    }
}

/// Read-only view of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub index: usize,
    pub document: Option<&'a DocumentRecord>,
}

impl Slot<'_> {
    pub fn is_empty(&self) -> bool {
        self.document.is_none()
    }

    /// Title shown on the grid tile
    pub fn title(&self) -> String {
        format!("Legal Document {}", self.index + 1)
    }
}

/// The full set of slots. Serializes as a JSON array with `null` for empty slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotCollection {
    slots: [Option<DocumentRecord>; SLOT_COUNT],
}

impl SlotCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the persisted collection, or start over with empty slots when
    /// nothing usable is stored. Individual slots are never salvaged.
    pub fn initialize(store: &(impl SlotPersistence + ?Sized)) -> Self {
        match store.load() {
            Some(collection) => {
                log::info!(
                    "Restored {} of {SLOT_COUNT} document slots",
                    collection.filled_count()
                );
                collection
            }
            None => {
                log::info!("No stored documents, starting with {SLOT_COUNT} empty slots");
                Self::empty()
            }
        }
    }

    /// Returns a copy of `self` with slot `index` holding `record`.
    pub fn assign(&self, index: usize, record: DocumentRecord) -> Result<Self, SlotError> {
        Self::check_index(index)?;
        let mut next = self.clone();
        next.slots[index] = Some(record);
        Ok(next)
    }

    pub fn get(&self, index: usize) -> Result<Slot<'_>, SlotError> {
        Self::check_index(index)?;
        Ok(Slot {
            index,
            document: self.slots[index].as_ref(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Slot<'_>> {
        self.slots.iter().enumerate().map(|(index, document)| Slot {
            index,
            document: document.as_ref(),
        })
    }

    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    fn check_index(index: usize) -> Result<(), SlotError> {
        if index < SLOT_COUNT {
            Ok(())
        } else {
            Err(SlotError::InvalidIndex { index })
        }
    }
}
