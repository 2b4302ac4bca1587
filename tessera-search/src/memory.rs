//! In-memory search index.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use tessera_core::{IndexError, RecordId, RecordView, TesseraResult};

use crate::SearchIndex;

type Documents = BTreeMap<RecordId, RecordView>;

/// Index held in process memory, one document map per index name.
#[derive(Debug, Default)]
pub struct InMemorySearchIndex {
    indexes: RwLock<HashMap<String, Documents>>,
}

fn poisoned(index: &str) -> IndexError {
    IndexError::Unavailable {
        reason: format!("index {} lock poisoned", index),
    }
}

impl InMemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self, index: &str, id: &str) -> TesseraResult<Option<RecordView>> {
        let indexes = self.indexes.read().map_err(|_| poisoned(index))?;
        Ok(indexes.get(index).and_then(|docs| docs.get(id)).cloned())
    }

    /// Every document in `index` ordered by id; empty when the index is absent.
    pub fn documents(&self, index: &str) -> TesseraResult<Vec<RecordView>> {
        let indexes = self.indexes.read().map_err(|_| poisoned(index))?;
        Ok(indexes
            .get(index)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    pub fn exists(&self, index: &str) -> TesseraResult<bool> {
        let indexes = self.indexes.read().map_err(|_| poisoned(index))?;
        Ok(indexes.contains_key(index))
    }
}

#[async_trait]
impl SearchIndex for InMemorySearchIndex {
    async fn delete_index(&self, index: &str) -> TesseraResult<()> {
        let mut indexes = self.indexes.write().map_err(|_| poisoned(index))?;
        indexes.remove(index);
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &RecordView,
    ) -> TesseraResult<()> {
        let mut indexes = self.indexes.write().map_err(|_| poisoned(index))?;
        indexes
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), document.clone());
        Ok(())
    }
}
