use super::{StorageError, StorageInterface};

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Keeps all stored results in memory.
///
/// Clones share the same underlying map such that results can be read back while the
/// simulation is still writing to another clone.
#[derive(Clone, Debug)]
pub struct MemoryStorageInterface<Id, Element> {
    map: Arc<Mutex<BTreeMap<u64, BTreeMap<Id, Element>>>>,
}

impl<Id, Element> MemoryStorageInterface<Id, Element> {
    /// Constructs a new empty storage.
    pub fn new() -> Self {
        Self {
            map: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<Id, Element> Default for MemoryStorageInterface<Id, Element> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id, Element> StorageInterface<Id, Element> for MemoryStorageInterface<Id, Element>
where
    Id: Clone + Ord,
    Element: Clone,
{
    fn store_batch_elements<'a, I>(
        &mut self,
        iteration: u64,
        identifiers_elements: I,
    ) -> Result<(), StorageError>
    where
        Id: 'a + Serialize,
        Element: 'a + Serialize,
        I: IntoIterator<Item = (&'a Id, &'a Element)>,
    {
        self.map.lock()?.entry(iteration).or_default().extend(
            identifiers_elements
                .into_iter()
                .map(|(id, element)| (id.clone(), element.clone())),
        );
        Ok(())
    }

    fn load_all_elements_at_iteration(
        &self,
        iteration: u64,
    ) -> Result<BTreeMap<Id, Element>, StorageError>
    where
        Id: Ord + DeserializeOwned,
        Element: DeserializeOwned,
    {
        Ok(self
            .map
            .lock()?
            .get(&iteration)
            .cloned()
            .unwrap_or_default())
    }

    fn get_all_iterations(&self) -> Result<Vec<u64>, StorageError> {
        Ok(self.map.lock()?.keys().copied().collect())
    }
}
