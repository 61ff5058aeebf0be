use super::{CombinedSaveFormat, StorageError, StorageInterface};

use serde::{de::DeserializeOwned, Serialize};

use core::marker::PhantomData;
use std::collections::BTreeMap;

/// Save elements as json files with [serde_json].
///
/// Every iteration is written to its own file `{iteration:020}.json` inside the storage
/// directory.
/// The file holds a list of identifier/element pairs.
#[derive(Clone, Debug)]
pub struct JsonStorageInterface<Id, Element> {
    /// Storage path.
    pub path: std::path::PathBuf,
    phantom_id: PhantomData<Id>,
    phantom_element: PhantomData<Element>,
}

impl<Id, Element> JsonStorageInterface<Id, Element> {
    /// Opens the storage directory and creates it if it does not yet exist.
    pub fn open_or_create(location: impl AsRef<std::path::Path>) -> Result<Self, StorageError> {
        let location = location.as_ref();
        if !location.is_dir() {
            std::fs::create_dir_all(location)?;
        }
        Ok(JsonStorageInterface {
            path: location.into(),
            phantom_id: PhantomData,
            phantom_element: PhantomData,
        })
    }

    fn get_iteration_file(&self, iteration: u64) -> std::path::PathBuf {
        self.path.join(format!("{:020}", iteration)).with_extension("json")
    }

    fn file_name_to_iteration(file: &std::path::Path) -> Result<Option<u64>, StorageError> {
        if file.extension().and_then(|ext| ext.to_str()) != Some("json") {
            return Ok(None);
        }
        match file.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => Ok(Some(stem.parse::<u64>()?)),
            None => Ok(None),
        }
    }
}

impl<Id, Element> StorageInterface<Id, Element> for JsonStorageInterface<Id, Element> {
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
        let batch: Vec<_> = identifiers_elements
            .into_iter()
            .map(|(identifier, element)| CombinedSaveFormat {
                identifier,
                element,
            })
            .collect();
        let file = std::fs::File::create(self.get_iteration_file(iteration))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &batch)?;
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
        let path = self.get_iteration_file(iteration);
        if !path.is_file() {
            return Ok(BTreeMap::new());
        }
        let file = std::fs::File::open(path)?;
        let batch: Vec<CombinedSaveFormat<Id, Element>> =
            serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(batch
            .into_iter()
            .map(|entry| (entry.identifier, entry.element))
            .collect())
    }

    fn get_all_iterations(&self) -> Result<Vec<u64>, StorageError> {
        let mut iterations = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            if let Some(iteration) = Self::file_name_to_iteration(&entry?.path())? {
                iterations.push(iteration);
            }
        }
        iterations.sort_unstable();
        Ok(iterations)
    }
}
