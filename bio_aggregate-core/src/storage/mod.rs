//! Export of simulation results.
//!
//! Snapshots of every living cell can be stored at selected iterations.
//! The stored data is meant for analysis and plotting and is not a full representation of
//! the aggregate from which the simulation could be restarted.
//!
//! | Storage | Description |
//! | --- | --- |
//! | [MemoryStorageInterface] | Keeps all results in memory behind a shared lock |
//! | [JsonStorageInterface] | Writes one [json](https://www.json.org/json-en.html) file per iteration |

mod json;
mod memory;

pub use json::JsonStorageInterface;
pub use memory::MemoryStorageInterface;

use bio_aggregate_concepts::{CellColor, CellCycleState, CellIdentifier};
use nalgebra::SVector;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// Error related to storing and reading elements
#[derive(Debug)]
pub enum StorageError {
    /// Error related to File Io operations.
    IoError(std::io::Error),
    /// Occurs during parsing of json structs.
    SerdeJsonError(serde_json::Error),
    /// Error when parsing file names.
    ParseIntError(std::num::ParseIntError),
    /// The lock around a shared storage was poisoned by a panicking thread.
    PoisonError(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerdeJsonError(err)
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err)
    }
}

impl From<std::num::ParseIntError> for StorageError {
    fn from(err: std::num::ParseIntError) -> Self {
        StorageError::ParseIntError(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for StorageError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        StorageError::PoisonError(format!("{err}"))
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StorageError::IoError(message) => write!(f, "{}", message),
            StorageError::SerdeJsonError(message) => write!(f, "{}", message),
            StorageError::ParseIntError(message) => write!(f, "{}", message),
            StorageError::PoisonError(message) => write!(f, "{}", message),
        }
    }
}

impl Error for StorageError {}

/// Stores and loads batches of identified elements per iteration.
pub trait StorageInterface<Id, Element> {
    /// Saves all given elements under the given iteration.
    ///
    /// Elements which were already stored for this iteration with the same identifier
    /// are overwritten.
    fn store_batch_elements<'a, I>(
        &mut self,
        iteration: u64,
        identifiers_elements: I,
    ) -> Result<(), StorageError>
    where
        Id: 'a + Serialize,
        Element: 'a + Serialize,
        I: IntoIterator<Item = (&'a Id, &'a Element)>;

    /// Loads all elements which were stored at the given iteration.
    ///
    /// Returns an empty map if nothing was stored.
    fn load_all_elements_at_iteration(
        &self,
        iteration: u64,
    ) -> Result<BTreeMap<Id, Element>, StorageError>
    where
        Id: Ord + DeserializeOwned,
        Element: DeserializeOwned;

    /// Lists all iterations for which results exist in increasing order.
    fn get_all_iterations(&self) -> Result<Vec<u64>, StorageError>;

    /// Loads the elements of every stored iteration.
    fn load_all_elements(&self) -> Result<BTreeMap<u64, BTreeMap<Id, Element>>, StorageError>
    where
        Id: Ord + DeserializeOwned,
        Element: DeserializeOwned,
    {
        self.get_all_iterations()?
            .into_iter()
            .map(|iteration| Ok((iteration, self.load_all_elements_at_iteration(iteration)?)))
            .collect()
    }
}

/// Identifier and element as stored side by side in files.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct CombinedSaveFormat<Id, Element> {
    pub(crate) identifier: Id,
    pub(crate) element: Element,
}

/// Exported state of a single cell at one iteration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CellSnapshot<const D: usize> {
    /// Identifier of the mother or [None] for the founding cell
    pub parent_id: Option<CellIdentifier>,
    /// Number of divisions since the founding cell
    pub generation: usize,
    /// Position of the cell
    pub position: SVector<f64, D>,
    /// Radius of the cell
    pub radius: f64,
    /// Sensed nutrient level
    pub nutrient_level: f64,
    /// Sensed energy level
    pub energy_level: f64,
    /// Sensed chemo-attractant level
    pub chemo_attractant_level: f64,
    /// Clonal marker
    pub color: CellColor,
    /// Current phase in the cell cycle
    pub cycle_state: CellCycleState,
}

#[cfg(test)]
mod test {
    use super::*;

    fn snapshot(generation: usize, x: f64) -> CellSnapshot<2> {
        CellSnapshot {
            parent_id: None,
            generation,
            position: [x, -x].into(),
            radius: 1.0,
            nutrient_level: 0.5,
            energy_level: 0.25,
            chemo_attractant_level: 0.0,
            color: CellColor::default(),
            cycle_state: CellCycleState::Growing,
        }
    }

    fn store_and_load<S>(mut storage: S)
    where
        S: StorageInterface<CellIdentifier, CellSnapshot<2>>,
    {
        let first = [
            (CellIdentifier(0), snapshot(0, 0.0)),
            (CellIdentifier(3), snapshot(1, 2.0)),
        ];
        storage
            .store_batch_elements(0, first.iter().map(|(id, s)| (id, s)))
            .unwrap();
        storage
            .store_batch_elements(10, [(&CellIdentifier(4), &snapshot(2, 1.5))])
            .unwrap();

        assert_eq!(storage.get_all_iterations().unwrap(), vec![0, 10]);
        let loaded = storage.load_all_elements_at_iteration(0).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[&CellIdentifier(3)], first[1].1);
        assert!(storage.load_all_elements_at_iteration(5).unwrap().is_empty());

        let all = storage.load_all_elements().unwrap();
        assert_eq!(all.keys().copied().collect::<Vec<_>>(), vec![0, 10]);
        assert_eq!(all[&10][&CellIdentifier(4)].generation, 2);
    }

    #[test]
    fn memory_storage() {
        store_and_load(MemoryStorageInterface::new());
    }

    #[test]
    fn json_storage() {
        let dir = tempfile::tempdir().unwrap();
        store_and_load(JsonStorageInterface::open_or_create(dir.path().join("results")).unwrap());
    }
}
