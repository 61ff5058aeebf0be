//! Cached adjacency between neighbor graph rebuilds.
use bio_aggregate_concepts::{Adjacency, CellIdentifier, VoronoiRegion};

/// Adjacency of the last rebuild of the neighbor graph.
///
/// Rebuilding the graph is expensive, so the aggregate only does so every few iterations.
/// In between, cells which are removed are purged from the cache immediately while newly
/// created cells are only reflected after the next rebuild.
/// The cache is then marked as dirty.
#[derive(Clone, Debug)]
pub struct NeighborCache<Pos> {
    adjacency: Adjacency<Pos>,
    generation: u64,
    dirty: bool,
    built_at_iteration: Option<u64>,
}

impl<Pos> Default for NeighborCache<Pos> {
    fn default() -> Self {
        Self {
            adjacency: Adjacency::new(),
            generation: 0,
            dirty: false,
            built_at_iteration: None,
        }
    }
}

impl<Pos> NeighborCache<Pos> {
    /// Replaces the cached adjacency with a freshly rebuilt one.
    pub fn replace(&mut self, adjacency: Adjacency<Pos>, iteration: u64) {
        self.adjacency = adjacency;
        self.generation += 1;
        self.dirty = false;
        self.built_at_iteration = Some(iteration);
    }

    /// Notes that the population changed since the last rebuild.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Checks if the population changed since the last rebuild.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of rebuilds so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iteration of the aggregate at which the last rebuild happened
    pub fn built_at_iteration(&self) -> Option<u64> {
        self.built_at_iteration
    }

    /// Number of cells with a cached region
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Checks if no region is cached.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Cached region of the given cell
    pub fn region(&self, id: &CellIdentifier) -> Option<&VoronoiRegion<Pos>> {
        self.adjacency.get(id)
    }

    /// Removes every reference to the given cell.
    pub fn purge(&mut self, id: &CellIdentifier) {
        if let Some(region) = self.adjacency.remove(id) {
            for neighbor in region.neighbors.iter() {
                if let Some(other) = self.adjacency.get_mut(neighbor) {
                    other.neighbors.remove(id);
                    other.faces.retain(|face| face.neighbor != *id);
                }
            }
        }
        self.dirty = true;
    }

    /// Forgets all cached regions.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.dirty = true;
    }

    /// All adjacent pairs `(a, b)` with `a < b` in increasing order.
    pub fn pairs(&self) -> Vec<(CellIdentifier, CellIdentifier)> {
        self.adjacency
            .iter()
            .flat_map(|(a, region)| {
                region
                    .neighbors
                    .iter()
                    .filter(move |b| *a < **b)
                    .map(move |b| (*a, *b))
            })
            .collect()
    }
}
