use crate::cell::CellIdentifier;
use crate::errors::CalcError;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One facet of a [VoronoiRegion] which separates the region from a single neighbor.
///
/// The facet lies in the bisecting hyperplane between the two cell centers.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VoronoiFace<Pos> {
    /// Cell on the other side of the facet
    pub neighbor: CellIdentifier,
    /// Point on the bisecting hyperplane (midpoint between both centers)
    pub point: Pos,
    /// Unit normal of the hyperplane pointing from the center towards the neighbor
    pub normal: Pos,
}

/// Region geometry around a single cell as produced by a [NeighborGraph].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VoronoiRegion<Pos> {
    /// Position of the cell at the time the graph was rebuilt
    pub center: Pos,
    /// Identifiers of all adjacent cells
    pub neighbors: BTreeSet<CellIdentifier>,
    /// Facets shared with the neighbors
    pub faces: Vec<VoronoiFace<Pos>>,
}

impl<Pos> VoronoiRegion<Pos> {
    /// A region without any neighbors.
    pub fn isolated(center: Pos) -> Self {
        Self {
            center,
            neighbors: BTreeSet::new(),
            faces: Vec::new(),
        }
    }

    /// Number of adjacent cells
    pub fn number_of_neighbors(&self) -> usize {
        self.neighbors.len()
    }
}

/// Adjacency of every cell known to a [NeighborGraph].
pub type Adjacency<Pos> = BTreeMap<CellIdentifier, VoronoiRegion<Pos>>;

/// Tessellation or proximity structure over a set of identified points.
///
/// The aggregate treats any implementor as an opaque and possibly expensive batch
/// computation.
/// Points are inserted and removed incrementally while [rebuild](NeighborGraph::rebuild)
/// recomputes the full adjacency from the currently stored points.
/// Degenerate configurations such as coincident points have to be absorbed by the
/// implementation.
pub trait NeighborGraph<Pos> {
    /// Inserts a new point or moves an already known one.
    fn insert(&mut self, id: CellIdentifier, position: Pos);

    /// Removes the point if it is known.
    fn remove(&mut self, id: &CellIdentifier);

    /// Number of points currently stored.
    fn len(&self) -> usize;

    /// Checks if no points are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recomputes the adjacency of all stored points.
    ///
    /// Adjacency must be symmetric: if `a` lists `b` as neighbor, `b` lists `a`.
    fn rebuild(&mut self) -> Result<Adjacency<Pos>, CalcError>;
}
