use bio_aggregate_concepts::*;

use itertools::Itertools;
use nalgebra::SVector;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Assembles the regions of all points given the list of adjacent index pairs.
///
/// Every point obtains a region, even if it has no neighbors.
fn regions_from_edges<const D: usize>(
    points: &[(CellIdentifier, SVector<f64, D>)],
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Adjacency<SVector<f64, D>> {
    let mut adjacency: Adjacency<SVector<f64, D>> = points
        .iter()
        .map(|(id, pos)| (*id, VoronoiRegion::isolated(*pos)))
        .collect();
    for (i, j) in edges {
        let (id_i, p_i) = points[i];
        let (id_j, p_j) = points[j];
        let point = (p_i + p_j) * 0.5;
        let normal = (p_j - p_i)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(SVector::zeros);
        if let Some(region) = adjacency.get_mut(&id_i) {
            region.neighbors.insert(id_j);
            region.faces.push(VoronoiFace {
                neighbor: id_j,
                point,
                normal,
            });
        }
        if let Some(region) = adjacency.get_mut(&id_j) {
            region.neighbors.insert(id_i);
            region.faces.push(VoronoiFace {
                neighbor: id_i,
                point,
                normal: -normal,
            });
        }
    }
    adjacency
}

/// Gabriel graph over a set of points in `D` dimensions.
///
/// Two points $\vec{p}_i,\vec{p}_j$ are adjacent if no third point lies strictly inside the
/// ball which has the segment between them as diameter:
/// \\begin{equation}
///     |\vec{p}_k - \vec{m}_{ij}| \geq \frac{1}{2}|\vec{p}_i - \vec{p}_j|
///     \hspace{1em}\forall k\neq i,j
///     \hspace{2em}\vec{m}_{ij} = \frac{\vec{p}_i + \vec{p}_j}{2}
/// \\end{equation}
/// The Gabriel graph is a subgraph of the Delaunay triangulation and thus connects exactly
/// those Voronoi regions whose shared facet contains the midpoint of both centers.
/// Coincident points are always adjacent to each other.
///
/// Candidate pairs are checked in parallel.
/// The computational cost scales as $\mathcal{O}(n^3)$ in the number of points.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GabrielGraph<const D: usize> {
    points: BTreeMap<CellIdentifier, SVector<f64, D>>,
}

impl<const D: usize> NeighborGraph<SVector<f64, D>> for GabrielGraph<D> {
    fn insert(&mut self, id: CellIdentifier, position: SVector<f64, D>) {
        self.points.insert(id, position);
    }

    fn remove(&mut self, id: &CellIdentifier) {
        self.points.remove(id);
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn rebuild(&mut self) -> Result<Adjacency<SVector<f64, D>>, CalcError> {
        let points: Vec<_> = self.points.iter().map(|(id, p)| (*id, *p)).collect();
        if let Some((id, pos)) = points
            .iter()
            .find(|(_, pos)| pos.iter().any(|x| !x.is_finite()))
        {
            return Err(CalcError(format!(
                "cannot tessellate non-finite position {pos:?} of cell {id}"
            )));
        }
        let candidates: Vec<(usize, usize)> = (0..points.len()).tuple_combinations().collect();
        let edges: Vec<(usize, usize)> = candidates
            .into_par_iter()
            .filter(|&(i, j)| {
                let p_i = points[i].1;
                let p_j = points[j].1;
                let midpoint = (p_i + p_j) * 0.5;
                let radius_squared = 0.25 * (p_i - p_j).norm_squared();
                points
                    .iter()
                    .enumerate()
                    .filter(|(k, _)| *k != i && *k != j)
                    .all(|(_, (_, p_k))| (p_k - midpoint).norm_squared() >= radius_squared)
            })
            .collect();
        Ok(regions_from_edges(&points, edges))
    }
}

/// Connects all points which are closer than a fixed cutoff.
///
/// This is the classical closest-points criterion.
/// Contrary to the [GabrielGraph] it may connect cells which are shielded by a third cell in
/// between them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistanceGraph<const D: usize> {
    /// Maximum distance between two adjacent points
    pub cutoff: f64,
    points: BTreeMap<CellIdentifier, SVector<f64, D>>,
}

impl<const D: usize> DistanceGraph<D> {
    /// Constructs an empty [DistanceGraph] with the given cutoff.
    pub fn new(cutoff: f64) -> Self {
        Self {
            cutoff,
            points: BTreeMap::new(),
        }
    }
}

impl<const D: usize> NeighborGraph<SVector<f64, D>> for DistanceGraph<D> {
    fn insert(&mut self, id: CellIdentifier, position: SVector<f64, D>) {
        self.points.insert(id, position);
    }

    fn remove(&mut self, id: &CellIdentifier) {
        self.points.remove(id);
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    fn rebuild(&mut self) -> Result<Adjacency<SVector<f64, D>>, CalcError> {
        let points: Vec<_> = self.points.iter().map(|(id, p)| (*id, *p)).collect();
        let cutoff_squared = self.cutoff.powi(2);
        let edges: Vec<(usize, usize)> = (0..points.len())
            .tuple_combinations()
            .filter(|&(i, j)| (points[i].1 - points[j].1).norm_squared() <= cutoff_squared)
            .collect();
        Ok(regions_from_edges(&points, edges))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::{Vector2, Vector3};

    fn ids<const D: usize>(
        adjacency: &Adjacency<SVector<f64, D>>,
        id: u64,
    ) -> Vec<u64> {
        adjacency[&CellIdentifier(id)]
            .neighbors
            .iter()
            .map(|c| c.0)
            .collect()
    }

    #[test]
    fn gabriel_line_is_shielded() {
        let mut graph = GabrielGraph::<2>::default();
        graph.insert(CellIdentifier(0), Vector2::new(0.0, 0.0));
        graph.insert(CellIdentifier(1), Vector2::new(1.0, 0.0));
        graph.insert(CellIdentifier(2), Vector2::new(2.0, 0.0));
        let adjacency = graph.rebuild().unwrap();
        assert_eq!(ids(&adjacency, 0), vec![1]);
        assert_eq!(ids(&adjacency, 1), vec![0, 2]);
        assert_eq!(ids(&adjacency, 2), vec![1]);
    }

    #[test]
    fn gabriel_faces_bisect() {
        let mut graph = GabrielGraph::<3>::default();
        graph.insert(CellIdentifier(4), Vector3::new(0.0, 0.0, 0.0));
        graph.insert(CellIdentifier(9), Vector3::new(0.0, 2.0, 0.0));
        let adjacency = graph.rebuild().unwrap();
        let region = &adjacency[&CellIdentifier(4)];
        assert_eq!(region.faces.len(), 1);
        assert_eq!(region.faces[0].neighbor, CellIdentifier(9));
        assert_eq!(region.faces[0].point, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(region.faces[0].normal, Vector3::new(0.0, 1.0, 0.0));
        let other = &adjacency[&CellIdentifier(9)];
        assert_eq!(other.faces[0].normal, Vector3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn gabriel_coincident_points() {
        let mut graph = GabrielGraph::<2>::default();
        graph.insert(CellIdentifier(0), Vector2::new(1.0, 1.0));
        graph.insert(CellIdentifier(1), Vector2::new(1.0, 1.0));
        let adjacency = graph.rebuild().unwrap();
        assert_eq!(ids(&adjacency, 0), vec![1]);
        assert_eq!(adjacency[&CellIdentifier(0)].faces[0].normal, Vector2::zeros());
    }

    #[test]
    fn gabriel_remove_and_move() {
        let mut graph = GabrielGraph::<2>::default();
        graph.insert(CellIdentifier(0), Vector2::new(0.0, 0.0));
        graph.insert(CellIdentifier(1), Vector2::new(1.0, 0.0));
        graph.insert(CellIdentifier(2), Vector2::new(2.0, 0.0));
        graph.remove(&CellIdentifier(1));
        assert_eq!(graph.len(), 2);
        let adjacency = graph.rebuild().unwrap();
        assert_eq!(ids(&adjacency, 0), vec![2]);
        graph.insert(CellIdentifier(2), Vector2::new(0.0, 5.0));
        let adjacency = graph.rebuild().unwrap();
        assert_eq!(adjacency[&CellIdentifier(2)].center, Vector2::new(0.0, 5.0));
    }

    #[test]
    fn gabriel_rejects_nan() {
        let mut graph = GabrielGraph::<2>::default();
        graph.insert(CellIdentifier(0), Vector2::new(f64::NAN, 0.0));
        assert!(graph.rebuild().is_err());
    }

    #[test]
    fn distance_graph_cutoff() {
        let mut graph = DistanceGraph::<2>::new(1.5);
        graph.insert(CellIdentifier(0), Vector2::new(0.0, 0.0));
        graph.insert(CellIdentifier(1), Vector2::new(1.0, 0.0));
        graph.insert(CellIdentifier(2), Vector2::new(2.0, 0.0));
        graph.insert(CellIdentifier(3), Vector2::new(10.0, 0.0));
        let adjacency = graph.rebuild().unwrap();
        assert_eq!(ids(&adjacency, 1), vec![0, 2]);
        assert_eq!(ids(&adjacency, 0), vec![1]);
        assert!(ids(&adjacency, 3).is_empty());
        assert_eq!(adjacency.len(), 4);
    }
}
