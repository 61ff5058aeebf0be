#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
//! # bio_aggregate - Building Blocks
//!
//! Building blocks are ready-made implementations of the collaborators a
//! cellular aggregate relies upon.
//! They are grouped into blocks acting between cells, found in [cell_building_blocks],
//! and blocks describing the environment the cells live in, found in [environment].
//!
//! ```rust
//! # use bio_aggregate_building_blocks::prelude::*;
//! # use bio_aggregate_concepts::*;
//! let mut graph = GabrielGraph::<2>::default();
//! graph.insert(CellIdentifier(0), [0.0, 0.0].into());
//! graph.insert(CellIdentifier(1), [1.0, 0.0].into());
//! let adjacency = graph.rebuild().unwrap();
//! assert!(adjacency[&CellIdentifier(0)].neighbors.contains(&CellIdentifier(1)));
//!
//! let nutrient = ConstantSubstrate { value: 0.8 };
//! assert_eq!(nutrient.sample(&nalgebra::Vector2::<f64>::zeros()), 0.8);
//! ```

/// Pairwise interactions between cells
pub mod cell_building_blocks;

/// Substrate fields and neighbor graphs which make up the environment of an aggregate
pub mod environment;

/// Handy re-exports of every building block.
pub mod prelude;
