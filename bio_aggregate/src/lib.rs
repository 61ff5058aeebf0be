#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
//! [bio_aggregate](crate) simulates growing aggregates of biological cells.
//!
//! Cells are point-like agents which grow while nutrients and energy suffice, divide once
//! they reach their maximum radius and die when starving or after too many divisions.
//! Neighboring cells push each other apart or stick together, where the neighborhood is
//! given by a periodically rebuilt neighbor graph.
//!
//! ```
//! use bio_aggregate::prelude::*;
//! use nalgebra::Vector2;
//!
//! let settings = AggregateSettings {
//!     closest_point_interval: 1,
//!     ..Default::default()
//! };
//! let mut aggregate = DefaultAggregate::<2>::new(
//!     settings,
//!     GabrielGraph::default(),
//!     ContactInteraction::default(),
//! )?;
//! aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
//! aggregate.add_substrate(ConstantSubstrate { value: 1.0 });
//! aggregate.create_egg(Vector2::zeros())?;
//! for _ in 0..30 {
//!     aggregate.advance_time_step()?;
//! }
//! assert!(aggregate.number_of_cells() > 1);
//! # Ok::<(), AggregateError>(())
//! ```

pub use bio_aggregate_building_blocks as building_blocks;

pub use bio_aggregate_concepts as concepts;

pub use bio_aggregate_core as core;

/// Re-exports the default simulation types and traits.
pub mod prelude;
