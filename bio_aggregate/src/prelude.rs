pub use bio_aggregate_building_blocks::prelude::*;
pub use bio_aggregate_concepts::*;

pub use bio_aggregate_core::aggregate::*;
pub use bio_aggregate_core::cell::*;
pub use bio_aggregate_core::config::*;
pub use bio_aggregate_core::errors::*;
pub use bio_aggregate_core::neighbor_cache::*;
pub use bio_aggregate_core::simulation::*;
pub use bio_aggregate_core::storage::*;

/// Aggregate whose cells interact by [ContactInteraction] along the edges of a
/// [GabrielGraph].
pub type DefaultAggregate<const D: usize> =
    CellularAggregate<D, GabrielGraph<D>, ContactInteraction>;
