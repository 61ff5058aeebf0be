#![deny(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
//! This crate contains the simulation engine for growing cellular aggregates built from the
//! [concepts](bio_aggregate_concepts).
//!
//! ## Cells
//! A [Cell](cell::Cell) is a small state machine which grows while nutrients and energy are
//! sufficient, waits at its maximum radius and then divides.
//! Cells which cannot grow for too long starve.
//!
//! ## Aggregate
//! The [CellularAggregate](aggregate::CellularAggregate) owns all cells and their positions.
//! Neighbors are obtained from a [NeighborGraph](bio_aggregate_concepts::NeighborGraph) which
//! is rebuilt every few iterations.
//! Adjacent cells interact mechanically while substrates are sampled by the receptors of each
//! cell.
//!
//! ## Storage
//! Snapshots of the living cells can be exported in every iteration via the
//! [storage] module.
//! The [simulation] module combines stepping and exporting into a single run loop.

pub mod aggregate;
pub mod cell;
pub mod config;
pub mod errors;
pub mod neighbor_cache;
pub mod simulation;
pub mod storage;

#[doc(hidden)]
pub use rayon;

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing;
