#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
//! This crate encapsulates concepts which govern a growing cellular aggregate as simulated by
//! [bio_aggregate](https://docs.rs/bio_aggregate).
//!
//! The concepts are deliberately free of any concrete vector type.
//! Positions, forces and region geometry are generic such that the engine in
//! `bio_aggregate-core` can pick a fixed-size vector per spatial dimension while
//! collaborators such as substrate samplers or tessellation libraries stay exchangeable.

mod cell;
mod cycle;
mod errors;
mod interaction;
mod neighbors;
mod substrate;

pub use cell::*;
pub use cycle::*;
pub use errors::*;
pub use interaction::*;
pub use neighbors::*;
pub use substrate::*;
