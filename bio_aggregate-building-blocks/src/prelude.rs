pub use crate::cell_building_blocks::interaction::*;

pub use crate::environment::neighbor_graphs::*;
pub use crate::environment::substrates::*;
