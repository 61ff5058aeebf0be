/// Tessellations and proximity graphs over cell positions
pub mod neighbor_graphs;

/// Scalar fields which cells sample with their receptors
pub mod substrates;
