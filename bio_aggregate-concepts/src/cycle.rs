use serde::{Deserialize, Serialize};

/// Contains all events which can arise during the cell cycle and need to be communicated to
/// the owning aggregate.
///
/// Cells never change the population themselves.
/// They return an event from their lifecycle step and the aggregate carries out the
/// structural change after all cells of the current step have been visited.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CycleEvent {
    /// The cell is replaced by two daughters.
    Mitosis,
    /// The cell is removed from the aggregate.
    Apoptosis(ApoptosisCause),
}

/// Reason for which a cell requested its own removal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApoptosisCause {
    /// Energy or nutrient level has dropped to zero.
    CheckPoint,
    /// The cell was unable to grow for longer than the maximum growth latency.
    Starvation,
    /// The cell has reached the maximum generation and is not allowed to divide again.
    ReplicativeSenescence,
    /// The lifecycle step of the cell failed and the cell was discarded.
    Failure,
    /// Removal was requested from outside of the cell cycle.
    External,
}

impl core::fmt::Display for ApoptosisCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ApoptosisCause::CheckPoint => "checkpoint",
            ApoptosisCause::Starvation => "starvation",
            ApoptosisCause::ReplicativeSenescence => "replicative senescence",
            ApoptosisCause::Failure => "failure",
            ApoptosisCause::External => "external",
        };
        write!(f, "{name}")
    }
}

/// Phase of the cell cycle in which a living cell currently resides.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CellCycleState {
    /// The cell has not yet reached its radius limit.
    Growing,
    /// The cell has reached its radius limit and waits for the division latency to pass.
    ReadyToDivide,
}

/// Classification of the locally sensed chemo-attractant concentration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChemoAttractantSignal {
    /// Below the lower threshold.
    Low,
    /// Between both thresholds (inclusive).
    #[default]
    Nominal,
    /// Above the upper threshold.
    High,
}
