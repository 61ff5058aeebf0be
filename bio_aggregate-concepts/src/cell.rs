use serde::{Deserialize, Serialize};

/// Unique identifier of a cell inside one aggregate.
///
/// Identifiers are handed out by the aggregate in increasing order and are never reused,
/// not even after the cell they belonged to has been removed.
/// This keeps lineage queries (via the parent identifier) unambiguous.
#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Eq, Ord, PartialOrd, Serialize)]
pub struct CellIdentifier(pub u64);

impl core::fmt::Display for CellIdentifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for CellIdentifier {
    fn from(value: u64) -> Self {
        CellIdentifier(value)
    }
}

/// Non-owning token which binds a cell to the aggregate that owns it.
///
/// Every aggregate instance obtains a distinct handle upon construction.
/// Cells store the handle of their aggregate and lifecycle requests (mitosis, apoptosis,
/// receptor readings) are only honoured if the handle matches.
#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Eq, Ord, PartialOrd, Serialize)]
pub struct AggregateHandle(pub u64);

impl core::fmt::Display for AggregateHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "aggregate-{}", self.0)
    }
}

/// Clonal marker of a cell given as RGBA tuple.
///
/// Both daughters of a mitosis inherit the color of their mother unchanged.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct CellColor {
    /// Red channel in `[0, 1]`
    pub red: f32,
    /// Green channel in `[0, 1]`
    pub green: f32,
    /// Blue channel in `[0, 1]`
    pub blue: f32,
    /// Opacity in `[0, 1]`
    pub alpha: f32,
}

impl CellColor {
    /// Construct a new fully opaque color.
    pub fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }
}

impl Default for CellColor {
    fn default() -> Self {
        CellColor::rgb(1.0, 1.0, 1.0)
    }
}

impl core::fmt::Display for CellColor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "rgba({:.3}, {:.3}, {:.3}, {:.3})",
            self.red, self.green, self.blue, self.alpha
        )
    }
}
