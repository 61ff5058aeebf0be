use crate::errors::CalcError;

/// Trait describing pairwise force-interactions between two neighboring cells.
///
/// The interaction is a property of the aggregate and not of the individual cell.
/// Cell-specific values (typically the radius) are handed over as interaction information.
pub trait Interaction<Pos, For, Inf = ()> {
    /// Calculates the forces acting on both partners of an interacting pair.
    ///
    /// The function returns two forces, one acting on the current agent and the other on the
    /// external agent.
    /// Implementations must return forces of equal magnitude and opposite direction such that
    /// internal interactions do not produce a net force on the aggregate.
    fn calculate_force_between(
        &self,
        own_pos: &Pos,
        own_inf: &Inf,
        ext_pos: &Pos,
        ext_inf: &Inf,
    ) -> Result<(For, For), CalcError>;
}

impl<Pos, For, Inf> Interaction<Pos, For, Inf> for Box<dyn Interaction<Pos, For, Inf> + Send + Sync> {
    fn calculate_force_between(
        &self,
        own_pos: &Pos,
        own_inf: &Inf,
        ext_pos: &Pos,
        ext_inf: &Inf,
    ) -> Result<(For, For), CalcError> {
        use core::ops::Deref;
        self.deref()
            .calculate_force_between(own_pos, own_inf, ext_pos, ext_inf)
    }
}
