use bio_aggregate_concepts::*;

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

/// No interaction of the cell with any other.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NoInteraction;

impl<const D: usize> Interaction<SVector<f64, D>, SVector<f64, D>, f64> for NoInteraction {
    fn calculate_force_between(
        &self,
        _: &SVector<f64, D>,
        _: &f64,
        _: &SVector<f64, D>,
        _: &f64,
    ) -> Result<(SVector<f64, D>, SVector<f64, D>), CalcError> {
        Ok((SVector::zeros(), SVector::zeros()))
    }
}

/// Piecewise linear contact mechanics between two spherical cells.
///
/// # Parameters & Variables
/// | Symbol | Struct Field | Description |
/// |:---:| --- | --- |
/// | $k_r$ | `repulsion_strength` | Stiffness of the repulsion while cells overlap |
/// | $k_a$ | `adhesion_strength` | Stiffness of the adhesion beyond contact |
/// | $\xi$ | `cutoff_factor` | Range of the interaction relative to $R$ |
/// | | | |
/// | $R$ | | Sum of both radii $R=r_1+r_2$ |
/// | $r$ | | Distance between interacting cells |
///
/// # Equations
/// The magnitude of the force pushing both cells apart is
/// \\begin{equation}
///     F(r) = \begin{cases}
///         k_r(R - r) & r < R\\\\
///         -k_a(r - R) & R\leq r\leq\xi R\\\\
///         0 & \xi R < r
///     \end{cases}
/// \\end{equation}
/// Overlapping cells are thus pushed apart with a strength increasing with their overlap while
/// touching cells are mildly pulled together until the cutoff is reached.
/// Identical positions produce no force since no direction can be determined.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactInteraction {
    /// Stiffness $k_r$ of the repulsive part
    pub repulsion_strength: f64,
    /// Stiffness $k_a$ of the adhesive part
    pub adhesion_strength: f64,
    /// Cutoff $\xi$ relative to the sum of radii
    pub cutoff_factor: f64,
}

impl Default for ContactInteraction {
    fn default() -> Self {
        Self {
            repulsion_strength: 1.0,
            adhesion_strength: 0.1,
            cutoff_factor: 1.5,
        }
    }
}

impl<const D: usize> Interaction<SVector<f64, D>, SVector<f64, D>, f64> for ContactInteraction {
    fn calculate_force_between(
        &self,
        own_pos: &SVector<f64, D>,
        own_radius: &f64,
        ext_pos: &SVector<f64, D>,
        ext_radius: &f64,
    ) -> Result<(SVector<f64, D>, SVector<f64, D>), CalcError> {
        let z = own_pos - ext_pos;
        let dist = z.norm();
        if !dist.is_finite() {
            return Err(CalcError(format!(
                "distance between cells at {own_pos:?} and {ext_pos:?} is not finite"
            )));
        }
        let contact = own_radius + ext_radius;
        if !contact.is_finite() {
            return Err(CalcError(format!(
                "contact distance of radii {own_radius} and {ext_radius} is not finite"
            )));
        }
        if dist == 0.0 || dist > self.cutoff_factor * contact {
            return Ok((SVector::zeros(), SVector::zeros()));
        }
        let dir = z / dist;
        let strength = if dist < contact {
            self.repulsion_strength * (contact - dist)
        } else {
            -self.adhesion_strength * (dist - contact)
        };
        Ok((dir * strength, -dir * strength))
    }
}

/// Calculates the interaction strength behind the [MorsePotential] struct.
pub fn calculate_morse_interaction<F, const D: usize>(
    own_pos: &SVector<F, D>,
    ext_pos: &SVector<F, D>,
    own_radius: F,
    ext_radius: F,
    cutoff: F,
    strength: F,
    potential_stiffness: F,
) -> Result<(SVector<F, D>, SVector<F, D>), CalcError>
where
    F: Copy + nalgebra::RealField,
{
    let z = own_pos - ext_pos;
    let dist = z.norm();

    // If the distance between the two objects is greater than the cutoff, we
    // immediately return zero.
    if dist > cutoff || dist.is_zero() {
        return Ok((SVector::<F, D>::zeros(), SVector::<F, D>::zeros()));
    }
    let dir = z / dist;
    let r = own_radius + ext_radius;
    let s = strength;
    let a = potential_stiffness;
    let two = F::one() + F::one();
    let e = (-a * (dist - r)).exp();
    let force = -two * s * a * e * (F::one() - e);
    Ok((dir * force, -dir * force))
}

/// Famous [Morse](https://doi.org/10.1103/PhysRev.34.57) potential for diatomic molecules
/// applied to two cells of individual radius.
///
/// # Parameters & Variables
/// | Symbol | Struct Field | Description |
/// |:---:| --- | --- |
/// | $\lambda$ | `potential_stiffness` | Can be interpreted as the inverse width of the potential |
/// | | `cutoff` | Cutoff after which the interaction strength is identically 0 |
/// | $V_0$ | `strength` | Interaction strength |
/// | | | |
/// | $R$ | | Sum of the radii of both cells |
/// | $r$ | | Distance between interacting cells |
///
/// \\begin{equation}
///     V(r) = V_0\left(1 - e^{-\lambda(r-R)}\right)^2
/// \\end{equation}
///
/// # References
/// \[1\]
/// P. M. Morse,
/// “Diatomic Molecules According to the Wave Mechanics. II. Vibrational Levels,”
/// Physical Review, vol. 34, no. 1. American Physical Society (APS),
/// pp. 57–64, Jul. 01, 1929.
/// doi: [10.1103/physrev.34.57](https://doi.org/10.1103/PhysRev.34.57).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MorsePotential {
    /// Defines the length for the interaction range
    pub potential_stiffness: f64,
    /// Cutoff after which the interaction is exactly 0
    pub cutoff: f64,
    /// Strength of the interaction
    pub strength: f64,
}

impl<const D: usize> Interaction<SVector<f64, D>, SVector<f64, D>, f64> for MorsePotential {
    fn calculate_force_between(
        &self,
        own_pos: &SVector<f64, D>,
        own_radius: &f64,
        ext_pos: &SVector<f64, D>,
        ext_radius: &f64,
    ) -> Result<(SVector<f64, D>, SVector<f64, D>), CalcError> {
        calculate_morse_interaction(
            own_pos,
            ext_pos,
            *own_radius,
            *ext_radius,
            self.cutoff,
            self.strength,
            self.potential_stiffness,
        )
    }
}
