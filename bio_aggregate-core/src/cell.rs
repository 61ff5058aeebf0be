//! Lifecycle state machine of a single cell.
//!
//! A [Cell] carries its physiological state (radius, sensed levels, timers, lineage) and
//! the mechanical force accumulated during one step.
//! It never changes the population by itself.
//! Its [advance_time_step](Cell::advance_time_step) returns a [CycleEvent] which the owning
//! [CellularAggregate](crate::aggregate::CellularAggregate) then carries out.
//!
//! ```
//! # use bio_aggregate_core::cell::Cell;
//! # use bio_aggregate_core::config::CellParameters;
//! # use bio_aggregate_concepts::CycleEvent;
//! let parameters = CellParameters {
//!     default_radius: 0.0,
//!     growth_radius_increment: 1.0,
//!     growth_radius_limit: 2.0,
//!     division_maximum_latency_time: 0,
//!     ..Default::default()
//! };
//! let mut cell = Cell::<2>::new(&parameters);
//! assert_eq!(cell.advance_time_step(&parameters).unwrap(), None);
//! assert_eq!(cell.advance_time_step(&parameters).unwrap(), None);
//! assert_eq!(cell.radius(), 2.0);
//! assert_eq!(
//!     cell.advance_time_step(&parameters).unwrap(),
//!     Some(CycleEvent::Mitosis)
//! );
//! ```
use bio_aggregate_concepts::*;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use std::sync::Arc;

use crate::config::CellParameters;

/// Everything a cell needs to know in order to read its receptors.
pub struct ReceptorContext<'a, const D: usize> {
    /// Aggregate which requests the reading
    pub aggregate: AggregateHandle,
    /// Current position of the cell
    pub position: &'a SVector<f64, D>,
    /// Substrates registered in the aggregate
    pub substrates: &'a [Arc<dyn SubstrateField<SVector<f64, D>>>],
}

/// Biological cell in `D` dimensions.
///
/// The position of the cell is not part of this struct.
/// It is kept by the aggregate which owns the cell.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Cell<const D: usize> {
    self_id: Option<CellIdentifier>,
    parent_id: Option<CellIdentifier>,
    generation: usize,
    radius: f64,
    nutrient_level: f64,
    energy_level: f64,
    chemo_attractant_level: f64,
    chemo_attractant_signal: ChemoAttractantSignal,
    growth_timer: u64,
    division_timer: u64,
    color: CellColor,
    force: SVector<f64, D>,
    aggregate: Option<AggregateHandle>,
}

impl<const D: usize> Cell<D> {
    /// Name of the species shared by all cells of this type
    pub const SPECIES_NAME: &'static str = "Primitive Cell";

    /// Creates a founding cell which is not yet part of any aggregate.
    ///
    /// The cell has generation 0, the default radius, color and levels and zeroed
    /// timers and force.
    pub fn new(parameters: &CellParameters) -> Self {
        Self {
            self_id: None,
            parent_id: None,
            generation: 0,
            radius: parameters.default_radius,
            nutrient_level: parameters.initial_nutrient_level,
            energy_level: parameters.initial_energy_level,
            chemo_attractant_level: 0.0,
            chemo_attractant_signal: ChemoAttractantSignal::default(),
            growth_timer: 0,
            division_timer: 0,
            color: parameters.default_color,
            force: SVector::zeros(),
            aggregate: None,
        }
    }

    /// Identifier assigned by the aggregate or [None] if the cell was never inserted
    pub fn identifier(&self) -> Option<CellIdentifier> {
        self.self_id
    }

    /// Identifier of the mother cell
    pub fn parent_id(&self) -> Option<CellIdentifier> {
        self.parent_id
    }

    /// Number of divisions which separate this cell from the founding cell
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current radius
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Overwrites the radius.
    ///
    /// The value is not checked here.
    /// Radii outside of `[0, growth_radius_limit]` fail the next lifecycle step.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Sensed nutrient level
    pub fn nutrient_level(&self) -> f64 {
        self.nutrient_level
    }

    /// Overwrites the nutrient level
    pub fn set_nutrient_level(&mut self, level: f64) {
        self.nutrient_level = level;
    }

    /// Sensed energy level
    pub fn energy_level(&self) -> f64 {
        self.energy_level
    }

    /// Overwrites the energy level
    pub fn set_energy_level(&mut self, level: f64) {
        self.energy_level = level;
    }

    /// Sensed chemo-attractant level
    pub fn chemo_attractant_level(&self) -> f64 {
        self.chemo_attractant_level
    }

    /// Classification of the last chemo-attractant reading
    pub fn chemo_attractant_signal(&self) -> ChemoAttractantSignal {
        self.chemo_attractant_signal
    }

    /// Number of ticks spent without growth
    pub fn growth_timer(&self) -> u64 {
        self.growth_timer
    }

    /// Number of ticks spent waiting at the radius limit
    pub fn division_timer(&self) -> u64 {
        self.division_timer
    }

    /// Clonal marker
    pub fn color(&self) -> CellColor {
        self.color
    }

    /// Overwrites the clonal marker which is then inherited by all descendants
    pub fn set_color(&mut self, color: CellColor) {
        self.color = color;
    }

    /// Resets the accumulated force to zero.
    pub fn clear_force(&mut self) {
        self.force = SVector::zeros();
    }

    /// Adds the given force to the accumulated force.
    pub fn add_force(&mut self, force: &SVector<f64, D>) {
        self.force += force;
    }

    /// Force accumulated since the last [clear_force](Cell::clear_force)
    pub fn force(&self) -> SVector<f64, D> {
        self.force
    }

    /// Binds the cell to an aggregate or releases it with [None].
    pub fn set_cellular_aggregate(&mut self, aggregate: Option<AggregateHandle>) {
        self.aggregate = aggregate;
    }

    /// Aggregate to which the cell is bound
    pub fn cellular_aggregate(&self) -> Option<AggregateHandle> {
        self.aggregate
    }

    pub(crate) fn assign_identifier(&mut self, identifier: CellIdentifier) {
        self.self_id = Some(identifier);
    }

    /// See [SPECIES_NAME](Cell::SPECIES_NAME)
    pub fn species_name(&self) -> &'static str {
        Self::SPECIES_NAME
    }

    /// Spatial dimension of the cell
    pub fn dimension(&self) -> usize {
        D
    }

    /// Phase of the cell cycle determined by the current radius.
    pub fn cycle_state(&self, parameters: &CellParameters) -> CellCycleState {
        if self.radius < parameters.growth_radius_limit {
            CellCycleState::Growing
        } else {
            CellCycleState::ReadyToDivide
        }
    }

    fn bound_identifier(&self) -> Result<CellIdentifier, PreconditionViolation> {
        match (self.aggregate, self.self_id) {
            (Some(_), Some(id)) => Ok(id),
            _ => Err(PreconditionViolation(format!(
                "cell {} is not bound to an aggregate",
                self.self_id
                    .map_or_else(|| "without identifier".to_owned(), |id| id.to_string())
            ))),
        }
    }

    /// Samples the substrates at the position of the cell and updates the sensed levels.
    ///
    /// Nutrient and energy levels relax towards the sampled concentration (clamped to
    /// `[0, 1]`) with the [receptor_uptake_rate](CellParameters::receptor_uptake_rate)
    /// $\alpha$
    /// \\begin{equation}
    ///     l \leftarrow l + \alpha\left(\text{clamp}(c(\vec{x}), 0, 1) - l\right)
    /// \\end{equation}
    /// The chemo-attractant level is taken over directly and classified against its
    /// thresholds.
    /// Roles whose substrate is not registered leave the corresponding level unchanged.
    pub fn receptors_reading(
        &mut self,
        context: &ReceptorContext<D>,
        parameters: &CellParameters,
    ) -> Result<(), PreconditionViolation> {
        let id = self.bound_identifier()?;
        if self.aggregate != Some(context.aggregate) {
            return Err(PreconditionViolation(format!(
                "cell {id} is not bound to {}",
                context.aggregate
            )));
        }
        let sample = |index: Option<usize>| {
            index
                .and_then(|k| context.substrates.get(k))
                .map(|substrate| substrate.sample(context.position))
        };
        let rate = parameters.receptor_uptake_rate;
        let roles = &parameters.substrate_roles;
        if let Some(c) = sample(roles.nutrient) {
            self.nutrient_level += rate * (c.clamp(0.0, 1.0) - self.nutrient_level);
        }
        if let Some(c) = sample(roles.energy) {
            self.energy_level += rate * (c.clamp(0.0, 1.0) - self.energy_level);
        }
        if let Some(c) = sample(roles.chemo_attractant) {
            self.chemo_attractant_level = c;
            self.chemo_attractant_signal = if c < parameters.chemo_attractant_low_threshold {
                ChemoAttractantSignal::Low
            } else if c > parameters.chemo_attractant_high_threshold {
                ChemoAttractantSignal::High
            } else {
                ChemoAttractantSignal::Nominal
            };
        }
        Ok(())
    }

    /// Checks that radius and levels form a consistent state.
    pub fn validate(&self, parameters: &CellParameters) -> Result<(), CalcError> {
        if !self.radius.is_finite()
            || !self.nutrient_level.is_finite()
            || !self.energy_level.is_finite()
        {
            return Err(CalcError(format!(
                "cell {:?} has non-finite state radius={} nutrient={} energy={}",
                self.self_id, self.radius, self.nutrient_level, self.energy_level
            )));
        }
        if !(0.0..=parameters.growth_radius_limit).contains(&self.radius) {
            return Err(CalcError(format!(
                "radius {} of cell {:?} exceeds [0, {}]",
                self.radius, self.self_id, parameters.growth_radius_limit
            )));
        }
        Ok(())
    }

    /// Cells whose nutrient or energy level dropped to zero have to die.
    pub fn check_point_apoptosis(&self) -> bool {
        self.nutrient_level <= 0.0 || self.energy_level <= 0.0
    }

    /// Performs one tick of the cell cycle.
    ///
    /// 1. A cell which fails the [check point](Cell::check_point_apoptosis) dies.
    /// 2. A cell below its radius limit grows if both nutrient and energy exceed their
    ///    self-repair levels.
    ///    It starves once it went without growth for longer than the maximum growth
    ///    latency.
    /// 3. A cell which starts the tick at its radius limit divides as soon as its
    ///    division timer has reached the maximum division latency.
    ///    Cells at the generation limit die of replicative senescence instead.
    pub fn advance_time_step(
        &mut self,
        parameters: &CellParameters,
    ) -> Result<Option<CycleEvent>, CalcError> {
        self.validate(parameters)?;
        if self.check_point_apoptosis() {
            return Ok(Some(CycleEvent::Apoptosis(ApoptosisCause::CheckPoint)));
        }
        match self.cycle_state(parameters) {
            CellCycleState::Growing => {
                self.growth_timer += 1;
                if self.nutrient_level > parameters.nutrient_self_repair_level
                    && self.energy_level > parameters.energy_self_repair_level
                {
                    self.radius = (self.radius + parameters.growth_radius_increment)
                        .min(parameters.growth_radius_limit);
                    self.growth_timer = 0;
                } else if self.growth_timer > parameters.growth_maximum_latency_time {
                    return Ok(Some(CycleEvent::Apoptosis(ApoptosisCause::Starvation)));
                }
            }
            CellCycleState::ReadyToDivide => {
                if self.division_timer >= parameters.division_maximum_latency_time {
                    if self.generation >= parameters.maximum_generation_limit {
                        return Ok(Some(CycleEvent::Apoptosis(
                            ApoptosisCause::ReplicativeSenescence,
                        )));
                    }
                    return Ok(Some(CycleEvent::Mitosis));
                }
                self.division_timer += 1;
            }
        }
        Ok(None)
    }

    /// Requests the division of this cell.
    ///
    /// Fails if the cell is not bound to an aggregate.
    pub fn mitosis(&self) -> Result<CycleEvent, PreconditionViolation> {
        self.bound_identifier()?;
        Ok(CycleEvent::Mitosis)
    }

    /// Requests the removal of this cell.
    ///
    /// Fails if the cell is not bound to an aggregate.
    pub fn apoptosis(&self, cause: ApoptosisCause) -> Result<CycleEvent, PreconditionViolation> {
        self.bound_identifier()?;
        Ok(CycleEvent::Apoptosis(cause))
    }

    /// Constructs one of the two daughters of this cell.
    ///
    /// Both daughters together occupy the volume of their mother
    /// \\begin{equation}
    ///     r_d = \frac{r}{2^{1/D}}
    /// \\end{equation}
    /// They inherit color and sensed levels, start with zeroed timers and force and are
    /// not yet bound to any aggregate.
    pub fn daughter(&self) -> Self {
        Self {
            self_id: None,
            parent_id: self.self_id,
            generation: self.generation + 1,
            radius: self.radius / 2f64.powf(1.0 / D as f64),
            nutrient_level: self.nutrient_level,
            energy_level: self.energy_level,
            chemo_attractant_level: self.chemo_attractant_level,
            chemo_attractant_signal: self.chemo_attractant_signal,
            growth_timer: 0,
            division_timer: 0,
            color: self.color,
            force: SVector::zeros(),
            aggregate: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bio_aggregate_building_blocks::prelude::ConstantSubstrate;
    use nalgebra::Vector2;

    fn bound_cell(parameters: &CellParameters) -> Cell<2> {
        let mut cell = Cell::new(parameters);
        cell.assign_identifier(CellIdentifier(1));
        cell.set_cellular_aggregate(Some(AggregateHandle(0)));
        cell
    }

    #[test]
    fn egg_state() {
        let parameters = CellParameters::default();
        let cell = Cell::<3>::new(&parameters);
        assert_eq!(cell.generation(), 0);
        assert_eq!(cell.radius(), parameters.default_radius);
        assert_eq!(cell.force(), SVector::<f64, 3>::zeros());
        assert_eq!(cell.growth_timer(), 0);
        assert_eq!(cell.division_timer(), 0);
        assert_eq!(cell.parent_id(), None);
        assert_eq!(cell.species_name(), "Primitive Cell");
        assert_eq!(cell.dimension(), 3);
    }

    #[test]
    fn force_accumulation() {
        let mut cell = Cell::<2>::new(&CellParameters::default());
        cell.add_force(&Vector2::new(1.0, 2.0));
        cell.add_force(&Vector2::new(0.5, -1.0));
        assert_eq!(cell.force(), Vector2::new(1.5, 1.0));
        cell.clear_force();
        assert_eq!(cell.force(), Vector2::zeros());
    }

    #[test]
    fn growth_is_monotone_and_bounded() {
        let parameters = CellParameters {
            default_radius: 0.5,
            growth_radius_increment: 0.3,
            growth_radius_limit: 1.0,
            division_maximum_latency_time: 100,
            ..Default::default()
        };
        let mut cell = bound_cell(&parameters);
        let mut last = cell.radius();
        for _ in 0..20 {
            cell.advance_time_step(&parameters).unwrap();
            assert!(cell.radius() >= last);
            assert!(cell.radius() <= parameters.growth_radius_limit);
            last = cell.radius();
        }
        assert_eq!(cell.radius(), 1.0);
        assert_eq!(cell.cycle_state(&parameters), CellCycleState::ReadyToDivide);
    }

    #[test]
    fn starvation_without_nutrients() {
        let parameters = CellParameters {
            growth_maximum_latency_time: 3,
            ..Default::default()
        };
        let mut cell = bound_cell(&parameters);
        cell.set_nutrient_level(0.1);
        for _ in 0..3 {
            assert_eq!(cell.advance_time_step(&parameters).unwrap(), None);
        }
        assert_eq!(cell.radius(), parameters.default_radius);
        assert_eq!(
            cell.advance_time_step(&parameters).unwrap(),
            Some(CycleEvent::Apoptosis(ApoptosisCause::Starvation))
        );
    }

    #[test]
    fn check_point_comes_first() {
        let parameters = CellParameters::default();
        let mut cell = bound_cell(&parameters);
        cell.set_energy_level(0.0);
        assert!(cell.check_point_apoptosis());
        assert_eq!(
            cell.advance_time_step(&parameters).unwrap(),
            Some(CycleEvent::Apoptosis(ApoptosisCause::CheckPoint))
        );
    }

    #[test]
    fn division_latency_and_senescence() {
        let parameters = CellParameters {
            default_radius: 2.0,
            division_maximum_latency_time: 2,
            maximum_generation_limit: 1,
            ..Default::default()
        };
        let mut cell = bound_cell(&parameters);
        assert_eq!(cell.advance_time_step(&parameters).unwrap(), None);
        assert_eq!(cell.advance_time_step(&parameters).unwrap(), None);
        assert_eq!(cell.division_timer(), 2);
        assert_eq!(
            cell.advance_time_step(&parameters).unwrap(),
            Some(CycleEvent::Mitosis)
        );

        let mut daughter = cell.daughter();
        daughter.set_radius(2.0);
        daughter.division_timer = 2;
        assert_eq!(
            daughter.advance_time_step(&parameters).unwrap(),
            Some(CycleEvent::Apoptosis(ApoptosisCause::ReplicativeSenescence))
        );
    }

    #[test]
    fn malformed_state_fails() {
        let parameters = CellParameters::default();
        let mut cell = bound_cell(&parameters);
        cell.set_radius(f64::NAN);
        assert!(cell.advance_time_step(&parameters).is_err());
        cell.set_radius(parameters.growth_radius_limit + 1.0);
        assert!(cell.advance_time_step(&parameters).is_err());
        cell.set_radius(1.0);
        cell.set_nutrient_level(f64::INFINITY);
        assert!(cell.advance_time_step(&parameters).is_err());
    }

    #[test]
    fn daughters_conserve_volume() {
        let parameters = CellParameters::default();
        let mut cell = bound_cell(&parameters);
        cell.set_color(CellColor::rgb(0.2, 0.4, 0.6));
        cell.add_force(&Vector2::new(1.0, 1.0));
        let daughter = cell.daughter();
        approx::assert_abs_diff_eq!(
            2.0 * daughter.radius().powi(2),
            cell.radius().powi(2),
            epsilon = 1e-12
        );
        assert_eq!(daughter.generation(), 1);
        assert_eq!(daughter.parent_id(), Some(CellIdentifier(1)));
        assert_eq!(daughter.color(), cell.color());
        assert_eq!(daughter.force(), Vector2::zeros());
        assert_eq!(daughter.cellular_aggregate(), None);
        assert_eq!(daughter.identifier(), None);
    }

    #[test]
    fn lifecycle_requests_need_binding() {
        let parameters = CellParameters::default();
        let cell = Cell::<2>::new(&parameters);
        assert!(cell.mitosis().is_err());
        assert!(cell.apoptosis(ApoptosisCause::External).is_err());
        let cell = bound_cell(&parameters);
        assert_eq!(cell.mitosis(), Ok(CycleEvent::Mitosis));
        assert_eq!(
            cell.apoptosis(ApoptosisCause::External),
            Ok(CycleEvent::Apoptosis(ApoptosisCause::External))
        );
    }

    #[test]
    fn receptor_reading() {
        let parameters = CellParameters::default();
        let substrates: Vec<Arc<dyn SubstrateField<Vector2<f64>>>> = vec![
            Arc::new(ConstantSubstrate { value: 0.0 }),
            Arc::new(ConstantSubstrate { value: 3.0 }),
            Arc::new(|x: &Vector2<f64>| x.x),
        ];
        let position = Vector2::new(0.9, 0.0);
        let context = ReceptorContext {
            aggregate: AggregateHandle(0),
            position: &position,
            substrates: &substrates,
        };
        let mut cell = bound_cell(&parameters);
        cell.receptors_reading(&context, &parameters).unwrap();
        assert_eq!(cell.nutrient_level(), 0.5);
        assert_eq!(cell.energy_level(), 1.0);
        assert_eq!(cell.chemo_attractant_level(), 0.9);
        assert_eq!(cell.chemo_attractant_signal(), ChemoAttractantSignal::High);

        let other = ReceptorContext {
            aggregate: AggregateHandle(1),
            ..context
        };
        assert!(cell.receptors_reading(&other, &parameters).is_err());
    }

    #[test]
    fn missing_substrates_keep_levels() {
        let parameters = CellParameters::default();
        let position = Vector2::zeros();
        let context = ReceptorContext {
            aggregate: AggregateHandle(0),
            position: &position,
            substrates: &[],
        };
        let mut cell = bound_cell(&parameters);
        cell.receptors_reading(&context, &parameters).unwrap();
        assert_eq!(cell.nutrient_level(), parameters.initial_nutrient_level);
        assert_eq!(cell.energy_level(), parameters.initial_energy_level);
        assert_eq!(cell.chemo_attractant_signal(), ChemoAttractantSignal::Nominal);
    }
}
