//! The simulation engine.
//!
//! A [CellularAggregate] owns all living cells together with their positions, the neighbor
//! graph and the registered substrates.
//! Every call to [advance_time_step](CellularAggregate::advance_time_step) runs the
//! following phases.
//!
//! | Phase | Method | Parallel |
//! | --- | --- | --- |
//! | Reset forces | [clear_forces](CellularAggregate::clear_forces) | |
//! | Removal of cells with corrupted state | [validate](crate::cell::Cell::validate) | |
//! | Pairwise forces of adjacent cells | [compute_forces](CellularAggregate::compute_forces) | ✓ |
//! | Damped Euler step of positions | [update_positions](CellularAggregate::update_positions) | |
//! | Receptors and cell cycle | [advance_time_step](crate::cell::Cell::advance_time_step) | ✓ |
//! | Mitosis and apoptosis | [mitosis](CellularAggregate::mitosis), [remove](CellularAggregate::remove) | |
//! | Periodic rebuild of the neighbor graph | [compute_closest_points](CellularAggregate::compute_closest_points) | |
//!
//! Parallel phases only read a frozen state of the aggregate and buffer their results.
//! Structural changes are applied afterwards in increasing order of the cell identifiers.
//! A cell which fails any phase is removed and recorded in
//! [failures](CellularAggregate::failures) while the remaining cells continue.
use bio_aggregate_concepts::*;
use nalgebra::SVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::cell::{Cell, ReceptorContext};
use crate::config::AggregateSettings;
use crate::errors::AggregateError;
use crate::neighbor_cache::NeighborCache;
use crate::storage::CellSnapshot;

static NEXT_AGGREGATE_HANDLE: AtomicU64 = AtomicU64::new(0);

/// Shared reference to a substrate registered in an aggregate
pub type SharedSubstrate<const D: usize> = Arc<dyn SubstrateField<SVector<f64, D>>>;

/// Cell which was removed because its lifecycle step failed.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FailureRecord {
    /// Iteration in which the failure occurred
    pub iteration: u64,
    /// Identifier of the removed cell
    pub identifier: CellIdentifier,
    /// Message of the error which caused the removal
    pub message: String,
}

/// Outcome of a single call to [advance_time_step](CellularAggregate::advance_time_step).
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    /// Iteration which was executed
    pub iteration: u64,
    /// Number of cells which divided
    pub divisions: usize,
    /// Number of cells which died
    pub deaths: usize,
    /// Number of cells which were removed due to a failed lifecycle step
    pub failures: usize,
    /// Indicates if the neighbor graph was rebuilt at the end of the step
    pub rebuilt_graph: bool,
}

fn run_in_pool<R, F>(pool: Option<&rayon::ThreadPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

fn random_direction<const D: usize>(rng: &mut ChaCha8Rng) -> Result<SVector<f64, D>, RngError> {
    for _ in 0..16 {
        let v = SVector::<f64, D>::from_fn(|_, _| rng.sample(rand_distr::StandardNormal));
        if let Some(u) = v.try_normalize(f64::EPSILON) {
            return Ok(u);
        }
    }
    Err(RngError(format!(
        "could not draw a random direction in {} dimensions",
        D
    )))
}

/// Growing population of [Cell]s in `D` dimensions.
///
/// The neighbor graph `G` determines which cells interact with each other via the
/// [Interaction] `I`.
///
/// ```
/// # use bio_aggregate_core::aggregate::CellularAggregate;
/// # use bio_aggregate_core::config::AggregateSettings;
/// # use bio_aggregate_building_blocks::prelude::*;
/// use nalgebra::Vector2;
/// let mut aggregate = CellularAggregate::<2, _, _>::new(
///     AggregateSettings::default(),
///     GabrielGraph::default(),
///     ContactInteraction::default(),
/// )?;
/// let egg = aggregate.create_egg(Vector2::zeros())?;
/// let (a, b) = aggregate.mitosis(egg)?;
/// assert_eq!(aggregate.number_of_cells(), 2);
/// assert!(aggregate.get_cell(&egg).is_err());
/// assert_eq!(aggregate.get_cell(&a)?.parent_id(), Some(egg));
/// assert_eq!(aggregate.get_cell(&b)?.generation(), 1);
/// # Ok::<(), bio_aggregate_core::errors::AggregateError>(())
/// ```
pub struct CellularAggregate<const D: usize, G, I> {
    handle: AggregateHandle,
    settings: AggregateSettings,
    cells: BTreeMap<CellIdentifier, Cell<D>>,
    positions: BTreeMap<CellIdentifier, SVector<f64, D>>,
    neighbor_graph: G,
    neighbor_cache: NeighborCache<SVector<f64, D>>,
    interaction: I,
    substrates: Vec<SharedSubstrate<D>>,
    iteration: u64,
    next_identifier: u64,
    failures: Vec<FailureRecord>,
    rng: ChaCha8Rng,
    thread_pool: Option<rayon::ThreadPool>,
}

impl<const D: usize, G, I> CellularAggregate<D, G, I>
where
    G: NeighborGraph<SVector<f64, D>>,
    I: Interaction<SVector<f64, D>, SVector<f64, D>, f64> + Sync,
{
    /// Constructs a new empty aggregate.
    ///
    /// Fails if the settings are invalid or the requested thread pool cannot be built.
    pub fn new(settings: AggregateSettings, graph: G, interaction: I) -> Result<Self, AggregateError> {
        settings.validate()?;
        let thread_pool = match settings.n_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n.get())
                    .build()?,
            ),
            None => None,
        };
        let handle = AggregateHandle(NEXT_AGGREGATE_HANDLE.fetch_add(1, Ordering::Relaxed));
        #[cfg(feature = "tracing")]
        tracing::debug!(%handle, dimension = D, "constructed aggregate");
        Ok(Self {
            handle,
            rng: ChaCha8Rng::seed_from_u64(settings.rng_seed),
            settings,
            cells: BTreeMap::new(),
            positions: BTreeMap::new(),
            neighbor_graph: graph,
            neighbor_cache: NeighborCache::default(),
            interaction,
            substrates: Vec::new(),
            iteration: 0,
            next_identifier: 0,
            failures: Vec::new(),
            thread_pool,
        })
    }

    /// Token which binds cells to this aggregate
    pub fn handle(&self) -> AggregateHandle {
        self.handle
    }

    /// Settings with which the aggregate operates
    pub fn settings(&self) -> &AggregateSettings {
        &self.settings
    }

    /// Changes the radius at which cells stop growing.
    ///
    /// Cells never shrink, so the limit may not drop below the radius of any living cell.
    pub fn set_growth_radius_limit(&mut self, limit: f64) -> Result<(), SetupError> {
        let mut parameters = self.settings.cell.clone();
        parameters.growth_radius_limit = limit;
        parameters.validate()?;
        if let Some((id, cell)) = self.cells.iter().find(|(_, cell)| cell.radius() > limit) {
            return Err(SetupError(format!(
                "growth_radius_limit={limit} is below the radius {} of living cell {id}",
                cell.radius()
            )));
        }
        self.settings.cell = parameters;
        Ok(())
    }

    /// Changes the increase of the radius per tick of growth.
    pub fn set_growth_radius_increment(&mut self, increment: f64) -> Result<(), SetupError> {
        let mut parameters = self.settings.cell.clone();
        parameters.growth_radius_increment = increment;
        parameters.validate()?;
        self.settings.cell = parameters;
        Ok(())
    }

    /// Number of completed simulation steps
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Cells which were removed because their lifecycle step failed
    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// Adjacency computed during the last rebuild of the neighbor graph
    pub fn neighbor_cache(&self) -> &NeighborCache<SVector<f64, D>> {
        &self.neighbor_cache
    }

    /// Number of living cells
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Iterates over all living cells and their positions in increasing order of identifiers.
    pub fn cells(&self) -> impl Iterator<Item = (&CellIdentifier, &Cell<D>, &SVector<f64, D>)> {
        self.cells
            .iter()
            .zip(self.positions.values())
            .map(|((id, cell), position)| (id, cell, position))
    }

    /// Living cell with the given identifier
    pub fn get_cell(&self, id: &CellIdentifier) -> Result<&Cell<D>, NotFound> {
        self.cells.get(id).ok_or_else(|| NotFound::cell(id))
    }

    /// Mutable access to a living cell
    pub fn get_cell_mut(&mut self, id: &CellIdentifier) -> Result<&mut Cell<D>, NotFound> {
        self.cells.get_mut(id).ok_or_else(|| NotFound::cell(id))
    }

    /// Position of a living cell
    pub fn position(&self, id: &CellIdentifier) -> Result<SVector<f64, D>, NotFound> {
        self.positions.get(id).copied().ok_or_else(|| NotFound::cell(id))
    }

    fn insert_cell(&mut self, mut cell: Cell<D>, position: SVector<f64, D>) -> CellIdentifier {
        let id = CellIdentifier(self.next_identifier);
        self.next_identifier += 1;
        cell.assign_identifier(id);
        cell.set_cellular_aggregate(Some(self.handle));
        self.cells.insert(id, cell);
        self.positions.insert(id, position);
        self.neighbor_graph.insert(id, position);
        self.neighbor_cache.mark_dirty();
        id
    }

    /// Seeds an empty aggregate with its founding cell.
    ///
    /// Fails with [InvalidState] if the aggregate already contains cells.
    pub fn create_egg(&mut self, position: SVector<f64, D>) -> Result<CellIdentifier, AggregateError> {
        if !self.cells.is_empty() {
            return Err(InvalidState(format!(
                "cannot create egg in {} which already contains {} cells",
                self.handle,
                self.cells.len()
            ))
            .into());
        }
        let egg = Cell::new(&self.settings.cell);
        self.add(egg, position)
    }

    /// Inserts a cell at the given position and assigns a new identifier to it.
    ///
    /// Fails if the cell is bound to another aggregate or the position is not finite.
    pub fn add(&mut self, cell: Cell<D>, position: SVector<f64, D>) -> Result<CellIdentifier, AggregateError> {
        if let Some(other) = cell.cellular_aggregate() {
            if other != self.handle || cell.identifier().is_some_and(|id| self.cells.contains_key(&id)) {
                return Err(PreconditionViolation(format!(
                    "cell is already bound to {other}"
                ))
                .into());
            }
        }
        if position.iter().any(|x| !x.is_finite()) {
            return Err(PreconditionViolation(format!(
                "cannot place cell at non-finite position {position:?}"
            ))
            .into());
        }
        Ok(self.insert_cell(cell, position))
    }

    /// Inserts a cell next to an anchor cell.
    ///
    /// The new cell is placed at distance `perturbation_length` from the anchor in a
    /// random direction.
    pub fn add_beside(
        &mut self,
        anchor: &CellIdentifier,
        cell: Cell<D>,
        perturbation_length: f64,
    ) -> Result<CellIdentifier, AggregateError> {
        let anchor_position = self.position(anchor)?;
        if !(perturbation_length.is_finite() && perturbation_length > 0.0) {
            return Err(PreconditionViolation(format!(
                "perturbation length {perturbation_length} must be finite and positive"
            ))
            .into());
        }
        let direction = random_direction(&mut self.rng)?;
        self.add(cell, anchor_position + direction * perturbation_length)
    }

    /// Removes a cell together with every reference to it.
    ///
    /// The removed cell is returned and no longer bound to the aggregate.
    pub fn remove(&mut self, id: &CellIdentifier) -> Result<Cell<D>, NotFound> {
        let mut cell = self.cells.remove(id).ok_or_else(|| NotFound::cell(id))?;
        self.positions.remove(id);
        self.neighbor_graph.remove(id);
        self.neighbor_cache.purge(id);
        cell.set_cellular_aggregate(None);
        Ok(cell)
    }

    /// Removes a cell after checking that it is bound to this aggregate.
    pub fn apoptosis(&mut self, id: &CellIdentifier) -> Result<(), AggregateError> {
        let cell = self.get_cell(id)?;
        cell.apoptosis(ApoptosisCause::External)?;
        self.remove(id)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(cell = %id, cause = %ApoptosisCause::External, "apoptosis");
        Ok(())
    }

    /// Removes all cells.
    ///
    /// Returns the number of removed cells.
    /// Calling this method on an empty aggregate has no effect.
    pub fn kill_all(&mut self) -> usize {
        let ids: Vec<_> = self.cells.keys().copied().collect();
        for id in ids.iter() {
            self.neighbor_graph.remove(id);
        }
        self.cells.clear();
        self.positions.clear();
        if !ids.is_empty() {
            self.neighbor_cache.clear();
        }
        ids.len()
    }

    /// Replaces a cell by two daughters which are displaced in a random direction.
    ///
    /// See [mitosis_with_perturbation](CellularAggregate::mitosis_with_perturbation).
    pub fn mitosis(&mut self, id: CellIdentifier) -> Result<(CellIdentifier, CellIdentifier), AggregateError> {
        self.get_cell(&id)?;
        let direction = random_direction(&mut self.rng)?;
        let perturbation = direction * self.settings.mitosis_perturbation_length;
        self.mitosis_with_perturbation(id, perturbation)
    }

    /// Replaces a cell by two daughters at `position + perturbation` and
    /// `position - perturbation`.
    ///
    /// The daughters obtain new identifiers.
    /// Fails if the cell is unknown, the perturbation vanishes or if the cell has already
    /// reached the maximum generation.
    pub fn mitosis_with_perturbation(
        &mut self,
        id: CellIdentifier,
        perturbation: SVector<f64, D>,
    ) -> Result<(CellIdentifier, CellIdentifier), AggregateError> {
        let cell = self.get_cell(&id)?;
        let norm = perturbation.norm();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(PreconditionViolation(format!(
                "mitosis of cell {id} requires a non-zero perturbation but got {perturbation:?}"
            ))
            .into());
        }
        if cell.generation() >= self.settings.cell.maximum_generation_limit {
            return Err(InvalidState(format!(
                "cell {id} of generation {} may not divide anymore",
                cell.generation()
            ))
            .into());
        }
        cell.mitosis()?;
        let daughter_1 = cell.daughter();
        let daughter_2 = cell.daughter();
        let position = self.position(&id)?;
        self.remove(&id)?;
        let id_1 = self.insert_cell(daughter_1, position + perturbation);
        let id_2 = self.insert_cell(daughter_2, position - perturbation);
        #[cfg(feature = "tracing")]
        tracing::debug!(cell = %id, daughters = ?(id_1, id_2), "mitosis");
        Ok((id_1, id_2))
    }

    /// Registers a new substrate and returns its index.
    pub fn add_substrate<S>(&mut self, substrate: S) -> usize
    where
        S: SubstrateField<SVector<f64, D>> + 'static,
    {
        self.add_shared_substrate(Arc::new(substrate))
    }

    /// Registers a substrate which may also be used by other aggregates.
    pub fn add_shared_substrate(&mut self, substrate: SharedSubstrate<D>) -> usize {
        self.substrates.push(substrate);
        self.substrates.len() - 1
    }

    /// All registered substrates in the order in which they were added
    pub fn substrates(&self) -> &[SharedSubstrate<D>] {
        &self.substrates
    }

    /// Samples the substrate with index `k` at the position of the given cell.
    pub fn substrate_value(&self, id: &CellIdentifier, k: usize) -> Result<f64, AggregateError> {
        let position = self.position(id)?;
        let substrate = self.substrates.get(k).ok_or_else(|| {
            IndexOutOfRange(format!(
                "substrate index {k} exceeds the {} registered substrates",
                self.substrates.len()
            ))
        })?;
        Ok(substrate.sample(&position))
    }

    /// Region of a living cell as computed during the last rebuild.
    ///
    /// Cells which were created after the last rebuild obtain a region without neighbors.
    pub fn get_voronoi(&self, id: &CellIdentifier) -> Result<VoronoiRegion<SVector<f64, D>>, NotFound> {
        let position = self.position(id)?;
        Ok(self
            .neighbor_cache
            .region(id)
            .cloned()
            .unwrap_or_else(|| VoronoiRegion::isolated(position)))
    }

    /// Resets the forces of all cells.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub fn clear_forces(&mut self) {
        self.cells.values_mut().for_each(|cell| cell.clear_force());
    }

    /// Calculates the forces between all adjacent cells and adds them to both cells.
    ///
    /// Pairs whose force cannot be calculated or is not finite do not contribute.
    /// Both partners of such a pair are returned together with the error.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub fn compute_forces(&mut self) -> Vec<(CellIdentifier, CalcError)> {
        let pairs = self.neighbor_cache.pairs();
        let cells = &self.cells;
        let positions = &self.positions;
        let interaction = &self.interaction;
        let outcomes: Vec<_> = run_in_pool(self.thread_pool.as_ref(), || {
            pairs
                .par_iter()
                .filter_map(|(a, b)| {
                    Some((a, b, cells.get(a)?, positions.get(a)?, cells.get(b)?, positions.get(b)?))
                })
                .map(|(a, b, cell_a, pos_a, cell_b, pos_b)| {
                    let forces = interaction
                        .calculate_force_between(pos_a, &cell_a.radius(), pos_b, &cell_b.radius())
                        .and_then(|(f_a, f_b)| {
                            if f_a.iter().chain(f_b.iter()).all(|x| x.is_finite()) {
                                Ok((f_a, f_b))
                            } else {
                                Err(CalcError(format!(
                                    "force between cells {a} and {b} is not finite"
                                )))
                            }
                        });
                    (*a, *b, forces)
                })
                .collect()
        });
        let mut failed = Vec::new();
        for (a, b, forces) in outcomes {
            match forces {
                Ok((f_a, f_b)) => {
                    if let Some(cell) = self.cells.get_mut(&a) {
                        cell.add_force(&f_a);
                    }
                    if let Some(cell) = self.cells.get_mut(&b) {
                        cell.add_force(&f_b);
                    }
                }
                Err(error) => {
                    failed.push((a, error.clone()));
                    failed.push((b, error));
                }
            }
        }
        failed
    }

    /// Moves all cells according to their accumulated force
    /// \\begin{equation}
    ///     \vec{x} \leftarrow \vec{x} + \frac{\Delta t}{\mu}\vec{F}
    /// \\end{equation}
    /// where $\mu$ is the friction coefficient.
    ///
    /// Cells whose new position would not be finite keep their old position and are
    /// returned together with the error.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub fn update_positions(&mut self) -> Vec<(CellIdentifier, CalcError)> {
        let factor = self.settings.time_step / self.settings.friction_coefficient;
        let mut failed = Vec::new();
        for (id, position) in self.positions.iter_mut() {
            if let Some(cell) = self.cells.get(id) {
                let updated = *position + cell.force() * factor;
                if updated.iter().all(|x| x.is_finite()) {
                    *position = updated;
                } else {
                    failed.push((
                        *id,
                        CalcError(format!(
                            "integrated position {:?} of cell {id} is not finite",
                            updated.as_slice()
                        )),
                    ));
                }
            }
        }
        if !self.positions.is_empty() {
            self.neighbor_cache.mark_dirty();
        }
        failed
    }

    /// Passes the current positions to the neighbor graph and caches the rebuilt adjacency.
    #[cfg_attr(feature = "tracing", instrument(skip_all))]
    pub fn compute_closest_points(&mut self) -> Result<(), CalcError> {
        for (id, position) in self.positions.iter() {
            self.neighbor_graph.insert(*id, *position);
        }
        let mut adjacency = self.neighbor_graph.rebuild()?;
        adjacency.retain(|id, _| self.cells.contains_key(id));
        self.neighbor_cache.replace(adjacency, self.iteration);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            iteration = self.iteration,
            generation = self.neighbor_cache.generation(),
            n_cells = self.cells.len(),
            "rebuilt neighbor graph"
        );
        Ok(())
    }

    /// Reads the receptors and advances the cell cycle of every cell in parallel.
    ///
    /// Returns the outcome of each cell in increasing order of identifiers.
    fn cell_cycles(&mut self) -> Vec<(CellIdentifier, Result<Option<CycleEvent>, AggregateError>)> {
        let Self {
            cells,
            positions,
            substrates,
            settings,
            handle,
            thread_pool,
            ..
        } = self;
        let parameters = &settings.cell;
        let handle = *handle;
        let positions = &*positions;
        let substrates = &substrates[..];
        run_in_pool(thread_pool.as_ref(), || {
            cells
                .par_iter_mut()
                .map(|(id, cell)| {
                    let outcome = positions
                        .get(id)
                        .ok_or_else(|| AggregateError::from(NotFound::cell(id)))
                        .and_then(|position| {
                            let context = ReceptorContext {
                                aggregate: handle,
                                position,
                                substrates,
                            };
                            cell.receptors_reading(&context, parameters)?;
                            Ok(cell.advance_time_step(parameters)?)
                        });
                    (*id, outcome)
                })
                .collect()
        })
    }

    /// Cells whose state or position is corrupted and which must not take part in the step
    fn invalid_cells(&self) -> Vec<(CellIdentifier, CalcError)> {
        self.cells()
            .filter_map(|(id, cell, position)| {
                let check = cell.validate(&self.settings.cell).and_then(|_| {
                    match position.iter().all(|x| x.is_finite()) {
                        true => Ok(()),
                        false => Err(CalcError(format!(
                            "position {:?} of cell {id} is not finite",
                            position.as_slice()
                        ))),
                    }
                });
                check.err().map(|error| (*id, error))
            })
            .collect()
    }

    /// Removes a cell whose step failed and records the failure.
    ///
    /// Cells which were already removed earlier in the step are not recorded twice.
    fn discard_failed_cell(
        &mut self,
        id: CellIdentifier,
        error: AggregateError,
        summary: &mut StepSummary,
    ) {
        if self.remove(&id).is_err() {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::warn!(cell = %id, %error, "removing cell after failed step");
        self.failures.push(FailureRecord {
            iteration: self.iteration,
            identifier: id,
            message: error.to_string(),
        });
        summary.failures += 1;
    }

    /// Advances the aggregate by one step.
    #[cfg_attr(feature = "tracing", instrument(skip_all, fields(iteration = self.iteration)))]
    pub fn advance_time_step(&mut self) -> Result<StepSummary, AggregateError> {
        let mut summary = StepSummary {
            iteration: self.iteration,
            ..Default::default()
        };
        self.clear_forces();
        for (id, error) in self.invalid_cells() {
            self.discard_failed_cell(id, error.into(), &mut summary);
        }
        for (id, error) in self.compute_forces() {
            self.discard_failed_cell(id, error.into(), &mut summary);
        }
        for (id, error) in self.update_positions() {
            self.discard_failed_cell(id, error.into(), &mut summary);
        }

        for (id, outcome) in self.cell_cycles() {
            let result = match outcome {
                Ok(None) => Ok(()),
                Ok(Some(CycleEvent::Mitosis)) => self.mitosis(id).map(|_| summary.divisions += 1),
                Ok(Some(CycleEvent::Apoptosis(_cause))) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(cell = %id, cause = %_cause, "apoptosis");
                    self.remove(&id)
                        .map(|_| summary.deaths += 1)
                        .map_err(AggregateError::from)
                }
                Err(e) => Err(e),
            };
            if let Err(error) = result {
                self.discard_failed_cell(id, error, &mut summary);
            }
        }

        if self.iteration % self.settings.closest_point_interval == 0 {
            self.compute_closest_points()?;
            summary.rebuilt_graph = true;
        }
        self.iteration += 1;
        Ok(summary)
    }

    /// Exports the state of all living cells.
    pub fn snapshot(&self) -> BTreeMap<CellIdentifier, CellSnapshot<D>> {
        self.cells()
            .map(|(id, cell, position)| {
                (
                    *id,
                    CellSnapshot {
                        parent_id: cell.parent_id(),
                        generation: cell.generation(),
                        position: *position,
                        radius: cell.radius(),
                        nutrient_level: cell.nutrient_level(),
                        energy_level: cell.energy_level(),
                        chemo_attractant_level: cell.chemo_attractant_level(),
                        color: cell.color(),
                        cycle_state: cell.cycle_state(&self.settings.cell),
                    },
                )
            })
            .collect()
    }

    /// Writes a human-readable listing of all cells.
    ///
    /// The format is meant for debugging and may change at any time.
    pub fn dump_content<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "{self}")?;
        for (id, cell, position) in self.cells() {
            let neighbors = self
                .neighbor_cache
                .region(id)
                .map_or(0, |region| region.number_of_neighbors());
            writeln!(
                writer,
                "  {id} parent={} generation={} position={:?} radius={:.4} nutrient={:.4} \
                energy={:.4} force={:?} color={} neighbors={neighbors}",
                cell.parent_id()
                    .map_or_else(|| "-".to_owned(), |parent| parent.to_string()),
                cell.generation(),
                position.as_slice(),
                cell.radius(),
                cell.nutrient_level(),
                cell.energy_level(),
                cell.force().as_slice(),
                cell.color(),
            )?;
        }
        for failure in self.failures.iter() {
            writeln!(
                writer,
                "  failed {} at iteration {}: {}",
                failure.identifier, failure.iteration, failure.message
            )?;
        }
        Ok(())
    }
}

impl<const D: usize, G, I> core::fmt::Display for CellularAggregate<D, G, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "CellularAggregate {} (D={}): {} cells, {} substrates, iteration {}, \
            neighbor graph generation {}{}",
            self.handle,
            D,
            self.cells.len(),
            self.substrates.len(),
            self.iteration,
            self.neighbor_cache.generation(),
            if self.neighbor_cache.is_dirty() { " (stale)" } else { "" },
        )
    }
}
