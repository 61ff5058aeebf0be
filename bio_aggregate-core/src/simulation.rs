//! Drives an aggregate over a fixed number of steps.
use bio_aggregate_concepts::*;
use kdam::BarExt;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::aggregate::{CellularAggregate, StepSummary};
use crate::errors::AggregateError;
use crate::storage::{CellSnapshot, StorageInterface};

/// Controls how long a simulation runs and how often results are stored.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of steps to advance
    pub n_steps: u64,
    /// Results are stored whenever the iteration of the aggregate is a multiple of this
    /// value
    pub save_interval: u64,
    /// Display a progress bar on the terminal
    pub show_progressbar: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            n_steps: 100,
            save_interval: 10,
            show_progressbar: false,
        }
    }
}

impl SimulationSettings {
    /// Checks that results can be stored with the given interval.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.save_interval == 0 {
            return Err(SetupError("save_interval must be at least 1".to_owned()));
        }
        Ok(())
    }
}

fn initialize_bar(total: u64) -> Result<kdam::Bar, SetupError> {
    let bar_format = "\
    {desc}{percentage:3.0}%|{animation}| \
    {count}/{total} \
    [{elapsed}, \
    {rate:.2}{unit}/s{postfix}]";
    kdam::BarBuilder::default()
        .total(total as usize)
        .bar_format(bar_format)
        .dynamic_ncols(true)
        .build()
        .map_err(|e| SetupError(format!("could not create progress bar: {e}")))
}

fn store<const D: usize, G, I, S>(
    aggregate: &CellularAggregate<D, G, I>,
    storage: &mut S,
) -> Result<(), AggregateError>
where
    G: NeighborGraph<SVector<f64, D>>,
    I: Interaction<SVector<f64, D>, SVector<f64, D>, f64> + Sync,
    S: StorageInterface<CellIdentifier, CellSnapshot<D>>,
{
    let snapshot = aggregate.snapshot();
    storage.store_batch_elements(aggregate.iteration(), snapshot.iter())?;
    Ok(())
}

/// Advances the aggregate `n_steps` times and stores snapshots of all cells.
///
/// The state before the first step is stored as well as every state whose iteration is a
/// multiple of the save interval.
/// Returns the summaries of all executed steps.
#[cfg_attr(feature = "tracing", instrument(skip_all))]
pub fn run_simulation<const D: usize, G, I, S>(
    aggregate: &mut CellularAggregate<D, G, I>,
    settings: &SimulationSettings,
    storage: &mut S,
) -> Result<Vec<StepSummary>, AggregateError>
where
    G: NeighborGraph<SVector<f64, D>>,
    I: Interaction<SVector<f64, D>, SVector<f64, D>, f64> + Sync,
    S: StorageInterface<CellIdentifier, CellSnapshot<D>>,
{
    settings.validate()?;
    let mut bar = match settings.show_progressbar {
        true => Some(initialize_bar(settings.n_steps)?),
        false => None,
    };
    store(aggregate, storage)?;
    let mut summaries = Vec::with_capacity(settings.n_steps as usize);
    for _ in 0..settings.n_steps {
        let summary = aggregate.advance_time_step()?;
        if aggregate.iteration() % settings.save_interval == 0 {
            store(aggregate, storage)?;
        }
        if let Some(bar) = bar.as_mut() {
            bar.update(1)?;
        }
        summaries.push(summary);
    }
    #[cfg(feature = "tracing")]
    tracing::info!(
        iteration = aggregate.iteration(),
        n_cells = aggregate.number_of_cells(),
        "finished simulation"
    );
    Ok(summaries)
}
