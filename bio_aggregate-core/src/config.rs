//! Parameters of cells and aggregates.
//!
//! All settings can be (de)serialized and thus be stored alongside simulation results.
//! Missing fields are filled in with their defaults.
//! ```
//! # use bio_aggregate_core::config::AggregateSettings;
//! let settings = AggregateSettings::from_ron_str(
//!     "(friction_coefficient: 2.0, cell: (growth_radius_limit: 3.0))",
//! ).unwrap();
//! assert_eq!(settings.friction_coefficient, 2.0);
//! assert_eq!(settings.cell.growth_radius_limit, 3.0);
//! assert_eq!(settings.closest_point_interval, 5);
//! ```
use bio_aggregate_concepts::{CellColor, SetupError};
use serde::{Deserialize, Serialize};

/// Assigns substrates to the receptors of a cell.
///
/// Each entry refers to the index of a substrate in the order in which substrates were
/// added to the aggregate.
/// Receptors whose substrate is not registered do not change the corresponding level.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SubstrateRoles {
    /// Substrate which determines the nutrient level
    pub nutrient: Option<usize>,
    /// Substrate which determines the energy level
    pub energy: Option<usize>,
    /// Substrate which acts as chemo-attractant
    pub chemo_attractant: Option<usize>,
}

impl Default for SubstrateRoles {
    fn default() -> Self {
        Self {
            nutrient: Some(0),
            energy: Some(1),
            chemo_attractant: Some(2),
        }
    }
}

/// Parameters which govern the cell cycle.
///
/// These values are shared by every cell of an aggregate.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CellParameters {
    /// Radius of a newly created egg
    pub default_radius: f64,
    /// Increase of the radius per tick of growth
    pub growth_radius_increment: f64,
    /// Maximum radius at which cells stop growing and prepare for division
    pub growth_radius_limit: f64,
    /// Nutrient level which has to be exceeded for a cell to grow
    pub nutrient_self_repair_level: f64,
    /// Energy level which has to be exceeded for a cell to grow
    pub energy_self_repair_level: f64,
    /// Number of ticks a cell may spend without growth before it starves
    pub growth_maximum_latency_time: u64,
    /// Number of ticks a cell waits at its radius limit before dividing
    pub division_maximum_latency_time: u64,
    /// Cells of this generation or higher do not divide anymore
    pub maximum_generation_limit: usize,
    /// Chemo-attractant levels below this value are sensed as low
    pub chemo_attractant_low_threshold: f64,
    /// Chemo-attractant levels above this value are sensed as high
    pub chemo_attractant_high_threshold: f64,
    /// Rate in `(0, 1]` at which sensed levels follow the sampled concentrations
    pub receptor_uptake_rate: f64,
    /// Nutrient level of a newly created egg
    pub initial_nutrient_level: f64,
    /// Energy level of a newly created egg
    pub initial_energy_level: f64,
    /// Color of a newly created egg
    pub default_color: CellColor,
    /// Substrates which are read by the receptors
    pub substrate_roles: SubstrateRoles,
}

impl Default for CellParameters {
    fn default() -> Self {
        Self {
            default_radius: 1.0,
            growth_radius_increment: 0.1,
            growth_radius_limit: 2.0,
            nutrient_self_repair_level: 0.2,
            energy_self_repair_level: 0.2,
            growth_maximum_latency_time: 10,
            division_maximum_latency_time: 5,
            maximum_generation_limit: 10,
            chemo_attractant_low_threshold: 0.2,
            chemo_attractant_high_threshold: 0.8,
            receptor_uptake_rate: 0.5,
            initial_nutrient_level: 1.0,
            initial_energy_level: 1.0,
            default_color: CellColor::default(),
            substrate_roles: SubstrateRoles::default(),
        }
    }
}

impl CellParameters {
    /// Checks that all parameters are within their admissible ranges.
    pub fn validate(&self) -> Result<(), SetupError> {
        let finite = [
            ("default_radius", self.default_radius),
            ("growth_radius_increment", self.growth_radius_increment),
            ("growth_radius_limit", self.growth_radius_limit),
            ("nutrient_self_repair_level", self.nutrient_self_repair_level),
            ("energy_self_repair_level", self.energy_self_repair_level),
            ("chemo_attractant_low_threshold", self.chemo_attractant_low_threshold),
            ("chemo_attractant_high_threshold", self.chemo_attractant_high_threshold),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SetupError(format!("{name}={value} must be finite")));
        }
        if self.growth_radius_limit < 0.0 || self.growth_radius_increment < 0.0 {
            return Err(SetupError(format!(
                "growth_radius_limit={} and growth_radius_increment={} must not be negative",
                self.growth_radius_limit, self.growth_radius_increment
            )));
        }
        if !(0.0..=self.growth_radius_limit).contains(&self.default_radius) {
            return Err(SetupError(format!(
                "default_radius={} must lie within [0, growth_radius_limit={}]",
                self.default_radius, self.growth_radius_limit
            )));
        }
        if self.chemo_attractant_low_threshold > self.chemo_attractant_high_threshold {
            return Err(SetupError(format!(
                "chemo_attractant_low_threshold={} exceeds chemo_attractant_high_threshold={}",
                self.chemo_attractant_low_threshold, self.chemo_attractant_high_threshold
            )));
        }
        if !(self.receptor_uptake_rate > 0.0 && self.receptor_uptake_rate <= 1.0) {
            return Err(SetupError(format!(
                "receptor_uptake_rate={} must lie within (0, 1]",
                self.receptor_uptake_rate
            )));
        }
        for (name, level) in [
            ("initial_nutrient_level", self.initial_nutrient_level),
            ("initial_energy_level", self.initial_energy_level),
        ] {
            if !(0.0..=1.0).contains(&level) {
                return Err(SetupError(format!("{name}={level} must lie within [0, 1]")));
            }
        }
        Ok(())
    }
}

/// Settings of a [CellularAggregate](crate::aggregate::CellularAggregate).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AggregateSettings {
    /// Damping factor by which forces are divided when integrating positions
    pub friction_coefficient: f64,
    /// Time increment $\Delta t$ of a single simulation step
    pub time_step: f64,
    /// Number of steps between two rebuilds of the neighbor graph
    pub closest_point_interval: u64,
    /// Distance by which daughters are placed away from the position of their mother
    pub mitosis_perturbation_length: f64,
    /// Seed from which all random numbers of the aggregate are drawn
    pub rng_seed: u64,
    /// Number of threads of a dedicated thread pool.
    /// If not specified, the global pool of [rayon] is used.
    pub n_threads: Option<core::num::NonZeroUsize>,
    /// Parameters shared by all cells
    pub cell: CellParameters,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            friction_coefficient: 1.0,
            time_step: 1.0,
            closest_point_interval: 5,
            mitosis_perturbation_length: 1.0,
            rng_seed: 0,
            n_threads: None,
            cell: CellParameters::default(),
        }
    }
}

impl AggregateSettings {
    /// Checks that all settings are within their admissible ranges.
    pub fn validate(&self) -> Result<(), SetupError> {
        for (name, value) in [
            ("friction_coefficient", self.friction_coefficient),
            ("time_step", self.time_step),
            ("mitosis_perturbation_length", self.mitosis_perturbation_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SetupError(format!(
                    "{name}={value} must be finite and strictly positive"
                )));
            }
        }
        if self.closest_point_interval == 0 {
            return Err(SetupError(
                "closest_point_interval must be at least 1".to_owned(),
            ));
        }
        self.cell.validate()
    }

    /// Parses settings from a string in [ron](https://docs.rs/ron) notation.
    pub fn from_ron_str(s: &str) -> Result<Self, SetupError> {
        ron::from_str(s).map_err(|e| SetupError(format!("could not parse settings: {e}")))
    }

    /// Formats the settings in [ron](https://docs.rs/ron) notation.
    pub fn to_ron_string(&self) -> Result<String, SetupError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SetupError(format!("could not serialize settings: {e}")))
    }

    /// Parses settings from a json string.
    pub fn from_json_str(s: &str) -> Result<Self, SetupError> {
        serde_json::from_str(s).map_err(|e| SetupError(format!("could not parse settings: {e}")))
    }

    /// Reads settings from a file.
    ///
    /// Files ending in `.json` are read as json, all others in ron notation.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SetupError(format!("could not read {}: {e}", path.display())))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_ron_str(&contents),
        }
    }
}
