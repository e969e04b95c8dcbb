use serde::{Deserialize, Serialize};

use super::config::PopulationSettings;

/// Mutable run state, adjusted once per generation: the speciation
/// engine moves `distance` toward the configured niche target, and the
/// population controller maintains the stagnation counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationControl {
    /// Current dynamic speciation distance threshold.
    pub distance: f64,
    /// Step by which the threshold is nudged toward `species_target`.
    pub distance_precision: f64,
    /// Consecutive generations without global best-fitness improvement.
    pub stagnation_count: usize,
    /// Best fitness observed in the previous generation.
    pub previous_fitness: f64,
}

impl PopulationControl {
    /// Smallest value the dynamic threshold may reach. A non-positive
    /// threshold would make every member found its own niche.
    pub const DISTANCE_FLOOR: f64 = 1e-6;

    /// Initial control state for a run: the threshold starts at the
    /// configured species distance and no stagnation is recorded.
    pub fn new(settings: &PopulationSettings, distance_precision: f64) -> PopulationControl {
        PopulationControl {
            distance: settings.species_distance,
            distance_precision,
            stagnation_count: 0,
            previous_fitness: f64::NEG_INFINITY,
        }
    }
}
