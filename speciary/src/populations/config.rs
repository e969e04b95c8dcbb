use serde::{Deserialize, Serialize};

use super::errors::EvolutionError;
use super::selection::{ParentSelection, SurvivorSelection};

/// Configuration data for population generation and evolution.
/// Immutable for the duration of a run.
///
/// # Note
/// All quantities expressing probabilities or fractions must be in the
/// range [0.0, 1.0]; [`validate`] rejects anything else.
///
/// [`validate`]: PopulationSettings::validate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PopulationSettings {
    /// Target size of the population. Every completed generation holds
    /// exactly this many members.
    pub size: usize,
    /// Whether the speciation threshold adapts toward `species_target`.
    pub dynamic_distance: bool,
    /// Initial genetic distance threshold, beyond which genomes are
    /// considered as belonging to different niches.
    pub species_distance: f64,
    /// Desired number of niches when `dynamic_distance` is enabled.
    pub species_target: usize,
    /// Chance that both parents are drawn from the same niche.
    pub inbreed_rate: f64,
    /// Chance that an offspring is produced by crossover rather than by
    /// cloning a single parent.
    pub crossover_rate: f64,
    /// Fraction of each niche's weakest members excluded from the
    /// breeding pool before reproduction.
    pub clean_pct: f64,
    /// Generations without global best-fitness improvement before
    /// niches are pruned to force exploration.
    pub stagnation_limit: usize,
    /// Parent pair selection strategy.
    pub parent_selection: ParentSelection,
    /// Survivor selection strategy.
    pub survivor_selection: SurvivorSelection,
}

impl PopulationSettings {
    /// Checks the settings for configuration errors.
    pub fn validate(&self) -> Result<(), EvolutionError> {
        if self.size == 0 {
            return Err(EvolutionError::ZeroPopulationSize);
        }
        if !(self.species_distance.is_finite() && self.species_distance > 0.0) {
            return Err(EvolutionError::InvalidSpeciesDistance(self.species_distance));
        }
        for (name, value) in [
            ("inbreed_rate", self.inbreed_rate),
            ("crossover_rate", self.crossover_rate),
            ("clean_pct", self.clean_pct),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvolutionError::RateOutOfBounds { name, value });
            }
        }
        Ok(())
    }
}

impl Default for PopulationSettings {
    fn default() -> PopulationSettings {
        PopulationSettings {
            size: 100,
            dynamic_distance: true,
            species_distance: 3.0,
            species_target: 5,
            inbreed_rate: 0.001,
            crossover_rate: 0.75,
            clean_pct: 0.5,
            stagnation_limit: 15,
            parent_selection: ParentSelection::BiasedRandom,
            survivor_selection: SurvivorSelection::Fittest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(PopulationSettings::default().validate().is_ok());
    }

    #[test]
    fn zero_size_is_rejected() {
        let settings = PopulationSettings {
            size: 0,
            ..PopulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(EvolutionError::ZeroPopulationSize)
        ));
    }

    #[test]
    fn out_of_bounds_rates_are_rejected() {
        let settings = PopulationSettings {
            inbreed_rate: 1.5,
            ..PopulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(EvolutionError::RateOutOfBounds {
                name: "inbreed_rate",
                ..
            })
        ));
    }

    #[test]
    fn non_positive_species_distance_is_rejected() {
        let settings = PopulationSettings {
            species_distance: 0.0,
            ..PopulationSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(EvolutionError::InvalidSpeciesDistance(_))
        ));
    }
}
