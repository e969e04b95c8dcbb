use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the population engine.
///
/// Configuration errors are reported at construction or parse time;
/// the remaining variants abort the generation in which they occur.
/// Messages name the phase in which the invariant was violated.
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error("population size must be greater than zero")]
    ZeroPopulationSize,

    #[error("initial population is empty")]
    EmptyInitialPopulation,

    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfBounds { name: &'static str, value: f64 },

    #[error("species distance must be a positive finite number, got {0}")]
    InvalidSpeciesDistance(f64),

    #[error("unknown parent selection strategy `{0}`")]
    UnknownParentSelection(String),

    #[error("unknown survivor selection strategy `{0}`")]
    UnknownSurvivorSelection(String),

    #[error("evaluating: fitness of member {member} is not a finite non-negative number ({fitness})")]
    InvalidFitness { member: Uuid, fitness: f64 },

    #[error("speciating: distance between member {member} and the mascot of niche {niche} is not finite")]
    InvalidDistance { member: Uuid, niche: Uuid },

    #[error("reproducing: no niches remain, the population has collapsed")]
    PopulationCollapse,

    #[error("reproducing: selected parent {0} is missing from the member table")]
    MissingParent(Uuid),
}
