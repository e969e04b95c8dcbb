//! A speciated genetic algorithm engine in the NEAT tradition.
//!
//! Genomes are grouped into niches by genetic distance to a mascot,
//! fitness is shared within each niche, and the next generation is
//! rebuilt from per-niche survivors and crossover offspring. The genome
//! representation itself is supplied by the user via the [`Genome`]
//! trait, so the engine can drive anything from neural network
//! topologies to bit strings.
//!
//! Every stochastic decision is drawn from a single RNG handle owned by
//! the [`Population`]; seeding it makes whole runs reproducible.
//!
//! # Example usage: evolving a scalar toward a target value
//! ```
//! use rand::{Rng, RngCore};
//! use speciary::{Genome, Population, PopulationControl, PopulationSettings};
//!
//! #[derive(Clone, Debug)]
//! struct Scalar(f64);
//!
//! impl Genome for Scalar {
//!     type Environment = ();
//!
//!     fn distance(&self, other: &Self, _env: &()) -> f64 {
//!         (self.0 - other.0).abs()
//!     }
//!
//!     fn crossover(&self, other: &Self, _env: &mut (), _rate: f64, _rng: &mut dyn RngCore) -> Self {
//!         Scalar((self.0 + other.0) / 2.0)
//!     }
//!
//!     fn randomize(&mut self, _env: &(), rng: &mut dyn RngCore) {
//!         self.0 = rng.gen_range(-10.0..10.0);
//!     }
//!
//!     fn mutate(&mut self, _env: &mut (), rng: &mut dyn RngCore) {
//!         self.0 += rng.gen_range(-0.5..0.5);
//!     }
//! }
//!
//! let settings = PopulationSettings {
//!     size: 40,
//!     species_distance: 2.0,
//!     ..PopulationSettings::default()
//! };
//! let control = PopulationControl::new(&settings, 0.1);
//!
//! let mut population = Population::new(settings, control, (), Scalar(0.0), Some(42)).unwrap();
//! let best = population
//!     .run(
//!         |genome| 1.0 / (1.0 + (genome.0 - 3.0).abs()),
//!         |best, generation| best.fitness() > 0.95 || generation >= 50,
//!         |report| println!("{}", report),
//!     )
//!     .unwrap();
//! assert!(best.fitness() > 0.0);
//! ```

mod genome;
mod populations;

pub use genome::*;
pub use populations::*;
