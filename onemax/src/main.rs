//! OneMax demo: evolve a bit string toward all ones.

use log::info;
use rand::{Rng, RngCore};
use speciary::{
    Genome, ParentSelection, Population, PopulationControl, PopulationSettings, SurvivorSelection,
};

const BITS: usize = 64;
const BIT_FLIP_CHANCE: f64 = 0.01;
const MAX_GENERATIONS: usize = 500;

#[derive(Clone, Debug)]
struct BitString {
    bits: Vec<bool>,
}

impl Genome for BitString {
    type Environment = ();

    fn distance(&self, other: &Self, _env: &()) -> f64 {
        let differing = self
            .bits
            .iter()
            .zip(&other.bits)
            .filter(|(a, b)| a != b)
            .count();
        differing as f64 / self.bits.len() as f64
    }

    fn crossover(
        &self,
        other: &Self,
        _env: &mut (),
        _crossover_rate: f64,
        rng: &mut dyn RngCore,
    ) -> Self {
        let bits = self
            .bits
            .iter()
            .zip(&other.bits)
            .map(|(&a, &b)| if rng.gen::<bool>() { a } else { b })
            .collect();
        BitString { bits }
    }

    fn randomize(&mut self, _env: &(), rng: &mut dyn RngCore) {
        for bit in &mut self.bits {
            *bit = rng.gen::<bool>();
        }
    }

    fn mutate(&mut self, _env: &mut (), rng: &mut dyn RngCore) {
        for bit in &mut self.bits {
            if rng.gen::<f64>() < BIT_FLIP_CHANCE {
                *bit = !*bit;
            }
        }
    }
}

fn ones(genome: &BitString) -> f64 {
    genome.bits.iter().filter(|&&b| b).count() as f64
}

fn main() {
    env_logger::init();

    let settings = PopulationSettings {
        size: 150,
        dynamic_distance: true,
        species_distance: 0.25,
        species_target: 4,
        inbreed_rate: 0.05,
        crossover_rate: 0.75,
        clean_pct: 0.5,
        stagnation_limit: 15,
        parent_selection: ParentSelection::BiasedRandom,
        survivor_selection: SurvivorSelection::Fittest,
    };
    let control = PopulationControl::new(&settings, 0.01);
    let template = BitString {
        bits: vec![false; BITS],
    };

    let mut population = match Population::new(settings, control, (), template, Some(0xDEADBEEF)) {
        Ok(population) => population,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let best = population.run(
        ones,
        |best, generation| best.fitness() as usize == BITS || generation + 1 >= MAX_GENERATIONS,
        |report| {
            if report.generation() % 10 == 0 {
                println!("{}", report);
            }
        },
    );

    match best {
        Ok(best) => {
            info!("run finished after {} generations", population.generation());
            println!(
                "best genome scored {}/{} ones: {}",
                best.fitness(),
                BITS,
                best.genome()
                    .bits
                    .iter()
                    .map(|&b| if b { '1' } else { '0' })
                    .collect::<String>()
            );
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
