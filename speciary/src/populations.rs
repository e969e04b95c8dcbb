//! A population is a collection of members grouped into niches, which
//! can be evolved using a genome evaluation function as the source of
//! selective pressure.
//!
//! Each generation runs through a fixed phase sequence: Evaluating
//! (the only parallelizable phase), Speciating, Reproducing, and
//! Reported. The controller owns the authoritative member table and
//! the niche list; niches reference members by identifier only.
mod config;
mod control;
mod errors;
mod member;
mod niche;
mod reporting;
mod reproduction;
mod selection;
mod speciation;

use ahash::AHashMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::Genome;
pub use config::PopulationSettings;
pub use control::PopulationControl;
pub use errors::EvolutionError;
pub use member::Member;
pub use niche::{Niche, NicheMember};
pub use reporting::{GenerationReport, NicheSummary, ReportLog, Stats};
pub use selection::{ParentSelection, SurvivorSelection};

use member::MemberTable;
use reproduction::OffspringFactory;

/// A population of members evolving under speciated selection.
///
/// The population owns the member table, the niche list, the genome
/// environment, and a single seeded RNG from which every stochastic
/// decision is drawn in a fixed order, so runs are reproducible under
/// a fixed seed. See the crate-level docs for a usage example.
pub struct Population<G: Genome> {
    members: MemberTable<G>,
    niches: Vec<Niche>,
    /// Mascot genomes cloned at niche creation or reset. Keyed by
    /// niche id; kept outside the niches so they hold ids only.
    anchors: AHashMap<Uuid, G>,
    env: G::Environment,
    settings: PopulationSettings,
    control: PopulationControl,
    generation: usize,
    best_ever: Option<Member<G>>,
    rng: StdRng,
}

impl<G: Genome> Population<G> {
    /// Creates a population of `settings.size` independently
    /// randomized clones of `template`.
    ///
    /// Pass a seed for reproducible runs; with `None` the RNG is
    /// seeded from the operating system.
    ///
    /// # Errors
    /// Returns a configuration error if the settings fail validation.
    pub fn new(
        settings: PopulationSettings,
        control: PopulationControl,
        env: G::Environment,
        template: G,
        seed: Option<u64>,
    ) -> Result<Population<G>, EvolutionError> {
        settings.validate()?;
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut members = MemberTable::with_capacity(settings.size);
        for _ in 0..settings.size {
            let mut genome = template.clone();
            genome.randomize(&env, &mut rng);
            members.insert(Member::new(genome));
        }
        Ok(Population {
            members,
            niches: Vec::new(),
            anchors: AHashMap::new(),
            env,
            settings,
            control,
            generation: 0,
            best_ever: None,
            rng,
        })
    }

    /// Creates a population from an explicit initial set of genomes.
    ///
    /// If fewer genomes than `settings.size` are given, the remainder
    /// is filled with randomized clones of the first; extra genomes
    /// are kept, and the table shrinks to `settings.size` at the first
    /// generation boundary.
    ///
    /// # Errors
    /// Returns a configuration error if the settings fail validation
    /// or the genome set is empty.
    pub fn with_members(
        settings: PopulationSettings,
        control: PopulationControl,
        env: G::Environment,
        genomes: Vec<G>,
        seed: Option<u64>,
    ) -> Result<Population<G>, EvolutionError> {
        settings.validate()?;
        if genomes.is_empty() {
            return Err(EvolutionError::EmptyInitialPopulation);
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let template = genomes[0].clone();
        let mut members = MemberTable::with_capacity(settings.size.max(genomes.len()));
        for genome in genomes {
            members.insert(Member::new(genome));
        }
        while members.len() < settings.size {
            let mut genome = template.clone();
            genome.randomize(&env, &mut rng);
            members.insert(Member::new(genome));
        }
        Ok(Population {
            members,
            niches: Vec::new(),
            anchors: AHashMap::new(),
            env,
            settings,
            control,
            generation: 0,
            best_ever: None,
            rng,
        })
    }

    /// Evaluates every member with the supplied fitness function.
    ///
    /// Transient genome state is reset before each evaluation. Fitness
    /// values must be finite and non-negative; fitness sharing and the
    /// proportionate samplers rely on it.
    ///
    /// # Errors
    /// Returns a collaborator failure for any invalid fitness value.
    pub fn evaluate_fitness<E>(&mut self, mut evaluator: E) -> Result<(), EvolutionError>
    where
        E: FnMut(&G) -> f64,
    {
        for member in self.members.iter_mut() {
            member.genome_mut().reset_state();
            let fitness = evaluator(member.genome());
            if !fitness.is_finite() || fitness < 0.0 {
                return Err(EvolutionError::InvalidFitness {
                    member: member.id(),
                    fitness,
                });
            }
            member.set_fitness(fitness);
        }
        Ok(())
    }

    /// Parallel counterpart of [`evaluate_fitness`], fanning the
    /// evaluations out over rayon's thread pool. Each evaluation only
    /// reads its own genome and writes its own fitness slot, and the
    /// seeded RNG is never touched here, so parallel evaluation keeps
    /// runs reproducible.
    ///
    /// [`evaluate_fitness`]: Population::evaluate_fitness
    #[cfg(feature = "parallel")]
    pub fn evaluate_fitness_par<E>(&mut self, evaluator: E) -> Result<(), EvolutionError>
    where
        E: Fn(&G) -> f64 + Sync,
        G: Send + Sync,
    {
        use rayon::prelude::*;

        self.members.slice_mut().par_iter_mut().for_each(|member| {
            member.genome_mut().reset_state();
            let fitness = evaluator(member.genome());
            member.set_fitness(fitness);
        });
        for member in self.members.iter() {
            let fitness = member.fitness();
            if !fitness.is_finite() || fitness < 0.0 {
                return Err(EvolutionError::InvalidFitness {
                    member: member.id(),
                    fitness,
                });
            }
        }
        Ok(())
    }

    /// Runs one Speciating and Reproducing pass over freshly scored
    /// members and replaces the member table with the next generation.
    ///
    /// Call [`evaluate_fitness`] first. Returns the report for the
    /// generation that was just closed out.
    ///
    /// # Errors
    /// Returns an error if a genome reports a non-finite distance or
    /// the population collapses to zero niches.
    ///
    /// [`evaluate_fitness`]: Population::evaluate_fitness
    pub fn evolve(&mut self) -> Result<GenerationReport<G>, EvolutionError> {
        // Speciating: partition members, then share fitness per niche.
        speciation::speciate(
            &self.members,
            &mut self.niches,
            &mut self.anchors,
            &mut self.control,
            &self.settings,
            &self.env,
        )?;
        for niche in &mut self.niches {
            niche.share_fitness();
        }

        // Track the generation champion and global stagnation.
        let best = self
            .champion()
            .cloned()
            .ok_or(EvolutionError::PopulationCollapse)?;
        if best.fitness() > self.control.previous_fitness {
            self.control.stagnation_count = 0;
        } else {
            self.control.stagnation_count += 1;
        }
        match &self.best_ever {
            Some(b) if b.fitness() >= best.fitness() => {}
            _ => self.best_ever = Some(best.clone()),
        }

        // Snapshot for the report before niches are culled and reset.
        let report = GenerationReport::new(
            self.generation,
            best.clone(),
            Stats::from(self.members.iter().map(Member::fitness)),
            self.niches.iter().map(NicheSummary::from).collect(),
        );

        // Reproducing: survivors plus crossover/clone offspring.
        let survivors = self
            .settings
            .survivor_selection
            .pick(&self.members, &self.niches);
        let next = OffspringFactory::new(
            &self.members,
            &mut self.env,
            &self.settings,
            &mut self.rng,
        )
        .fill_generation(survivors, &mut self.niches, &mut self.anchors, &self.control)?;

        self.control.previous_fitness = best.fitness();

        // Reset persisting niches before the next speciation pass. The
        // redrawn mascot may not survive into the next table; its
        // genome is anchored here while the id is allowed to go stale.
        for niche in &mut self.niches {
            if let Some(mascot) = niche.reset(&mut self.rng) {
                if let Some(member) = self.members.get(mascot) {
                    self.anchors.insert(niche.id(), member.genome().clone());
                }
            }
        }

        self.members = next;
        self.generation += 1;
        Ok(report)
    }

    /// Drives the full evaluate, speciate, reproduce, report loop
    /// until the stopping predicate returns true.
    ///
    /// The predicate receives the closed generation's best member and
    /// index, and is the only cancellation mechanism; a generation in
    /// Evaluating always completes all member evaluations first. Every
    /// report is delivered to `on_report` before the loop exits.
    ///
    /// Returns the best member observed across all generations, which
    /// is tracked independently of pruning.
    pub fn run<E, S, R>(
        &mut self,
        mut evaluator: E,
        mut stop: S,
        mut on_report: R,
    ) -> Result<Member<G>, EvolutionError>
    where
        E: FnMut(&G) -> f64,
        S: FnMut(&Member<G>, usize) -> bool,
        R: FnMut(&GenerationReport<G>),
    {
        loop {
            self.evaluate_fitness(&mut evaluator)?;
            let report = self.evolve()?;
            let stop_now = stop(report.best(), report.generation());
            on_report(&report);
            if stop_now {
                return self
                    .best_ever
                    .clone()
                    .ok_or(EvolutionError::PopulationCollapse);
            }
        }
    }

    /// Returns the first member holding the current generation's best
    /// fitness, or `None` for an empty table.
    pub fn champion(&self) -> Option<&Member<G>> {
        let mut best: Option<&Member<G>> = None;
        for member in self.members.iter() {
            match best {
                Some(b) if member.fitness() <= b.fitness() => {}
                _ => best = Some(member),
            }
        }
        best
    }

    /// Returns the best member observed across all generations so far.
    pub fn best_ever(&self) -> Option<&Member<G>> {
        self.best_ever.as_ref()
    }

    /// Returns an iterator over the current member table, in insertion
    /// order.
    pub fn members(&self) -> impl Iterator<Item = &Member<G>> {
        self.members.iter()
    }

    /// Resolves a member identifier against the authoritative table.
    pub fn member(&self, id: Uuid) -> Option<&Member<G>> {
        self.members.get(id)
    }

    /// Returns the current niche list.
    pub fn niches(&self) -> &[Niche] {
        &self.niches
    }

    /// Returns the number of completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn settings(&self) -> &PopulationSettings {
        &self.settings
    }

    pub fn control(&self) -> &PopulationControl {
        &self.control
    }

    pub fn environment(&self) -> &G::Environment {
        &self.env
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use rand::{Rng, RngCore};

    use crate::Genome;

    /// Minimal genome for engine-internal tests: a single scalar with
    /// absolute-difference distance and averaging crossover.
    #[derive(Clone, Debug, PartialEq)]
    pub(crate) struct ScalarGenome(pub f64);

    impl Genome for ScalarGenome {
        type Environment = ();

        fn distance(&self, other: &Self, _env: &()) -> f64 {
            (self.0 - other.0).abs()
        }

        fn crossover(
            &self,
            other: &Self,
            _env: &mut (),
            _crossover_rate: f64,
            _rng: &mut dyn RngCore,
        ) -> Self {
            ScalarGenome((self.0 + other.0) / 2.0)
        }

        fn randomize(&mut self, _env: &(), rng: &mut dyn RngCore) {
            self.0 = rng.gen_range(0.0..10.0);
        }

        fn mutate(&mut self, _env: &mut (), rng: &mut dyn RngCore) {
            self.0 += rng.gen_range(-0.1..0.1);
        }
    }
}
