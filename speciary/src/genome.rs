use rand::RngCore;

/// An interface for genomes that can be evolved by the engine.
///
/// The engine treats genomes as opaque: it only ever measures distances
/// between them, recombines them, clones them, and hands them back to
/// the user's fitness function. All randomness is supplied through the
/// `rng` arguments, which the engine draws from its own seeded source.
pub trait Genome: Clone {
    /// Shared evolutionary context (innovation history, genetic
    /// coefficients and the like), opaque to the engine. Threaded
    /// immutably into distance computations and mutably into
    /// crossover and mutation.
    type Environment;

    /// Returns the genetic distance between two genomes.
    ///
    /// Must be finite; a non-finite distance aborts speciation.
    fn distance(&self, other: &Self, env: &Self::Environment) -> f64;

    /// Combines two genomes and returns a "child" genome.
    fn crossover(
        &self,
        other: &Self,
        env: &mut Self::Environment,
        crossover_rate: f64,
        rng: &mut dyn RngCore,
    ) -> Self;

    /// Re-draws the genome's evolvable parameters at random.
    /// Used to diversify the initial population from a single template.
    fn randomize(&mut self, env: &Self::Environment, rng: &mut dyn RngCore);

    /// Applies the genome's own mutation operators.
    ///
    /// Called exactly once on every newly produced genome (crossover
    /// child or clone), and never on survivors carried forward.
    fn mutate(&mut self, env: &mut Self::Environment, rng: &mut dyn RngCore);

    /// Clears any transient evaluation state. Invoked on every genome
    /// before each evaluation pass.
    fn reset_state(&mut self) {}
}
