use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member's entry in a niche: its identifier and the raw and
/// niche-size-adjusted fitness recorded for the current generation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct NicheMember {
    pub id: Uuid,
    pub fitness: f64,
    pub adjusted_fitness: f64,
}

/// A cluster of genetically similar members, anchored by a mascot.
///
/// Membership is decided during speciation by genetic distance to the
/// mascot's genome. Niches persist across generations by identity,
/// carrying their age forward, while the member list is rebuilt from
/// scratch each generation. Only identifiers are stored here; genome
/// data lives exclusively in the population's member table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Niche {
    id: Uuid,
    mascot: Uuid,
    members: Vec<NicheMember>,
    age: usize,
    total_adjusted_fitness: f64,
}

impl Niche {
    /// Creates a new niche with the given member as mascot and sole
    /// inhabitant.
    pub(crate) fn new(mascot: Uuid, fitness: f64) -> Niche {
        Niche {
            id: Uuid::new_v4(),
            mascot,
            members: vec![NicheMember {
                id: mascot,
                fitness,
                adjusted_fitness: 0.0,
            }],
            age: 0,
            total_adjusted_fitness: 0.0,
        }
    }

    /// Returns the niche's identifier, stable across generations.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the current mascot's member identifier.
    ///
    /// After a reset this id may refer to a member that was not carried
    /// into the next generation; the controller keeps the mascot's
    /// genome anchored separately for distance computations.
    pub fn mascot(&self) -> Uuid {
        self.mascot
    }

    /// Returns the number of generations the niche has survived.
    pub fn age(&self) -> usize {
        self.age
    }

    /// Returns the sum of adjusted fitness across the niche, as
    /// computed by the last fitness-sharing pass.
    pub fn total_adjusted_fitness(&self) -> f64 {
        self.total_adjusted_fitness
    }

    /// Returns the niche's members in discovery order.
    pub fn members(&self) -> &[NicheMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn insert(&mut self, id: Uuid, fitness: f64) {
        self.members.push(NicheMember {
            id,
            fitness,
            adjusted_fitness: 0.0,
        });
    }

    /// Fitness sharing: each member's fitness is divided by the niche
    /// size, under-weighting large niches so a single dominant niche
    /// cannot consume the whole reproductive budget. A raw fitness of
    /// exactly zero is left untouched.
    pub(crate) fn share_fitness(&mut self) {
        let count = self.members.len() as f64;
        let mut total = 0.0;
        for member in &mut self.members {
            member.adjusted_fitness = if member.fitness == 0.0 {
                0.0
            } else {
                member.fitness / count
            };
            total += member.adjusted_fitness;
        }
        self.total_adjusted_fitness = total;
    }

    /// Returns the first member with maximal raw fitness, or `None`
    /// for an empty niche.
    pub fn best(&self) -> Option<&NicheMember> {
        let mut best = self.members.first()?;
        for member in &self.members[1..] {
            if member.fitness > best.fitness {
                best = member;
            }
        }
        Some(best)
    }

    /// Removes the weakest `clean_pct` fraction (rounded down) from
    /// the breeding pool, always leaving at least one breeder. The
    /// shared totals are left as computed over the full niche.
    pub(crate) fn cull_weakest(&mut self, clean_pct: f64) {
        let cull = ((self.members.len() as f64 * clean_pct).floor() as usize)
            .min(self.members.len().saturating_sub(1));
        if cull == 0 {
            return;
        }
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| {
            self.members[a]
                .fitness
                .partial_cmp(&self.members[b].fitness)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mut keep = vec![true; self.members.len()];
        for &i in &order[..cull] {
            keep[i] = false;
        }
        let mut flags = keep.into_iter();
        self.members.retain(|_| flags.next().unwrap_or(true));
    }

    /// Resets the niche for the next generation: draws a new mascot
    /// uniformly from the current members, ages the niche, zeroes the
    /// shared total, and clears the member list for repopulation by
    /// the next speciation pass. Returns the new mascot's id.
    pub(crate) fn reset(&mut self, rng: &mut impl Rng) -> Option<Uuid> {
        let new_mascot = self.members.choose(rng)?.id;
        self.mascot = new_mascot;
        self.age += 1;
        self.total_adjusted_fitness = 0.0;
        self.members.clear();
        Some(new_mascot)
    }
}
