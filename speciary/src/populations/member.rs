use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A genome paired with its fitness score for the current generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Member<G> {
    id: Uuid,
    genome: G,
    fitness: f64,
}

impl<G> Member<G> {
    /// Wraps a genome under a fresh identifier, with zero fitness.
    pub(crate) fn new(genome: G) -> Member<G> {
        Member {
            id: Uuid::new_v4(),
            genome,
            fitness: 0.0,
        }
    }

    /// Returns the member's identifier, stable for its lifetime.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the member's genome.
    pub fn genome(&self) -> &G {
        &self.genome
    }

    /// Returns the member's fitness as of the last evaluation pass.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub(crate) fn genome_mut(&mut self) -> &mut G {
        &mut self.genome
    }

    pub(crate) fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

/// The authoritative id → member mapping for one generation.
///
/// Iteration follows insertion order, which keeps speciation and
/// selection deterministic under a fixed seed. Niches reference
/// entries by id only; this table is the sole owner of genome data.
#[derive(Clone, Debug)]
pub(crate) struct MemberTable<G> {
    members: Vec<Member<G>>,
    index: AHashMap<Uuid, usize>,
}

impl<G> MemberTable<G> {
    pub(crate) fn with_capacity(capacity: usize) -> MemberTable<G> {
        MemberTable {
            members: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, member: Member<G>) {
        self.index.insert(member.id, self.members.len());
        self.members.push(member);
    }

    pub(crate) fn get(&self, id: Uuid) -> Option<&Member<G>> {
        self.index.get(&id).map(|&i| &self.members[i])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Member<G>> {
        self.members.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Member<G>> {
        self.members.iter_mut()
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn slice_mut(&mut self) -> &mut [Member<G>] {
        &mut self.members
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }
}
