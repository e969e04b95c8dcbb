use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::EvolutionError;
use super::member::{Member, MemberTable};
use super::niche::{Niche, NicheMember};

/// Strategies for choosing the two parents of an offspring.
///
/// The strategy set is closed; dispatch happens over this enum rather
/// than a trait object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentSelection {
    /// Two niches drawn uniformly at random, each contributing its
    /// best-fitness member. The same niche may be drawn twice.
    BestInSpecies,
    /// Fitness-proportionate draws over niche totals and member
    /// adjusted fitness, with an `inbreed_rate` chance of taking both
    /// parents from a single niche.
    BiasedRandom,
}

impl ParentSelection {
    /// Picks a pair of parent identifiers out of the niche list.
    ///
    /// Niches holding a single member may contribute the same member
    /// twice. An empty niche list is a fatal precondition failure.
    pub(crate) fn pick(
        self,
        inbreed_rate: f64,
        niches: &[Niche],
        rng: &mut impl Rng,
    ) -> Result<(Uuid, Uuid), EvolutionError> {
        if niches.is_empty() {
            return Err(EvolutionError::PopulationCollapse);
        }
        match self {
            ParentSelection::BestInSpecies => {
                let first = champion_id(uniform_niche(niches, rng))?;
                let second = champion_id(uniform_niche(niches, rng))?;
                Ok((first, second))
            }
            ParentSelection::BiasedRandom => {
                if rng.gen::<f64>() < inbreed_rate {
                    let niche = proportionate_niche(niches, rng);
                    let first = proportionate_member(niche, rng)?.id;
                    let second = proportionate_member(niche, rng)?.id;
                    Ok((first, second))
                } else {
                    let first = {
                        let niche = proportionate_niche(niches, rng);
                        proportionate_member(niche, rng)?.id
                    };
                    let second = {
                        let niche = proportionate_niche(niches, rng);
                        proportionate_member(niche, rng)?.id
                    };
                    Ok((first, second))
                }
            }
        }
    }
}

impl FromStr for ParentSelection {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<ParentSelection, Self::Err> {
        match s {
            "best-in-species" => Ok(ParentSelection::BestInSpecies),
            "biased-random" => Ok(ParentSelection::BiasedRandom),
            other => Err(EvolutionError::UnknownParentSelection(other.to_string())),
        }
    }
}

/// Strategies for choosing which members persist unmodified into the
/// next generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurvivorSelection {
    /// The best-fitness member of every niche is carried forward with
    /// its identifier and genome intact, so the best-known genome per
    /// lineage never regresses.
    Fittest,
}

impl SurvivorSelection {
    /// Picks the members carried unmodified into the next generation.
    pub(crate) fn pick<G: Clone>(self, table: &MemberTable<G>, niches: &[Niche]) -> Vec<Member<G>> {
        match self {
            SurvivorSelection::Fittest => niches
                .iter()
                .filter_map(Niche::best)
                .filter_map(|m| table.get(m.id))
                .cloned()
                .collect(),
        }
    }
}

impl FromStr for SurvivorSelection {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<SurvivorSelection, Self::Err> {
        match s {
            "fittest" => Ok(SurvivorSelection::Fittest),
            other => Err(EvolutionError::UnknownSurvivorSelection(other.to_string())),
        }
    }
}

fn uniform_niche<'a>(niches: &'a [Niche], rng: &mut impl Rng) -> &'a Niche {
    &niches[rng.gen_range(0..niches.len())]
}

fn champion_id(niche: &Niche) -> Result<Uuid, EvolutionError> {
    niche
        .best()
        .map(|m| m.id)
        .ok_or(EvolutionError::PopulationCollapse)
}

/// Fitness-proportionate draw over niche adjusted-fitness totals.
/// Accumulates weights in iteration order and falls back to the first
/// niche when the total is non-positive or floating-point drift keeps
/// the running sum below the draw.
fn proportionate_niche<'a>(niches: &'a [Niche], rng: &mut impl Rng) -> &'a Niche {
    let total: f64 = niches.iter().map(Niche::total_adjusted_fitness).sum();
    if total > 0.0 {
        let draw = rng.gen_range(0.0..total);
        let mut acc = 0.0;
        for niche in niches {
            acc += niche.total_adjusted_fitness();
            if acc >= draw {
                return niche;
            }
        }
    }
    &niches[0]
}

/// Fitness-proportionate draw over a niche's members, with the same
/// first-element fallback as [`proportionate_niche`].
fn proportionate_member<'a>(
    niche: &'a Niche,
    rng: &mut impl Rng,
) -> Result<&'a NicheMember, EvolutionError> {
    let members = niche.members();
    if members.is_empty() {
        return Err(EvolutionError::PopulationCollapse);
    }
    let total: f64 = members.iter().map(|m| m.adjusted_fitness).sum();
    if total > 0.0 {
        let draw = rng.gen_range(0.0..total);
        let mut acc = 0.0;
        for member in members {
            acc += member.adjusted_fitness;
            if acc >= draw {
                return Ok(member);
            }
        }
    }
    Ok(&members[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shared_niche(fitnesses: &[f64]) -> Niche {
        let mut niche = Niche::new(Uuid::new_v4(), fitnesses[0]);
        for &f in &fitnesses[1..] {
            niche.insert(Uuid::new_v4(), f);
        }
        niche.share_fitness();
        niche
    }

    #[test]
    fn strategies_parse_from_names() {
        assert_eq!(
            "best-in-species".parse::<ParentSelection>().unwrap(),
            ParentSelection::BestInSpecies
        );
        assert_eq!(
            "biased-random".parse::<ParentSelection>().unwrap(),
            ParentSelection::BiasedRandom
        );
        assert_eq!(
            "fittest".parse::<SurvivorSelection>().unwrap(),
            SurvivorSelection::Fittest
        );
        assert!(matches!(
            "tournament".parse::<ParentSelection>(),
            Err(EvolutionError::UnknownParentSelection(_))
        ));
        assert!(matches!(
            "oldest".parse::<SurvivorSelection>(),
            Err(EvolutionError::UnknownSurvivorSelection(_))
        ));
    }

    #[test]
    fn empty_niche_list_is_a_fatal_precondition() {
        let mut rng = StdRng::seed_from_u64(0);
        let picked = ParentSelection::BestInSpecies.pick(0.0, &[], &mut rng);
        assert!(matches!(picked, Err(EvolutionError::PopulationCollapse)));
    }

    #[test]
    fn best_in_species_returns_niche_champions() {
        let niches = vec![shared_niche(&[1.0, 9.0, 3.0])];
        let champion = niches[0].best().unwrap().id;

        let mut rng = StdRng::seed_from_u64(1);
        let (a, b) = ParentSelection::BestInSpecies
            .pick(0.0, &niches, &mut rng)
            .unwrap();
        assert_eq!(a, champion);
        assert_eq!(b, champion);
    }

    #[test]
    fn full_inbreeding_draws_both_parents_from_one_niche() {
        let niches = vec![shared_niche(&[2.0]), shared_niche(&[3.0])];
        let mut rng = StdRng::seed_from_u64(2);

        for _ in 0..20 {
            let (a, b) = ParentSelection::BiasedRandom
                .pick(1.0, &niches, &mut rng)
                .unwrap();
            let same_niche = niches
                .iter()
                .any(|n| n.members().iter().any(|m| m.id == a) && n.members().iter().any(|m| m.id == b));
            assert!(same_niche);
        }
    }

    #[test]
    fn proportionate_sampling_falls_back_on_zero_totals() {
        let niches = vec![shared_niche(&[0.0, 0.0]), shared_niche(&[0.0])];
        let mut rng = StdRng::seed_from_u64(3);
        let niche = proportionate_niche(&niches, &mut rng);
        assert_eq!(niche.id(), niches[0].id());

        let member = proportionate_member(niche, &mut rng).unwrap();
        assert_eq!(member.id, niches[0].members()[0].id);
    }

    #[test]
    fn proportionate_sampling_never_picks_beyond_the_weights() {
        // One niche holds all the adjusted fitness; it must always win.
        let niches = vec![shared_niche(&[0.0, 0.0]), shared_niche(&[5.0, 5.0])];
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let niche = proportionate_niche(&niches, &mut rng);
            assert_eq!(niche.id(), niches[1].id());
        }
    }

    #[test]
    fn fittest_survivor_carries_each_niche_champion() {
        let mut table = MemberTable::with_capacity(4);
        let mut niche = None;
        for fitness in [1.0, 4.0, 2.0] {
            let mut member = Member::new(fitness);
            member.set_fitness(fitness);
            match &mut niche {
                None => niche = Some(Niche::new(member.id(), fitness)),
                Some(n) => n.insert(member.id(), fitness),
            }
            table.insert(member);
        }
        let mut niche = niche.unwrap();
        niche.share_fitness();

        let survivors = SurvivorSelection::Fittest.pick(&table, std::slice::from_ref(&niche));
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].fitness(), 4.0);
    }
}
