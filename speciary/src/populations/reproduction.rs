use std::cmp::Ordering;

use ahash::AHashMap;
use log::info;
use rand::rngs::StdRng;
use rand::Rng;
use uuid::Uuid;

use super::config::PopulationSettings;
use super::control::PopulationControl;
use super::errors::EvolutionError;
use super::member::{Member, MemberTable};
use super::niche::Niche;
use crate::Genome;

/// Auxiliary type for offspring generation. Handles the tasks of
/// rebuilding the member table for the next generation according to
/// the settings and the chosen parent strategy.
pub(crate) struct OffspringFactory<'a, G: Genome> {
    table: &'a MemberTable<G>,
    env: &'a mut G::Environment,
    settings: &'a PopulationSettings,
    rng: &'a mut StdRng,
}

impl<'a, G: Genome> OffspringFactory<'a, G> {
    pub(crate) fn new(
        table: &'a MemberTable<G>,
        env: &'a mut G::Environment,
        settings: &'a PopulationSettings,
        rng: &'a mut StdRng,
    ) -> OffspringFactory<'a, G> {
        OffspringFactory {
            table,
            env,
            settings,
            rng,
        }
    }

    /// Builds the next generation's member table at exactly
    /// `settings.size` members.
    ///
    /// Survivors keep their identifiers. Each niche's weakest
    /// `clean_pct` fraction is removed from the breeding pool first,
    /// and once the global stagnation count exceeds the limit all but
    /// the top-performing niche are culled to force exploration. The
    /// remaining slots are filled by crossover (gated by
    /// `crossover_rate`) or by cloning the fitter parent; every new
    /// genome receives one self-mutation call and a fresh identifier.
    pub(crate) fn fill_generation(
        &mut self,
        mut survivors: Vec<Member<G>>,
        niches: &mut Vec<Niche>,
        anchors: &mut AHashMap<Uuid, G>,
        control: &PopulationControl,
    ) -> Result<MemberTable<G>, EvolutionError> {
        for niche in niches.iter_mut() {
            niche.cull_weakest(self.settings.clean_pct);
        }

        if control.stagnation_count > self.settings.stagnation_limit && niches.len() > 1 {
            prune_stagnated(niches, anchors);
        }
        if niches.is_empty() {
            return Err(EvolutionError::PopulationCollapse);
        }

        // More survivors than the target size: drop the weakest first.
        if survivors.len() > self.settings.size {
            survivors.sort_by(|a, b| {
                b.fitness()
                    .partial_cmp(&a.fitness())
                    .unwrap_or(Ordering::Equal)
            });
            survivors.truncate(self.settings.size);
        }

        let mut next = MemberTable::with_capacity(self.settings.size);
        for survivor in survivors {
            next.insert(survivor);
        }

        while next.len() < self.settings.size {
            let (first, second) = self.settings.parent_selection.pick(
                self.settings.inbreed_rate,
                niches,
                &mut *self.rng,
            )?;
            let parent_a = self
                .table
                .get(first)
                .ok_or(EvolutionError::MissingParent(first))?;
            let parent_b = self
                .table
                .get(second)
                .ok_or(EvolutionError::MissingParent(second))?;

            let mut genome = if self.rng.gen::<f64>() < self.settings.crossover_rate {
                parent_a.genome().crossover(
                    parent_b.genome(),
                    self.env,
                    self.settings.crossover_rate,
                    &mut *self.rng,
                )
            } else if parent_b.fitness() > parent_a.fitness() {
                parent_b.genome().clone()
            } else {
                parent_a.genome().clone()
            };
            genome.mutate(self.env, &mut *self.rng);
            next.insert(Member::new(genome));
        }

        Ok(next)
    }
}

/// Culls all niches but the one with the highest adjusted-fitness
/// total, dropping their mascot anchors with them.
fn prune_stagnated<G>(niches: &mut Vec<Niche>, anchors: &mut AHashMap<Uuid, G>) {
    let mut best = 0;
    for (i, niche) in niches.iter().enumerate() {
        if niche.total_adjusted_fitness() > niches[best].total_adjusted_fitness() {
            best = i;
        }
    }
    let kept = niches.swap_remove(best);
    info!(
        "stagnation pruning: culling {} niches, keeping niche {}",
        niches.len(),
        kept.id()
    );
    for niche in niches.iter() {
        anchors.remove(&niche.id());
    }
    niches.clear();
    niches.push(kept);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::populations::selection::{ParentSelection, SurvivorSelection};
    use crate::populations::testing::ScalarGenome;
    use rand::SeedableRng;

    fn setup(values: &[f64]) -> (MemberTable<ScalarGenome>, Vec<Niche>, AHashMap<Uuid, ScalarGenome>) {
        let mut table = MemberTable::with_capacity(values.len());
        let mut niche = None;
        for &v in values {
            let mut member = Member::new(ScalarGenome(v));
            member.set_fitness(v);
            match &mut niche {
                None => niche = Some(Niche::new(member.id(), v)),
                Some(n) => n.insert(member.id(), v),
            }
            table.insert(member);
        }
        let mut niche = niche.unwrap();
        niche.share_fitness();
        let mut anchors = AHashMap::new();
        anchors.insert(niche.id(), ScalarGenome(values[0]));
        (table, vec![niche], anchors)
    }

    fn settings(size: usize) -> PopulationSettings {
        PopulationSettings {
            size,
            clean_pct: 0.0,
            crossover_rate: 1.0,
            parent_selection: ParentSelection::BiasedRandom,
            survivor_selection: SurvivorSelection::Fittest,
            ..PopulationSettings::default()
        }
    }

    #[test]
    fn next_generation_reaches_exact_target_size() {
        let (table, mut niches, mut anchors) = setup(&[1.0, 2.0, 3.0]);
        let settings = settings(10);
        let control = PopulationControl::new(&settings, 0.1);
        let mut env = ();
        let mut rng = StdRng::seed_from_u64(5);

        let survivors = settings.survivor_selection.pick(&table, &niches);
        let next = OffspringFactory::new(&table, &mut env, &settings, &mut rng)
            .fill_generation(survivors, &mut niches, &mut anchors, &control)
            .unwrap();

        assert_eq!(next.len(), 10);
    }

    #[test]
    fn survivors_keep_their_identifiers() {
        let (table, mut niches, mut anchors) = setup(&[1.0, 5.0, 3.0]);
        let best_id = niches[0].best().unwrap().id;
        let settings = settings(6);
        let control = PopulationControl::new(&settings, 0.1);
        let mut env = ();
        let mut rng = StdRng::seed_from_u64(6);

        let survivors = settings.survivor_selection.pick(&table, &niches);
        let next = OffspringFactory::new(&table, &mut env, &settings, &mut rng)
            .fill_generation(survivors, &mut niches, &mut anchors, &control)
            .unwrap();

        let carried = next.get(best_id).unwrap();
        assert_eq!(carried.fitness(), 5.0);
        assert_eq!(carried.genome().0, 5.0);
    }

    #[test]
    fn excess_survivors_are_truncated_weakest_first() {
        let (table, mut niches, mut anchors) = setup(&[1.0, 5.0, 3.0, 4.0]);
        let settings = settings(2);
        let control = PopulationControl::new(&settings, 0.1);
        let mut env = ();
        let mut rng = StdRng::seed_from_u64(7);

        let survivors: Vec<Member<ScalarGenome>> = table.iter().cloned().collect();
        let next = OffspringFactory::new(&table, &mut env, &settings, &mut rng)
            .fill_generation(survivors, &mut niches, &mut anchors, &control)
            .unwrap();

        assert_eq!(next.len(), 2);
        let mut kept: Vec<f64> = next.iter().map(Member::fitness).collect();
        kept.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(kept, vec![4.0, 5.0]);
    }

    #[test]
    fn stagnation_pruning_keeps_only_the_best_niche() {
        let (table, mut niches, mut anchors) = setup(&[1.0, 2.0]);
        // A second, fitter niche.
        let mut member = Member::new(ScalarGenome(9.0));
        member.set_fitness(9.0);
        let mut strong = Niche::new(member.id(), 9.0);
        strong.share_fitness();
        anchors.insert(strong.id(), ScalarGenome(9.0));
        let strong_id = strong.id();
        let mut table = table;
        table.insert(member);
        niches.push(strong);

        let settings = PopulationSettings {
            stagnation_limit: 1,
            ..settings(4)
        };
        let mut control = PopulationControl::new(&settings, 0.1);
        control.stagnation_count = 2;
        let mut env = ();
        let mut rng = StdRng::seed_from_u64(8);

        let survivors = settings.survivor_selection.pick(&table, &niches);
        OffspringFactory::new(&table, &mut env, &settings, &mut rng)
            .fill_generation(survivors, &mut niches, &mut anchors, &control)
            .unwrap();

        assert_eq!(niches.len(), 1);
        assert_eq!(niches[0].id(), strong_id);
        assert_eq!(anchors.len(), 1);
        assert!(anchors.contains_key(&strong_id));
    }

    #[test]
    fn clone_path_duplicates_the_fitter_parent() {
        let (table, mut niches, mut anchors) = setup(&[1.0, 4.0]);
        let settings = PopulationSettings {
            crossover_rate: 0.0,
            ..settings(4)
        };
        let control = PopulationControl::new(&settings, 0.1);
        let mut env = ();
        let mut rng = StdRng::seed_from_u64(9);

        let next = OffspringFactory::new(&table, &mut env, &settings, &mut rng)
            .fill_generation(Vec::new(), &mut niches, &mut anchors, &control)
            .unwrap();

        // ScalarGenome::mutate nudges by at most 0.1, so every clone
        // stays near one of the two parent values.
        for member in next.iter() {
            let v = member.genome().0;
            assert!((v - 1.0).abs() <= 0.1 || (v - 4.0).abs() <= 0.1);
        }
    }
}
