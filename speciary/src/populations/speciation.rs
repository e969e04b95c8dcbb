use ahash::AHashMap;
use log::debug;
use uuid::Uuid;

use super::config::PopulationSettings;
use super::control::PopulationControl;
use super::errors::EvolutionError;
use super::member::MemberTable;
use super::niche::Niche;
use crate::Genome;

/// Assigns every member of the table to exactly one niche.
///
/// Members are scanned in table insertion order; each is placed into
/// the first existing niche whose mascot anchor lies within
/// `control.distance` (first fit, not nearest fit), or founds a new
/// niche with itself as mascot. Niches left empty after assignment are
/// removed. With `dynamic_distance` enabled the threshold is then
/// nudged one `distance_precision` step toward `species_target`; the
/// niche count converges over generations, not within one.
pub(crate) fn speciate<G: Genome>(
    table: &MemberTable<G>,
    niches: &mut Vec<Niche>,
    anchors: &mut AHashMap<Uuid, G>,
    control: &mut PopulationControl,
    settings: &PopulationSettings,
    env: &G::Environment,
) -> Result<(), EvolutionError> {
    for member in table.iter() {
        let mut target = None;
        for (i, niche) in niches.iter().enumerate() {
            let anchor = &anchors[&niche.id()];
            let distance = member.genome().distance(anchor, env);
            if !distance.is_finite() {
                return Err(EvolutionError::InvalidDistance {
                    member: member.id(),
                    niche: niche.id(),
                });
            }
            if distance <= control.distance {
                target = Some(i);
                break;
            }
        }
        match target {
            Some(i) => niches[i].insert(member.id(), member.fitness()),
            None => {
                let niche = Niche::new(member.id(), member.fitness());
                anchors.insert(niche.id(), member.genome().clone());
                niches.push(niche);
            }
        }
    }

    niches.retain(|niche| {
        if niche.is_empty() {
            debug!("niche {} attracted no members and goes extinct", niche.id());
            anchors.remove(&niche.id());
            false
        } else {
            true
        }
    });

    if settings.dynamic_distance {
        let count = niches.len();
        if count > settings.species_target {
            control.distance += control.distance_precision;
            debug!(
                "{} niches for a target of {}; threshold raised to {}",
                count, settings.species_target, control.distance
            );
        } else if count < settings.species_target {
            control.distance = (control.distance - control.distance_precision)
                .max(PopulationControl::DISTANCE_FLOOR);
            debug!(
                "{} niches for a target of {}; threshold lowered to {}",
                count, settings.species_target, control.distance
            );
        }
    }

    Ok(())
}
