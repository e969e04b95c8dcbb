use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::Member;
use super::niche::Niche;

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// All fields are NaN for an empty sequence.
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: f64::NAN,
                minimum: f64::NAN,
                mean: f64::NAN,
                median: f64::NAN,
            };
        }
        data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let sum: f64 = data.iter().sum();
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: sum / data.len() as f64,
            median,
        }
    }
}

/// Per-niche snapshot included in a generation report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NicheSummary {
    pub id: Uuid,
    pub age: usize,
    pub size: usize,
    pub total_adjusted_fitness: f64,
    pub best_fitness: f64,
}

impl From<&Niche> for NicheSummary {
    fn from(niche: &Niche) -> NicheSummary {
        NicheSummary {
            id: niche.id(),
            age: niche.age(),
            size: niche.len(),
            total_adjusted_fitness: niche.total_adjusted_fitness(),
            best_fitness: niche.best().map(|m| m.fitness).unwrap_or(0.0),
        }
    }
}

/// A snapshot of a completed generation, delivered to the report
/// callback after each Speciating pass. Read-only downstream.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationReport<G> {
    generation: usize,
    best: Member<G>,
    fitness: Stats,
    niches: Vec<NicheSummary>,
}

impl<G> GenerationReport<G> {
    pub(crate) fn new(
        generation: usize,
        best: Member<G>,
        fitness: Stats,
        niches: Vec<NicheSummary>,
    ) -> GenerationReport<G> {
        GenerationReport {
            generation,
            best,
            fitness,
            niches,
        }
    }

    /// Returns the zero-based index of the reported generation.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns a snapshot of the generation's best member.
    pub fn best(&self) -> &Member<G> {
        &self.best
    }

    /// Returns the generation's best fitness.
    pub fn best_fitness(&self) -> f64 {
        self.best.fitness()
    }

    /// Returns fitness statistics over the whole generation.
    pub fn fitness(&self) -> &Stats {
        &self.fitness
    }

    /// Returns the niche snapshot taken after fitness sharing.
    pub fn niches(&self) -> &[NicheSummary] {
        &self.niches
    }
}

impl<G> fmt::Display for GenerationReport<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: best fitness {:.4}, mean {:.4}, {} niches",
            self.generation,
            self.best.fitness(),
            self.fitness.mean,
            self.niches.len()
        )
    }
}

/// A log of generation reports accumulated over a run, for post-run
/// inspection of the population's trajectory.
#[derive(Clone, Debug)]
pub struct ReportLog<G> {
    reports: Vec<GenerationReport<G>>,
}

impl<G> ReportLog<G> {
    pub fn new() -> ReportLog<G> {
        ReportLog {
            reports: Vec::new(),
        }
    }

    pub fn record(&mut self, report: GenerationReport<G>) {
        self.reports.push(report);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenerationReport<G>> {
        self.reports.iter()
    }

    pub fn last(&self) -> Option<&GenerationReport<G>> {
        self.reports.last()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl<G> Default for ReportLog<G> {
    fn default() -> ReportLog<G> {
        ReportLog::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_summarize_a_sequence() {
        let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
        assert_eq!(stats.maximum, 1.5);
        assert_eq!(stats.minimum, -2.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.median, 0.5);
    }

    #[test]
    fn stats_median_averages_middle_pair_for_even_counts() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn stats_of_empty_sequence_are_nan() {
        let stats = Stats::from(std::iter::empty::<f64>());
        assert!(stats.maximum.is_nan());
        assert!(stats.median.is_nan());
    }
}
