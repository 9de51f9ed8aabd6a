use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::Occurrence;

/// Caps the number of occurrences scored per term.
///
/// Owns the run's seeded generator; terms must be sampled in a fixed order
/// for a run to be reproducible.
#[derive(Debug, Clone)]
pub struct OccurrenceSampler {
    max_samples: usize,
    rng: StdRng,
}

impl OccurrenceSampler {
    pub fn new(max_samples: usize, seed: u64) -> Self {
        Self {
            max_samples,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Return `occurrences` unchanged when within the cap, otherwise a
    /// uniform subset of exactly `max_samples` drawn without replacement.
    pub fn sample(&mut self, occurrences: &[Occurrence]) -> Vec<Occurrence> {
        if occurrences.len() <= self.max_samples {
            return occurrences.to_vec();
        }

        rand::seq::index::sample(&mut self.rng, occurrences.len(), self.max_samples)
            .into_iter()
            .map(|i| occurrences[i].clone())
            .collect()
    }
}
