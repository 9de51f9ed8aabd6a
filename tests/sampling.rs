use std::collections::HashSet;

use lexsub::data::Occurrence;
use lexsub::pipelines::substitution::OccurrenceSampler;

fn pool(n: usize) -> Vec<Occurrence> {
    (0..n).map(|i| Occurrence::new(i as i64, i % 7)).collect()
}

#[test]
fn pool_within_cap_is_unchanged() {
    let occurrences = pool(5);
    let mut sampler = OccurrenceSampler::new(5, 42);
    assert_eq!(sampler.sample(&occurrences), occurrences);
}

#[test]
fn pool_above_cap_is_sampled_without_replacement() {
    let occurrences = pool(100);
    let mut sampler = OccurrenceSampler::new(10, 42);

    let sampled = sampler.sample(&occurrences);
    assert_eq!(sampled.len(), 10);

    let unique: HashSet<&Occurrence> = sampled.iter().collect();
    assert_eq!(unique.len(), 10);
    assert!(sampled.iter().all(|o| occurrences.contains(o)));
}

#[test]
fn same_seed_same_subset() {
    let occurrences = pool(50);

    let mut first = OccurrenceSampler::new(8, 1234);
    let mut second = OccurrenceSampler::new(8, 1234);
    assert_eq!(first.sample(&occurrences), second.sample(&occurrences));

    // generator state carries over between terms in the same way
    assert_eq!(first.sample(&occurrences), second.sample(&occurrences));
}
