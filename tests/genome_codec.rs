use cropgen::config::GenomeConfig;
use cropgen::engines::generation::operators::{
    position_weighted_mutation, random_genome, two_point_crossover,
};
use cropgen::engines::generation::{Aggregation, Encoding, Genome, TraitConfig, TraitSet};
use cropgen::types::TraitKind;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn weighted_set(weights: Vec<f64>) -> TraitSet {
    let loci = weights.len();
    let configs = TraitKind::ALL
        .iter()
        .map(|&kind| {
            TraitConfig::new(
                kind,
                (0..loci).collect(),
                Aggregation::WeightedDot {
                    weights: weights.clone(),
                },
                Encoding::Binary,
            )
        })
        .collect();
    TraitSet::new(Encoding::Binary, loci, configs).unwrap()
}

#[test]
fn test_decode_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(21);
    let set = TraitSet::generate(&GenomeConfig::default(), &mut rng).unwrap();
    for _ in 0..20 {
        let genome = random_genome(set.genome_bits(), &mut rng);
        assert_eq!(set.decode(&genome), set.decode(&genome));
    }
}

#[test]
fn test_decoded_traits_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(5);
    for config in [GenomeConfig::default(), GenomeConfig::weighted()] {
        let set = TraitSet::generate(&config, &mut rng).unwrap();
        let extremes: Vec<Genome> = vec![
            vec![0; set.genome_bits()],
            vec![1; set.genome_bits()],
            random_genome(set.genome_bits(), &mut rng),
        ];
        for genome in &extremes {
            let traits = set.decode(genome);
            for kind in TraitKind::ALL {
                let (lo, hi) = kind.value_range();
                let value = traits.get(kind);
                assert!(value >= lo && value <= hi, "{} = {}", kind.as_str(), value);
            }
        }
    }
}

#[test]
fn test_zero_weights_decode_to_midpoint() {
    let set = weighted_set(vec![0.0; 16]);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..10 {
        let genome = random_genome(16, &mut rng);
        let traits = set.decode(&genome);
        for kind in TraitKind::ALL {
            let (lo, hi) = kind.value_range();
            assert!((traits.get(kind) - (lo + hi) / 2.0).abs() < 1e-9);
        }
    }
}

#[test]
fn test_weighted_extremes_hit_range_ends() {
    // Positive weights on set bits, negative on clear bits
    let set = weighted_set(vec![1.0, -2.0, 0.5]);
    let best: Genome = vec![1, 0, 1];
    let worst: Genome = vec![0, 1, 0];
    let high = set.decode(&best);
    let low = set.decode(&worst);
    assert_eq!(high.leaf_angle, 180.0);
    assert_eq!(low.leaf_angle, 0.0);
    assert_eq!(high.allocation_ratio, 0.9);
    assert_eq!(low.allocation_ratio, 0.5);
}

#[test]
fn test_classic_sum_spans_value_range() {
    let mut rng = StdRng::seed_from_u64(13);
    let set = TraitSet::generate(&GenomeConfig::default(), &mut rng).unwrap();
    assert_eq!(set.configs()[0].aggregation, Aggregation::Sum);
    assert_eq!(set.configs()[3].aggregation, Aggregation::Median);

    let zeros = set.decode(&vec![0; set.genome_bits()]);
    let ones = set.decode(&vec![1; set.genome_bits()]);
    assert_eq!(zeros.allocation_ratio, 0.5);
    assert_eq!(ones.allocation_ratio, 0.9);
    assert_eq!(zeros.thermal_tolerance, 0.0);
    assert_eq!(ones.thermal_tolerance, 5.0);
}

#[test]
fn test_operators_preserve_length() {
    let mut rng = StdRng::seed_from_u64(17);
    for bits in [3, 10, 100, 800] {
        let a = random_genome(bits, &mut rng);
        let b = random_genome(bits, &mut rng);
        let child = two_point_crossover(&a, &b, &mut rng);
        assert_eq!(child.len(), bits);
        for encoding in [Encoding::Binary, Encoding::Ternary] {
            assert_eq!(
                position_weighted_mutation(&child, 0.2, encoding, &mut rng).len(),
                bits
            );
        }
    }
}

#[test]
fn test_late_loci_mutate_more_often() {
    let mut rng = StdRng::seed_from_u64(99);
    let bits = 200;
    let genome: Genome = vec![0; bits];
    let mut early = 0;
    let mut late = 0;
    for _ in 0..500 {
        let mutated = position_weighted_mutation(&genome, 0.1, Encoding::Binary, &mut rng);
        early += mutated[..20].iter().filter(|&&b| b == 1).count();
        late += mutated[bits - 20..].iter().filter(|&&b| b == 1).count();
    }
    assert!(late > early);
}
