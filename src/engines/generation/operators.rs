use crate::engines::generation::genome::{Encoding, Genome};
use rand::seq::index;
use rand::Rng;

/// Generate random genome of `length` bits
pub fn random_genome<R: Rng>(length: usize, rng: &mut R) -> Genome {
    (0..length).map(|_| rng.gen_range(0..=1u8)).collect()
}

/// Uniform pick of two parents from the pool, with replacement
pub fn sample_parents<'a, T, R: Rng>(pool: &'a [T], rng: &mut R) -> Option<(&'a T, &'a T)> {
    if pool.is_empty() {
        return None;
    }
    let first = &pool[rng.gen_range(0..pool.len())];
    let second = &pool[rng.gen_range(0..pool.len())];
    Some((first, second))
}

/// Two different members of the pool; a single-member pool pairs with itself
pub fn sample_distinct_parents<'a, T, R: Rng>(
    pool: &'a [T],
    rng: &mut R,
) -> Option<(&'a T, &'a T)> {
    match pool.len() {
        0 => None,
        1 => Some((&pool[0], &pool[0])),
        len => {
            let picked = index::sample(rng, len, 2);
            Some((&pool[picked.index(0)], &pool[picked.index(1)]))
        }
    }
}

/// Two-point crossover: the child takes `parent2` between two distinct cut
/// points and `parent1` elsewhere
pub fn two_point_crossover<R: Rng>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> Genome {
    let len = parent1.len().min(parent2.len());
    if len < 3 {
        return parent1.clone();
    }

    // Cut points are drawn from 1..len
    let cuts = index::sample(rng, len - 1, 2);
    let (a, b) = {
        let (x, y) = (cuts.index(0) + 1, cuts.index(1) + 1);
        (x.min(y), x.max(y))
    };

    let mut child = parent1.clone();
    child[a..b].copy_from_slice(&parent2[a..b]);
    child
}

/// Flip whole loci; the chance grows linearly from `base_rate` at the first
/// bit to nearly `2 * base_rate` at the last
pub fn position_weighted_mutation<R: Rng>(
    genome: &Genome,
    base_rate: f64,
    encoding: Encoding,
    rng: &mut R,
) -> Genome {
    let mut mutated = genome.clone();
    let len = genome.len();
    let width = encoding.bits_per_locus();

    for start in (0..len).step_by(width) {
        let probability = base_rate * (1.0 + start as f64 / len as f64);
        if rng.gen::<f64>() < probability {
            let end = (start + width).min(len);
            for bit in &mut mutated[start..end] {
                *bit ^= 1;
            }
        }
    }

    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_genome_is_binary() {
        let mut rng = StdRng::seed_from_u64(3);
        let genome = random_genome(500, &mut rng);
        assert_eq!(genome.len(), 500);
        assert!(genome.iter().all(|&b| b <= 1));
        assert!(genome.iter().any(|&b| b == 1));
    }

    #[test]
    fn test_crossover_keeps_outer_segments_of_first_parent() {
        let mut rng = StdRng::seed_from_u64(11);
        let p1: Genome = vec![0; 50];
        let p2: Genome = vec![1; 50];
        for _ in 0..100 {
            let child = two_point_crossover(&p1, &p2, &mut rng);
            assert_eq!(child.len(), 50);
            assert_eq!(child[0], 0);
            assert_eq!(child[49], 0);
            // One contiguous block from the second parent
            let switches = child.windows(2).filter(|w| w[0] != w[1]).count();
            assert_eq!(switches, 2);
        }
    }

    #[test]
    fn test_short_genomes_are_copied() {
        let mut rng = StdRng::seed_from_u64(1);
        let child = two_point_crossover(&vec![1, 0], &vec![0, 1], &mut rng);
        assert_eq!(child, vec![1, 0]);
    }

    #[test]
    fn test_mutation_flips_whole_ternary_loci() {
        let mut rng = StdRng::seed_from_u64(5);
        let genome: Genome = vec![0; 40];
        let mutated = position_weighted_mutation(&genome, 0.5, Encoding::Ternary, &mut rng);
        assert_eq!(mutated.len(), 40);
        assert!(mutated.chunks(2).all(|locus| locus[0] == locus[1]));
        assert_eq!(genome, vec![0; 40]);
    }

    #[test]
    fn test_zero_rate_never_mutates() {
        let mut rng = StdRng::seed_from_u64(9);
        let genome = random_genome(64, &mut rng);
        assert_eq!(
            position_weighted_mutation(&genome, 0.0, Encoding::Binary, &mut rng),
            genome
        );
    }

    #[test]
    fn test_parent_sampling() {
        let mut rng = StdRng::seed_from_u64(2);
        let pool = [1, 2, 3];
        let empty: [i32; 0] = [];
        assert!(sample_parents(&empty, &mut rng).is_none());
        for _ in 0..50 {
            let (a, b) = sample_distinct_parents(&pool, &mut rng).unwrap();
            assert_ne!(a, b);
        }
        assert_eq!(sample_distinct_parents(&[7], &mut rng), Some((&7, &7)));
    }
}
