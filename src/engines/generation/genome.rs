use crate::types::Traits;
use serde::{Deserialize, Serialize};

/// Genome representation for the trait optimizer
///
/// A genome is a flat sequence of bits (one `u8` per bit, 0 or 1). Bits are
/// grouped into loci according to an [`Encoding`]; each locus plays the role
/// of one SNP marker. Trait configs pick loci by index and aggregate their
/// decoded values into a continuous trait.
///
/// # Why bits instead of traits directly?
///
/// The optimizer explores trait space through the genetic architecture:
/// - **Crossover** swaps contiguous bit segments between parents
/// - **Mutation** flips whole loci, more often towards the end of the genome
/// - **Redundancy**: many genomes decode to the same trait vector, which the
///   fitness cache exploits
///
/// Genomes are never modified in place; operators return new genomes.
pub type Genome = Vec<u8>;

/// How bits map onto locus values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// Two bits per locus, value `2*b0 + b1` saturated at 2 (genotypes 0/1/2)
    Ternary,
    /// One bit per locus
    Binary,
}

impl Encoding {
    pub fn bits_per_locus(&self) -> usize {
        match self {
            Encoding::Ternary => 2,
            Encoding::Binary => 1,
        }
    }

    pub fn max_locus_value(&self) -> u8 {
        match self {
            Encoding::Ternary => 2,
            Encoding::Binary => 1,
        }
    }

    pub fn locus_count(&self, genome: &[u8]) -> usize {
        genome.len() / self.bits_per_locus()
    }

    /// Missing bits read as 0
    pub fn decode_locus(&self, genome: &[u8], locus: usize) -> u8 {
        let bit = |i: usize| genome.get(i).copied().unwrap_or(0) & 1;
        match self {
            Encoding::Ternary => (bit(locus * 2) * 2 + bit(locus * 2 + 1)).min(2),
            Encoding::Binary => bit(locus),
        }
    }
}

/// A genome with its decoded traits and simulated fitness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genome: Genome,
    pub traits: Traits,
    pub fitness: f64,
}

impl Individual {
    /// Two individuals with equal signatures are the same plant to the simulator
    pub fn same_traits(&self, other: &Individual) -> bool {
        self.traits.key() == other.traits.key()
    }
}
