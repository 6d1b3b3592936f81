use super::traits::ConfigSection;
use crate::engines::generation::genome::Encoding;
use crate::error::CropError;
use serde::{Deserialize, Serialize};

/// How trait configs are generated at the start of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationScheme {
    /// Random SNP subsets aggregated by sum, mean, max and median
    Classic,
    /// Every locus weighted by a Gaussian coefficient
    Weighted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenomeConfig {
    pub encoding: Encoding,
    pub scheme: AggregationScheme,
    /// Loci per genome; bit length is `loci * encoding.bits_per_locus()`
    pub loci: usize,
    /// Loci sampled from when building a classic trait config
    pub snp_pool: usize,
    pub snps_per_trait: usize,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::Ternary,
            scheme: AggregationScheme::Classic,
            loci: 400,
            snp_pool: 200,
            snps_per_trait: 100,
        }
    }
}

impl GenomeConfig {
    /// Binary genome of 100 loci with Gaussian-weighted traits
    pub fn weighted() -> Self {
        Self {
            encoding: Encoding::Binary,
            scheme: AggregationScheme::Weighted,
            loci: 100,
            snp_pool: 100,
            snps_per_trait: 100,
        }
    }

    pub fn genome_bits(&self) -> usize {
        self.loci * self.encoding.bits_per_locus()
    }
}

impl ConfigSection for GenomeConfig {
    fn section_name() -> &'static str {
        "genome"
    }

    fn validate(&self) -> Result<(), CropError> {
        if self.loci < 2 {
            return Err(CropError::Configuration(
                "Genome needs at least two loci for crossover".to_string(),
            ));
        }
        if self.scheme == AggregationScheme::Classic {
            if self.snp_pool > self.loci {
                return Err(CropError::Configuration(format!(
                    "SNP pool ({}) exceeds locus count ({})",
                    self.snp_pool, self.loci
                )));
            }
            if self.snps_per_trait == 0 || self.snps_per_trait > self.snp_pool {
                return Err(CropError::Configuration(format!(
                    "SNPs per trait must be in 1..={}, got {}",
                    self.snp_pool, self.snps_per_trait
                )));
            }
        }
        Ok(())
    }
}
