//! Genome → trait decoding.
//!
//! Each trait reads an ordered set of loci, aggregates their values with an
//! [`Aggregation`] and rescales the raw aggregate linearly into the trait's
//! value range. The raw range used for rescaling is declared by the
//! aggregation itself, never inferred at runtime.

use super::genome::{Encoding, Genome};
use crate::config::{AggregationScheme, ConfigSection, GenomeConfig};
use crate::error::{CropError, Result};
use crate::types::{TraitKind, Traits};
use rand::seq::index;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

const BOUND_TOLERANCE: f64 = 1e-9;
const DECIMALS: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Mean,
    Max,
    Median,
    /// Weighted linear combination, one weight per locus
    WeightedDot { weights: Vec<f64> },
}

impl Aggregation {
    pub fn apply(&self, loci: &[u8]) -> f64 {
        if loci.is_empty() {
            return 0.0;
        }
        let values = loci.iter().map(|&v| v as f64);
        match self {
            Aggregation::Sum => values.sum(),
            Aggregation::Mean => values.sum::<f64>() / loci.len() as f64,
            Aggregation::Max => values.fold(f64::MIN, f64::max),
            Aggregation::Median => {
                let mut sorted = loci.to_vec();
                sorted.sort_unstable();
                let mid = sorted.len() / 2;
                if sorted.len() % 2 == 0 {
                    (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
                } else {
                    sorted[mid] as f64
                }
            }
            Aggregation::WeightedDot { weights } => {
                values.zip(weights).map(|(v, w)| v * w).sum()
            }
        }
    }

    /// Theoretical raw range over `n` loci whose values lie in `0..=max_locus`
    pub fn raw_bounds(&self, n: usize, max_locus: f64) -> (f64, f64) {
        match self {
            Aggregation::Sum => (0.0, max_locus * n as f64),
            Aggregation::Mean | Aggregation::Max | Aggregation::Median => (0.0, max_locus),
            Aggregation::WeightedDot { weights } => weights.iter().fold((0.0, 0.0), |(lo, hi), w| {
                (lo + (w * max_locus).min(0.0), hi + (w * max_locus).max(0.0))
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Mean => "mean",
            Aggregation::Max => "max",
            Aggregation::Median => "median",
            Aggregation::WeightedDot { .. } => "weighted",
        }
    }
}

/// Linear map of `raw` from `from` onto `to`, clamped at both ends.
/// A zero-width source range maps onto the midpoint of `to`.
pub fn rescale(raw: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lo, hi) = from;
    let (out_lo, out_hi) = to;
    if (hi - lo).abs() <= BOUND_TOLERANCE {
        return (out_lo + out_hi) / 2.0;
    }
    let t = ((raw - lo) / (hi - lo)).clamp(0.0, 1.0);
    out_lo + t * (out_hi - out_lo)
}

pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitConfig {
    pub kind: TraitKind,
    pub snp_indices: Vec<usize>,
    pub aggregation: Aggregation,
    pub value_range: (f64, f64),
    /// Raw aggregate mapped onto `value_range`
    pub raw_bounds: (f64, f64),
}

impl TraitConfig {
    /// Raw bounds follow the aggregation's theoretical range
    pub fn new(
        kind: TraitKind,
        snp_indices: Vec<usize>,
        aggregation: Aggregation,
        encoding: Encoding,
    ) -> Self {
        let raw_bounds =
            aggregation.raw_bounds(snp_indices.len(), encoding.max_locus_value() as f64);
        Self {
            kind,
            snp_indices,
            aggregation,
            value_range: kind.value_range(),
            raw_bounds,
        }
    }

    pub fn with_raw_bounds(mut self, raw_bounds: (f64, f64)) -> Self {
        self.raw_bounds = raw_bounds;
        self
    }

    pub fn with_value_range(mut self, value_range: (f64, f64)) -> Self {
        self.value_range = value_range;
        self
    }

    pub fn raw_value(&self, genome: &[u8], encoding: Encoding) -> f64 {
        let loci: Vec<u8> = self
            .snp_indices
            .iter()
            .map(|&i| encoding.decode_locus(genome, i))
            .collect();
        self.aggregation.apply(&loci)
    }

    pub fn decode(&self, genome: &[u8], encoding: Encoding) -> f64 {
        let raw = self.raw_value(genome, encoding);
        round_decimals(rescale(raw, self.raw_bounds, self.value_range), DECIMALS)
    }

    /// Checks that every reachable raw value falls inside the declared bounds
    pub fn validate(&self, encoding: Encoding, loci: usize) -> Result<()> {
        let name = self.kind.as_str();
        if self.snp_indices.is_empty() {
            return Err(CropError::Genome(format!("{} reads no loci", name)));
        }
        if let Some(&bad) = self.snp_indices.iter().find(|&&i| i >= loci) {
            return Err(CropError::Genome(format!(
                "{} reads locus {} but the genome has {} loci",
                name, bad, loci
            )));
        }
        if let Aggregation::WeightedDot { weights } = &self.aggregation {
            if weights.len() != self.snp_indices.len() {
                return Err(CropError::Genome(format!(
                    "{} has {} weights for {} loci",
                    name,
                    weights.len(),
                    self.snp_indices.len()
                )));
            }
        }
        let (lo, hi) = self.value_range;
        if lo > hi {
            return Err(CropError::Genome(format!(
                "{} value range [{}, {}] is inverted",
                name, lo, hi
            )));
        }
        let (reach_lo, reach_hi) = self
            .aggregation
            .raw_bounds(self.snp_indices.len(), encoding.max_locus_value() as f64);
        let (raw_lo, raw_hi) = self.raw_bounds;
        if raw_lo > reach_lo + BOUND_TOLERANCE || raw_hi < reach_hi - BOUND_TOLERANCE {
            return Err(CropError::Genome(format!(
                "{} {} bounds [{}, {}] do not cover attainable range [{}, {}]",
                name,
                self.aggregation.name(),
                raw_lo,
                raw_hi,
                reach_lo,
                reach_hi
            )));
        }
        Ok(())
    }
}

/// Per-run set of trait configs, one per [`TraitKind`] in decode order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitSet {
    encoding: Encoding,
    loci: usize,
    configs: Vec<TraitConfig>,
}

impl TraitSet {
    pub fn new(encoding: Encoding, loci: usize, configs: Vec<TraitConfig>) -> Result<Self> {
        let kinds: Vec<TraitKind> = configs.iter().map(|c| c.kind).collect();
        if kinds != TraitKind::ALL {
            return Err(CropError::Genome(format!(
                "Expected one config per trait in order {:?}, got {:?}",
                TraitKind::ALL,
                kinds
            )));
        }
        for config in &configs {
            config.validate(encoding, loci)?;
        }
        Ok(Self {
            encoding,
            loci,
            configs,
        })
    }

    pub fn generate<R: Rng>(config: &GenomeConfig, rng: &mut R) -> Result<Self> {
        match config.scheme {
            AggregationScheme::Classic => Self::generate_classic(config, rng),
            AggregationScheme::Weighted => Self::generate_weighted(config, rng),
        }
    }

    /// Random SNP subsets aggregated by sum, mean, max and median
    pub fn generate_classic<R: Rng>(config: &GenomeConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let aggregations = [
            Aggregation::Sum,
            Aggregation::Mean,
            Aggregation::Max,
            Aggregation::Median,
        ];
        let configs = TraitKind::ALL
            .iter()
            .zip(aggregations)
            .map(|(&kind, aggregation)| {
                let snps = index::sample(rng, config.snp_pool, config.snps_per_trait).into_vec();
                TraitConfig::new(kind, snps, aggregation, config.encoding)
            })
            .collect();
        Self::new(config.encoding, config.loci, configs)
    }

    /// Every locus weighted by a standard-normal coefficient
    pub fn generate_weighted<R: Rng>(config: &GenomeConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;
        let configs = TraitKind::ALL
            .iter()
            .map(|&kind| {
                let weights: Vec<f64> = (0..config.loci).map(|_| rng.sample(StandardNormal)).collect();
                TraitConfig::new(
                    kind,
                    (0..config.loci).collect(),
                    Aggregation::WeightedDot { weights },
                    config.encoding,
                )
            })
            .collect();
        Self::new(config.encoding, config.loci, configs)
    }

    pub fn decode(&self, genome: &Genome) -> Traits {
        let mut traits = Traits::default();
        for config in &self.configs {
            traits.set(config.kind, config.decode(genome, self.encoding));
        }
        traits
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn loci(&self) -> usize {
        self.loci
    }

    pub fn genome_bits(&self) -> usize {
        self.loci * self.encoding.bits_per_locus()
    }

    pub fn configs(&self) -> &[TraitConfig] {
        &self.configs
    }
}
