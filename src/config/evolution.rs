use super::traits::{check_fraction, ConfigSection};
use crate::error::CropError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Base bit-flip probability, scaled up linearly along the genome
    pub mutation_rate: f64,
    /// Share of the population copied unchanged into the next generation
    pub elite_fraction: f64,
    /// Share of top performers eligible as parents
    pub parent_fraction: f64,
    pub hall_of_fame_size: usize,
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 120,
            mutation_rate: 0.08,
            elite_fraction: 0.1,
            parent_fraction: 0.4,
            hall_of_fame_size: 5,
            seed: Some(42),
            parallel_evaluation: true,
        }
    }
}

impl EvolutionConfig {
    pub fn elite_count(&self) -> usize {
        (self.population_size as f64 * self.elite_fraction) as usize
    }

    /// Never empty, even for tiny populations
    pub fn parent_pool_size(&self) -> usize {
        ((self.population_size as f64 * self.parent_fraction) as usize)
            .clamp(1, self.population_size.max(1))
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), CropError> {
        if self.population_size < 2 {
            return Err(CropError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.generations == 0 {
            return Err(CropError::Configuration(
                "Generation count must be positive".to_string(),
            ));
        }
        check_fraction("Mutation rate", self.mutation_rate)?;
        check_fraction("Elite fraction", self.elite_fraction)?;
        check_fraction("Parent fraction", self.parent_fraction)?;
        if self.hall_of_fame_size == 0 {
            return Err(CropError::Configuration(
                "Hall of fame must hold at least one individual".to_string(),
            ));
        }
        Ok(())
    }
}
