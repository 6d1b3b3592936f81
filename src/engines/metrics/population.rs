use crate::engines::generation::genome::Individual;
use crate::types::{TraitKind, Traits};

pub struct PopulationStats;

impl PopulationStats {
    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }

    /// Population standard deviation
    pub fn std_dev(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }

        let mean = Self::mean(values);
        let variance = values.iter()
            .map(|&v| (v - mean).powi(2))
            .sum::<f64>() / values.len() as f64;

        variance.sqrt()
    }

    /// `std / mean`; 0 when the mean is 0
    pub fn coefficient_of_variation(values: &[f64]) -> f64 {
        let mean = Self::mean(values);
        if mean == 0.0 {
            return 0.0;
        }
        Self::std_dev(values) / mean
    }

    pub fn fitness_diversity(population: &[Individual]) -> f64 {
        let fitness: Vec<f64> = population.iter().map(|i| i.fitness).collect();
        Self::coefficient_of_variation(&fitness)
    }

    /// Per-trait average of the decoded population
    pub fn mean_traits(population: &[Individual]) -> Traits {
        let mut mean = Traits::default();
        if population.is_empty() {
            return mean;
        }
        for kind in TraitKind::ALL {
            let values: Vec<f64> = population.iter().map(|i| i.traits.get(kind)).collect();
            mean.set(kind, Self::mean(&values));
        }
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(PopulationStats::coefficient_of_variation(&[2.0, 2.0, 2.0]), 0.0);
        assert_eq!(PopulationStats::coefficient_of_variation(&[0.0, 0.0]), 0.0);
        assert_eq!(PopulationStats::coefficient_of_variation(&[]), 0.0);
        let cv = PopulationStats::coefficient_of_variation(&[1.0, 3.0]);
        assert!((cv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_mean_traits() {
        let population = vec![
            Individual {
                genome: vec![],
                traits: Traits::new(0.6, 10.0, 1.0, 0.0),
                fitness: 1.0,
            },
            Individual {
                genome: vec![],
                traits: Traits::new(0.8, 30.0, 0.5, 4.0),
                fitness: 2.0,
            },
        ];
        let mean = PopulationStats::mean_traits(&population);
        assert!((mean.allocation_ratio - 0.7).abs() < 1e-12);
        assert_eq!(mean.leaf_angle, 20.0);
        assert_eq!(mean.thermal_tolerance, 2.0);
    }
}
