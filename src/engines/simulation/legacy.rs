//! Stage-free source/sink model with a fixed list of sinks.
//!
//! Predates the phenological simulator: every sink draws on the pool every
//! day and grain only starts filling on a fixed calendar day.

use super::environment::TemperatureSeries;
use crate::config::{ConfigSection, SimulationConfig};
use crate::error::Result;
use crate::types::Traits;
use serde::{Deserialize, Serialize};

const QUANTUM_EFFICIENCY: f64 = 0.05;
const RESPIRATION_PER_DEGREE: f64 = 0.1;
const MAINTENANCE_RESPIRATION_RATE: f64 = 0.014;
const CRPAR: f64 = 0.48;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyParams {
    /// dm² before the first day of growth
    pub initial_leaf_area: f64,
    pub light_intensity: f64,
    /// Sink strengths; the first is the leaf, the last the grain
    pub sink_strengths: Vec<f64>,
    /// Size gained per unit biomass, one per sink
    pub conversion_factors: Vec<f64>,
}

impl Default for LegacyParams {
    fn default() -> Self {
        Self {
            initial_leaf_area: 1.0,
            light_intensity: 1000.0,
            sink_strengths: vec![0.1, 0.4, 0.5],
            conversion_factors: vec![0.023, 0.851, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyRecord {
    pub day: u32,
    pub leaf_area: f64,
    pub total_biomass: f64,
    pub yield_total: f64,
}

/// `min(S_o, S_o / S_total * CAP)`; no increment when the total strength is zero
pub fn biomass_increment(strength: f64, total_strength: f64, cap: f64) -> f64 {
    if total_strength == 0.0 {
        return 0.0;
    }
    strength.min(strength / total_strength * cap)
}

pub fn absorbed_par(leaf_area: f64, leaf_angle: f64, light_intensity: f64) -> f64 {
    leaf_area * light_intensity * leaf_angle.to_radians().cos() * CRPAR
}

pub fn photosynthetic_production(absorbed_par: f64, efficiency: f64, temperature: f64) -> f64 {
    (QUANTUM_EFFICIENCY * efficiency * absorbed_par - RESPIRATION_PER_DEGREE * temperature).max(0.0)
}

#[derive(Debug, Clone)]
pub struct LegacyYieldModel {
    config: SimulationConfig,
    params: LegacyParams,
}

impl LegacyYieldModel {
    pub fn new(config: SimulationConfig, params: LegacyParams) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, params })
    }

    pub fn run(&self, traits: &Traits, temperatures: &TemperatureSeries) -> (f64, Vec<LegacyRecord>) {
        let sinks = &self.params.sink_strengths;
        let total_strength: f64 = sinks.iter().sum();
        let grain_strength = sinks.last().copied().unwrap_or(0.0);
        let grain_start = self.config.flowering_start_day;

        let mut cap = 0.0;
        let mut leaf_area = self.params.initial_leaf_area;
        let mut total_biomass = 0.0;
        let mut organ_biomass = vec![0.0; sinks.len()];
        let mut organ_sizes = vec![0.0; sinks.len()];
        let mut grain_fill: Vec<f64> = Vec::new();
        let mut yield_total: f64 = 0.0;
        let mut records = Vec::with_capacity(self.config.days as usize);

        for day in 1..=self.config.days {
            let absorbed = absorbed_par(leaf_area, traits.leaf_angle, self.params.light_intensity);
            let production = photosynthetic_production(
                absorbed,
                traits.photosynthetic_efficiency,
                temperatures.temperature(day),
            );
            cap = (cap + production - MAINTENANCE_RESPIRATION_RATE * total_biomass).max(0.0);

            for (i, &strength) in sinks.iter().enumerate() {
                let increment = biomass_increment(strength, total_strength, cap);
                cap -= increment;
                organ_biomass[i] += increment;
                let factor = self.params.conversion_factors.get(i).copied().unwrap_or(1.0);
                organ_sizes[i] += increment * factor;
            }

            total_biomass = organ_biomass.iter().sum();
            leaf_area = organ_sizes.first().copied().unwrap_or(0.0);

            if day >= grain_start {
                let growth = biomass_increment(grain_strength, total_strength, cap);
                cap -= growth;
                grain_fill.push(growth / self.config.seed_mass_divisor);
            }
            // Every filled cohort counts, inside the grain window and after it
            yield_total = grain_fill.iter().sum();

            records.push(LegacyRecord {
                day,
                leaf_area,
                total_biomass,
                yield_total,
            });
        }

        (yield_total, records)
    }
}
