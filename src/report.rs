use crate::config::AppConfig;
use crate::data::connectors::TemperatureSummary;
use crate::data::CacheStats;
use crate::engines::generation::OptimizationResult;
use crate::error::Result;
use crate::types::SimulationOutput;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything one invocation produced, ready for serialization
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub config: AppConfig,
    pub temperatures: Option<TemperatureSummary>,
    pub elitist: OptimizationResult,
    pub baseline: Option<OptimizationResult>,
    /// Daily trace of the elitist run's best plant
    pub best_simulation: SimulationOutput,
    pub cache: CacheStats,
}

impl RunReport {
    pub fn new(
        config: AppConfig,
        elitist: OptimizationResult,
        best_simulation: SimulationOutput,
        cache: CacheStats,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            config,
            temperatures: None,
            elitist,
            baseline: None,
            best_simulation,
            cache,
        }
    }

    pub fn with_baseline(mut self, baseline: OptimizationResult) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn with_temperatures(mut self, summary: TemperatureSummary) -> Self {
        self.temperatures = Some(summary);
        self
    }

    /// Elitist best yield minus baseline best yield
    pub fn improvement(&self) -> Option<f64> {
        self.baseline
            .as_ref()
            .map(|b| self.elitist.best.fitness - b.best.fitness)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::generation::Individual;
    use crate::types::Traits;

    fn result(fitness: f64) -> OptimizationResult {
        OptimizationResult {
            best: Individual {
                genome: vec![1, 0],
                traits: Traits::default(),
                fitness,
            },
            fitness_history: vec![fitness],
            elite_history: vec![fitness],
            diversity_history: vec![0.0],
            trait_history: vec![Traits::default()],
            snapshots: Vec::new(),
            simulations: 1,
        }
    }

    #[test]
    fn test_report_serializes_with_timestamp() {
        let output = SimulationOutput {
            yield_total: 3.0,
            records: Vec::new(),
            terminal_day: Some(70),
            stage_entry_days: Default::default(),
        };
        let cache = CacheStats {
            entries: 1,
            hits: 0,
            misses: 1,
        };
        let report = RunReport::new(AppConfig::default(), result(3.0), output, cache)
            .with_baseline(result(2.5));

        assert_eq!(report.improvement(), Some(0.5));
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let stamp = value["generated_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(value["elitist"]["best"]["fitness"], 3.0);
        assert_eq!(value["best_simulation"]["terminal_day"], 70);
    }
}
