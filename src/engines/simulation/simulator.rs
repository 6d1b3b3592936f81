use super::allocation::{GrainParams, OrganAllocationEngine};
use super::environment::{self, TemperatureSeries};
use super::phenology::{DevelopmentInputs, PhenologyClock};
use crate::config::{ConfigSection, SimulationConfig};
use crate::error::Result;
use crate::types::{DailyRecord, SimulationOutput, Traits};
use log::{debug, warn};
use rand::Rng;

/// Day-by-day growth of one plant
#[derive(Debug, Clone)]
pub struct PlantSimulator {
    config: SimulationConfig,
}

impl PlantSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grain_params(&self) -> GrainParams {
        GrainParams {
            seeds_per_capsule: self.config.seeds_per_capsule,
            seed_mass_divisor: self.config.seed_mass_divisor,
            flowering_start_day: self.config.flowering_start_day,
            grain_filling_duration: self.config.grain_filling_duration,
        }
    }

    pub fn run<R: Rng>(
        &self,
        traits: &Traits,
        temperatures: &TemperatureSeries,
        rng: &mut R,
    ) -> SimulationOutput {
        self.run_observed(traits, temperatures, rng, |_, _| {})
    }

    /// Same as [`run`](Self::run), handing every day's record and the organ
    /// engine to `observer` right after the day completes
    pub fn run_observed<R, F>(
        &self,
        traits: &Traits,
        temperatures: &TemperatureSeries,
        rng: &mut R,
        mut observer: F,
    ) -> SimulationOutput
    where
        R: Rng,
        F: FnMut(&DailyRecord, &OrganAllocationEngine),
    {
        if !temperatures.covers(self.config.days) {
            warn!(
                "temperature series has {} days, using {:.1} °C after day {}",
                temperatures.len(),
                temperatures.fallback(),
                temperatures.len()
            );
        }

        let mut clock = PhenologyClock::new();
        let mut engine = OrganAllocationEngine::new(
            *traits,
            self.config.initial_seed_biomass,
            self.grain_params(),
        );
        let mut records = Vec::with_capacity(self.config.days as usize);
        let mut terminal_day = None;

        for day in 1..=self.config.days {
            let day_of_year = self.config.day_of_year(day);
            let irradiance = environment::irradiance(day_of_year, self.config.latitude);
            let photoperiod = environment::photoperiod_response(environment::day_length(
                day_of_year,
                self.config.latitude,
            ));
            let inputs = DevelopmentInputs {
                temperature: temperatures.temperature(day),
                photoperiod,
                thermal_tolerance: traits.thermal_tolerance,
            };

            let transition = clock.advance(day, &inputs);
            for stage in transition.entered() {
                debug!("day {}: stage {} -> {}", day, transition.from, stage);
                engine.enter_stage(stage, rng);
            }
            let stage = transition.to;
            if stage.is_terminal() && terminal_day.is_none() {
                terminal_day = Some(day);
            }

            engine.daily_events(stage, rng);

            let production = engine.photosynthesis(&irradiance);
            let respiration = engine.maintenance_respiration();
            engine.update_cap(production, respiration);
            engine.allocate();
            engine.refresh_morphology();

            let organs = engine.organs();
            let record = DailyRecord {
                day,
                stage,
                stem_height: organs.stem.height,
                leaf_count: organs.leaf.count(),
                bud_count: organs.buds.len(),
                total_biomass: organs.total_biomass(),
                yield_total: engine.current_yield(day, stage),
            };
            observer(&record, &engine);
            records.push(record);
        }

        SimulationOutput {
            yield_total: records.last().map(|r| r.yield_total).unwrap_or(0.0),
            records,
            terminal_day,
            stage_entry_days: clock.stage_entry_days().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_one_record_per_day() {
        let simulator = PlantSimulator::new(SimulationConfig::default()).unwrap();
        let temperatures = TemperatureSeries::constant(18.0, 103);
        let mut rng = StdRng::seed_from_u64(42);
        let output = simulator.run(&Traits::default(), &temperatures, &mut rng);

        assert_eq!(output.records.len(), 103);
        assert!(output
            .records
            .iter()
            .enumerate()
            .all(|(i, r)| r.day == i as u32 + 1));
        assert_eq!(output.yield_total, output.records[102].yield_total);
    }

    #[test]
    fn test_short_series_falls_back() {
        let config = SimulationConfig {
            days: 30,
            ..Default::default()
        };
        let simulator = PlantSimulator::new(config).unwrap();
        let short = TemperatureSeries::new(vec![18.0; 5], 18.0).unwrap();
        let full = TemperatureSeries::constant(18.0, 30);

        let a = simulator.run(&Traits::default(), &short, &mut StdRng::seed_from_u64(1));
        let b = simulator.run(&Traits::default(), &full, &mut StdRng::seed_from_u64(1));
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_rejects_zero_seed_mass_divisor() {
        let config = SimulationConfig {
            seed_mass_divisor: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            PlantSimulator::new(config),
            Err(crate::error::CropError::Configuration(_))
        ));
    }
}
