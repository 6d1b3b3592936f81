use super::traits::ConfigSection;
use crate::error::CropError;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated horizon in days
    pub days: u32,
    /// Degrees north
    pub latitude: f64,
    pub flowering_start_day: u32,
    /// Per-flower seed mass divisor (g)
    pub seed_mass_divisor: f64,
    pub grain_filling_duration: u32,
    /// g
    pub initial_seed_biomass: f64,
    /// Used for days past the end of the temperature series
    pub fallback_temperature: f64,
    pub seeds_per_capsule: u32,
    /// Seeds the stochastic organ events of every simulation
    pub simulation_seed: u64,
    /// Calendar date of simulated day 1; day 1 is January 1st when absent
    pub sowing_date: Option<NaiveDate>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 103,
            latitude: 55.7,
            flowering_start_day: 75,
            seed_mass_divisor: 0.5,
            grain_filling_duration: 40,
            initial_seed_biomass: 0.5,
            fallback_temperature: 18.0,
            seeds_per_capsule: 8,
            simulation_seed: 42,
            sowing_date: NaiveDate::from_ymd_opt(2023, 5, 10),
        }
    }
}

impl SimulationConfig {
    /// Day-of-year of simulated day `day` (1-based). With a sowing date this
    /// follows the calendar, so leap years reach 366; without one it cycles
    /// through 1..=365.
    pub fn day_of_year(&self, day: u32) -> u32 {
        let offset = day.saturating_sub(1);
        match self.sowing_date {
            Some(date) => date
                .checked_add_days(Days::new(u64::from(offset)))
                .map_or(date.ordinal(), |d| d.ordinal()),
            None => offset % 365 + 1,
        }
    }
}

impl ConfigSection for SimulationConfig {
    fn section_name() -> &'static str {
        "simulation"
    }

    fn validate(&self) -> Result<(), CropError> {
        if self.days == 0 {
            return Err(CropError::Configuration(
                "Simulation horizon must be at least one day".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CropError::Configuration(format!(
                "Latitude must be between -90 and 90, got {}",
                self.latitude
            )));
        }
        if self.seed_mass_divisor <= 0.0 {
            return Err(CropError::Configuration(
                "Seed mass divisor must be positive".to_string(),
            ));
        }
        if self.initial_seed_biomass < 0.0 {
            return Err(CropError::Configuration(
                "Initial seed biomass cannot be negative".to_string(),
            ));
        }
        if self.seeds_per_capsule == 0 {
            return Err(CropError::Configuration(
                "Capsules need at least one seed".to_string(),
            ));
        }
        if !self.fallback_temperature.is_finite() {
            return Err(CropError::Configuration(
                "Fallback temperature must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_year_without_sowing_date() {
        let config = SimulationConfig {
            sowing_date: None,
            ..Default::default()
        };
        assert_eq!(config.day_of_year(1), 1);
        assert_eq!(config.day_of_year(103), 103);
    }

    #[test]
    fn test_day_of_year_from_sowing_date_wraps() {
        let config = SimulationConfig {
            sowing_date: NaiveDate::from_ymd_opt(2023, 12, 30),
            ..Default::default()
        };
        assert_eq!(config.day_of_year(1), 364);
        assert_eq!(config.day_of_year(2), 365);
        assert_eq!(config.day_of_year(3), 1);
    }

    #[test]
    fn test_day_of_year_follows_leap_calendar() {
        let config = SimulationConfig {
            sowing_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            ..Default::default()
        };
        assert_eq!(config.day_of_year(1), 366);
        assert_eq!(config.day_of_year(2), 1);

        let config = SimulationConfig {
            sowing_date: NaiveDate::from_ymd_opt(2024, 2, 28),
            ..Default::default()
        };
        assert_eq!(config.day_of_year(2), 60);
        assert_eq!(config.day_of_year(3), 61);
    }

    #[test]
    fn test_validate_rejects_bad_latitude() {
        let config = SimulationConfig {
            latitude: 123.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(SimulationConfig::default().day_of_year(1), 130);
    }
}
