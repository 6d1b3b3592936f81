//! Solar geometry, day length and temperature forcing.
//!
//! Everything here is a pure function of day-of-year and latitude, except
//! [`TemperatureSeries`] which wraps the caller-supplied daily temperatures.

use crate::error::{CropError, Result};
use std::f64::consts::PI;

pub const SOLAR_CONSTANT: f64 = 1368.0;
pub const DIRECT_FRACTION: f64 = 0.85;
/// Day length (h) above which development is not slowed
pub const CRITICAL_PHOTOPERIOD: f64 = 16.0;
pub const PHOTOPERIOD_SENSITIVITY: f64 = 0.0085;

const DAYS_PER_YEAR: f64 = 365.0;

/// Degrees
pub fn solar_declination(day_of_year: u32) -> f64 {
    23.45 * (2.0 * PI * (284.0 + day_of_year as f64) / DAYS_PER_YEAR).sin()
}

/// Sine of the solar elevation at noon
pub fn sun_angle_sine(latitude: f64, declination: f64) -> f64 {
    let phi = latitude.to_radians();
    let delta = declination.to_radians();
    phi.sin() * delta.sin() + phi.cos() * delta.cos()
}

pub fn earth_sun_distance_factor(day_of_year: u32) -> f64 {
    1.0 + 0.033 * (2.0 * PI * day_of_year as f64 / DAYS_PER_YEAR).cos()
}

/// W/m² at the top of the canopy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Irradiance {
    pub direct: f64,
    pub diffuse: f64,
}

impl Irradiance {
    pub fn total(&self) -> f64 {
        self.direct + self.diffuse
    }
}

pub fn irradiance(day_of_year: u32, latitude: f64) -> Irradiance {
    let sine = sun_angle_sine(latitude, solar_declination(day_of_year)).max(0.0);
    let total = SOLAR_CONSTANT * earth_sun_distance_factor(day_of_year) * sine;
    Irradiance {
        direct: total * DIRECT_FRACTION,
        diffuse: total * (1.0 - DIRECT_FRACTION),
    }
}

/// Hours between sunrise and sunset; 0 in polar night, 24 in polar day
pub fn day_length(day_of_year: u32, latitude: f64) -> f64 {
    let phi = latitude.to_radians();
    let delta = solar_declination(day_of_year).to_radians();
    let cos_omega = (-phi.tan() * delta.tan()).clamp(-1.0, 1.0);
    2.0 * cos_omega.acos().to_degrees() / 15.0
}

/// 1.0 at or above the critical photoperiod, quadratic penalty below it
pub fn photoperiod_response(day_length: f64) -> f64 {
    if day_length >= CRITICAL_PHOTOPERIOD {
        return 1.0;
    }
    let deficit = CRITICAL_PHOTOPERIOD - day_length;
    (1.0 - PHOTOPERIOD_SENSITIVITY * deficit * deficit).max(0.0)
}

/// Daily mean temperatures (°C), indexed from day 1
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSeries {
    values: Vec<f64>,
    fallback: f64,
}

impl TemperatureSeries {
    pub fn new(values: Vec<f64>, fallback: f64) -> Result<Self> {
        if let Some(pos) = values.iter().position(|t| !t.is_finite()) {
            return Err(CropError::Simulation(format!(
                "Temperature for day {} is not a finite number",
                pos + 1
            )));
        }
        Ok(Self { values, fallback })
    }

    /// Every day reads the same value
    pub fn constant(value: f64, days: u32) -> Self {
        Self {
            values: vec![value; days as usize],
            fallback: value,
        }
    }

    /// Temperature of `day` (1-based); days past the end of the series read
    /// the fallback value
    pub fn temperature(&self, day: u32) -> f64 {
        day.checked_sub(1)
            .and_then(|i| self.values.get(i as usize))
            .copied()
            .unwrap_or(self.fallback)
    }

    pub fn covers(&self, days: u32) -> bool {
        self.values.len() >= days as usize
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
