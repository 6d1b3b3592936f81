use crate::types::Stage;
use std::collections::BTreeMap;

/// Base, optimum and ceiling temperatures (°C) of a stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardinalTemperatures {
    pub base: f64,
    pub optimum: f64,
    pub ceiling: f64,
}

impl CardinalTemperatures {
    pub const fn new(base: f64, optimum: f64, ceiling: f64) -> Self {
        Self { base, optimum, ceiling }
    }

    pub fn for_stage(stage: Stage) -> Self {
        match stage.value() {
            1 => Self::new(10.0, 19.0, 36.0),
            2..=6 => Self::new(10.0, 18.0, 36.0),
            _ => Self::new(10.0, 23.0, 36.0),
        }
    }

    /// Ceiling raised by a thermal tolerance (°C)
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self {
            ceiling: self.ceiling + tolerance.max(0.0),
            ..self
        }
    }

    /// Beta response: 0 outside (base, ceiling), 1 at the optimum
    pub fn thermal_response(&self, temperature: f64) -> f64 {
        let Self { base, optimum, ceiling } = *self;
        if temperature <= base || temperature >= ceiling || optimum <= base || ceiling <= optimum {
            return 0.0;
        }
        let exponent = (optimum - base) / (ceiling - optimum);
        let rise = (temperature - base) / (optimum - base);
        let fall = (ceiling - temperature) / (ceiling - optimum);
        (fall * rise.powf(exponent)).max(0.0)
    }
}

/// Upper bound of cumulative biological days for stages 1..=10; stage 11 is open
const STAGE_UPPER_BOUNDS: [f64; 10] = [10.0, 21.0, 22.0, 34.0, 35.0, 44.0, 50.0, 55.0, 60.0, 70.0];

pub fn stage_for(sum_bd: f64) -> Stage {
    let index = STAGE_UPPER_BOUNDS
        .iter()
        .position(|&upper| sum_bd <= upper)
        .unwrap_or(STAGE_UPPER_BOUNDS.len());
    Stage::new(index as u8 + Stage::FIRST)
}

/// Stage before and after one day of development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
}

impl StageTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }

    /// Every stage entered today, in order
    pub fn entered(&self) -> impl Iterator<Item = Stage> {
        self.from.entered_until(self.to)
    }
}

/// Daily forcing of development
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevelopmentInputs {
    pub temperature: f64,
    pub photoperiod: f64,
    pub thermal_tolerance: f64,
}

/// Accumulates biological days and maps the sum onto stages
#[derive(Debug, Clone)]
pub struct PhenologyClock {
    sum_bd: f64,
    stage: Stage,
    stage_entry_days: BTreeMap<u8, u32>,
}

impl Default for PhenologyClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PhenologyClock {
    pub fn new() -> Self {
        let mut stage_entry_days = BTreeMap::new();
        stage_entry_days.insert(Stage::GERMINATION.value(), 1);
        Self {
            sum_bd: 0.0,
            stage: Stage::GERMINATION,
            stage_entry_days,
        }
    }

    /// One biological-day increment for the current stage.
    /// Water and stress responses are held at 1.0.
    pub fn daily_increment(&self, inputs: &DevelopmentInputs) -> f64 {
        let thermal = CardinalTemperatures::for_stage(self.stage)
            .with_tolerance(inputs.thermal_tolerance)
            .thermal_response(inputs.temperature);
        let water = 1.0;
        let stress = 1.0;
        (thermal * inputs.photoperiod.max(0.0) * water * stress).max(0.0)
    }

    pub fn advance(&mut self, day: u32, inputs: &DevelopmentInputs) -> StageTransition {
        let from = self.stage;
        self.sum_bd += self.daily_increment(inputs);
        self.stage = stage_for(self.sum_bd).max(from);

        let transition = StageTransition { from, to: self.stage };
        for stage in transition.entered() {
            self.stage_entry_days.entry(stage.value()).or_insert(day);
        }
        transition
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn sum_bd(&self) -> f64 {
        self.sum_bd
    }

    pub fn stage_entry_days(&self) -> &BTreeMap<u8, u32> {
        &self.stage_entry_days
    }
}
