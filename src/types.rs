use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Decoded plant trait identifiers, in decode order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraitKind {
    AllocationRatio,
    LeafAngle,
    PhotosyntheticEfficiency,
    ThermalTolerance,
}

impl TraitKind {
    pub const ALL: [TraitKind; 4] = [
        TraitKind::AllocationRatio,
        TraitKind::LeafAngle,
        TraitKind::PhotosyntheticEfficiency,
        TraitKind::ThermalTolerance,
    ];

    /// Target value range of the decoded trait
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            TraitKind::AllocationRatio => (0.5, 0.9),
            TraitKind::LeafAngle => (0.0, 180.0),
            TraitKind::PhotosyntheticEfficiency => (0.1, 1.5),
            TraitKind::ThermalTolerance => (0.0, 5.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TraitKind::AllocationRatio => "allocation_ratio",
            TraitKind::LeafAngle => "leaf_angle",
            TraitKind::PhotosyntheticEfficiency => "photosynthetic_efficiency",
            TraitKind::ThermalTolerance => "thermal_tolerance",
        }
    }
}

/// Continuous trait vector decoded from a genome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub allocation_ratio: f64,
    /// Degrees from horizontal, 0-180
    pub leaf_angle: f64,
    pub photosynthetic_efficiency: f64,
    /// Degrees Celsius added to the ceiling temperature
    pub thermal_tolerance: f64,
}

impl Traits {
    pub fn new(
        allocation_ratio: f64,
        leaf_angle: f64,
        photosynthetic_efficiency: f64,
        thermal_tolerance: f64,
    ) -> Self {
        Self {
            allocation_ratio,
            leaf_angle,
            photosynthetic_efficiency,
            thermal_tolerance,
        }
    }

    pub fn get(&self, kind: TraitKind) -> f64 {
        match kind {
            TraitKind::AllocationRatio => self.allocation_ratio,
            TraitKind::LeafAngle => self.leaf_angle,
            TraitKind::PhotosyntheticEfficiency => self.photosynthetic_efficiency,
            TraitKind::ThermalTolerance => self.thermal_tolerance,
        }
    }

    pub fn set(&mut self, kind: TraitKind, value: f64) {
        match kind {
            TraitKind::AllocationRatio => self.allocation_ratio = value,
            TraitKind::LeafAngle => self.leaf_angle = value,
            TraitKind::PhotosyntheticEfficiency => self.photosynthetic_efficiency = value,
            TraitKind::ThermalTolerance => self.thermal_tolerance = value,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [
            self.allocation_ratio,
            self.leaf_angle,
            self.photosynthetic_efficiency,
            self.thermal_tolerance,
        ]
    }

    /// Signature used for fitness memoization and elite identity
    pub fn key(&self) -> TraitKey {
        TraitKey(self.to_array().map(|v| (v * 100.0).round() as i64))
    }
}

impl Default for Traits {
    /// Midpoint of every trait range
    fn default() -> Self {
        let mut traits = Self::new(0.0, 0.0, 0.0, 0.0);
        for kind in TraitKind::ALL {
            let (lo, hi) = kind.value_range();
            traits.set(kind, (lo + hi) / 2.0);
        }
        traits
    }
}

impl fmt::Display for Traits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ratio={:.2} angle={:.1} efficiency={:.3} tolerance={:.1}",
            self.allocation_ratio,
            self.leaf_angle,
            self.photosynthetic_efficiency,
            self.thermal_tolerance
        )
    }
}

/// Traits rounded to hundredths, hashable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraitKey(pub [i64; 4]);

/// Discrete phenological stage, 1 (germination) through 11 (maturity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stage(u8);

impl Stage {
    pub const GERMINATION: Stage = Stage(1);
    pub const STEM_GROWTH: Stage = Stage(2);
    pub const BRANCHING: Stage = Stage(3);
    pub const BUD_INITIATION: Stage = Stage(4);
    pub const FLOWER_INITIATION: Stage = Stage(5);
    pub const FLOWERING: Stage = Stage(6);
    pub const GRAIN_INITIATION: Stage = Stage(7);
    pub const GRAIN_FILLING: Stage = Stage(8);
    pub const SEED_FORMATION: Stage = Stage(9);
    pub const RIPENING: Stage = Stage(10);
    pub const MATURITY: Stage = Stage(11);

    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 11;

    /// Clamps into 1..=11
    pub fn new(value: u8) -> Self {
        Stage(value.clamp(Self::FIRST, Self::LAST))
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_terminal(&self) -> bool {
        self.0 == Self::LAST
    }

    /// Stages strictly after `self` up to and including `to`
    pub fn entered_until(self, to: Stage) -> impl Iterator<Item = Stage> {
        (self.0 + 1..=to.0).map(Stage)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::GERMINATION
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One simulated day of growth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub day: u32,
    pub stage: Stage,
    /// cm
    pub stem_height: f64,
    pub leaf_count: usize,
    pub bud_count: usize,
    /// g
    pub total_biomass: f64,
    /// g
    pub yield_total: f64,
}

/// Complete result of one multi-day simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub yield_total: f64,
    pub records: Vec<DailyRecord>,
    /// First day the terminal stage was reached
    pub terminal_day: Option<u32>,
    pub stage_entry_days: BTreeMap<u8, u32>,
}
