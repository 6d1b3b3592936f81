//! Organ state of a single plant.
//!
//! Organs come in two shapes: simple organs holding one biomass pool (seed,
//! leaf, stem) and collection organs made of sub-units (grain capsules, bud
//! and flower cohorts). Both expose the same [`Organ`] contract so the
//! allocation step can treat them uniformly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Specific leaf area, dm² per g of leaf biomass (0.023 m²/g)
pub const LEAF_AREA_PER_GRAM: f64 = 2.3;
/// cm of stem height per g of stem biomass
pub const STEM_HEIGHT_PER_GRAM: f64 = 8.51;
pub const STEM_DIAMETER_COEFFICIENT: f64 = 0.1;
pub const GRAIN_CONVERSION: f64 = 1.0;

/// Sink table keys, in allocation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrganKind {
    Seed,
    Leaf,
    Stem,
    Grain,
    Buds,
    Flowers,
}

pub trait Organ {
    fn total_biomass(&self) -> f64;

    /// Adds up to `amount` of biomass and returns what was absorbed
    fn apply_allocation(&mut self, amount: f64) -> f64;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    pub biomass: f64,
}

impl Organ for Seed {
    fn total_biomass(&self) -> f64 {
        self.biomass
    }

    fn apply_allocation(&mut self, amount: f64) -> f64 {
        let amount = amount.max(0.0);
        self.biomass += amount;
        amount
    }
}

impl Seed {
    /// Moves `fraction` of the reserve out of the seed
    pub fn release(&mut self, fraction: f64) -> f64 {
        let released = self.biomass * fraction.clamp(0.0, 1.0);
        self.biomass -= released;
        released
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaf {
    pub biomass: f64,
    /// Area of one leaf, dm²
    pub size: f64,
    /// Inclination of every leaf, degrees
    pub angles: Vec<f64>,
    pub scale_factor: f64,
}

impl Default for Leaf {
    fn default() -> Self {
        Self {
            biomass: 0.0,
            size: 0.0,
            angles: Vec::new(),
            scale_factor: 1.0,
        }
    }
}

impl Leaf {
    pub fn count(&self) -> usize {
        self.angles.len()
    }

    /// Leaf area projected by each leaf's own inclination
    pub fn intercepting_area(&self) -> f64 {
        self.angles
            .iter()
            .map(|angle| self.size * angle.to_radians().sin())
            .sum()
    }

    pub fn refresh_size(&mut self) {
        self.size = match self.count() {
            0 => 0.0,
            n => self.biomass * LEAF_AREA_PER_GRAM * self.scale_factor / n as f64,
        };
    }
}

impl Organ for Leaf {
    fn total_biomass(&self) -> f64 {
        self.biomass
    }

    fn apply_allocation(&mut self, amount: f64) -> f64 {
        let amount = amount.max(0.0);
        self.biomass += amount;
        amount
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stem {
    pub biomass: f64,
    /// cm
    pub height: f64,
    pub branches: u32,
    /// cm
    pub diameter: f64,
}

impl Stem {
    pub fn refresh_dimensions(&mut self) {
        self.height = self.biomass * STEM_HEIGHT_PER_GRAM;
        self.diameter = STEM_DIAMETER_COEFFICIENT * self.biomass.sqrt();
    }
}

impl Organ for Stem {
    fn total_biomass(&self) -> f64 {
        self.biomass
    }

    fn apply_allocation(&mut self, amount: f64) -> f64 {
        let amount = amount.max(0.0);
        self.biomass += amount;
        amount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capsule {
    /// Relative fill of one seed
    pub size: f64,
    pub biomass: f64,
    /// 0..=1
    pub maturity: f64,
    pub seed_count: u32,
}

impl Capsule {
    pub fn new(seed_count: u32) -> Self {
        Self {
            size: 0.0,
            biomass: 0.0,
            maturity: 0.0,
            seed_count,
        }
    }

    pub fn seed_yield(&self) -> f64 {
        self.size * self.seed_count as f64 * GRAIN_CONVERSION
    }
}

/// Splits `amount` evenly over `count` members; nothing when empty
fn share_per_member(amount: f64, count: usize) -> Option<f64> {
    if count == 0 || amount <= 0.0 {
        return None;
    }
    Some(amount / count as f64)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grain {
    pub capsules: Vec<Capsule>,
}

impl Grain {
    pub fn refresh_sizes(&mut self, seed_mass_divisor: f64) {
        for capsule in &mut self.capsules {
            capsule.size = capsule.biomass / (capsule.seed_count as f64 * seed_mass_divisor);
        }
    }

    pub fn ripen(&mut self, increment: f64) {
        for capsule in &mut self.capsules {
            capsule.maturity = (capsule.maturity + increment).min(1.0);
        }
    }

    pub fn total_yield(&self) -> f64 {
        self.capsules.iter().map(Capsule::seed_yield).sum()
    }

    pub fn mature_yield(&self, maturity_threshold: f64) -> f64 {
        self.capsules
            .iter()
            .filter(|c| c.maturity >= maturity_threshold)
            .map(Capsule::seed_yield)
            .sum()
    }
}

impl Organ for Grain {
    fn total_biomass(&self) -> f64 {
        self.capsules.iter().map(|c| c.biomass).sum()
    }

    fn apply_allocation(&mut self, amount: f64) -> f64 {
        let Some(share) = share_per_member(amount, self.capsules.len()) else {
            return 0.0;
        };
        for capsule in &mut self.capsules {
            capsule.biomass += share;
        }
        share * self.capsules.len() as f64
    }
}

/// A bud or a flower
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReproductiveUnit {
    pub biomass: f64,
    pub maturity: f64,
    pub pollinated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cohort {
    pub units: Vec<ReproductiveUnit>,
}

impl Cohort {
    pub fn with_size(count: usize) -> Self {
        Self {
            units: vec![ReproductiveUnit::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn pollinated_count(&self) -> usize {
        self.units.iter().filter(|u| u.pollinated).count()
    }

    pub fn ripen(&mut self, increment: f64) {
        for unit in &mut self.units {
            unit.maturity = (unit.maturity + increment).min(1.0);
        }
    }
}

impl Organ for Cohort {
    fn total_biomass(&self) -> f64 {
        self.units.iter().map(|u| u.biomass).sum()
    }

    fn apply_allocation(&mut self, amount: f64) -> f64 {
        let Some(share) = share_per_member(amount, self.units.len()) else {
            return 0.0;
        };
        for unit in &mut self.units {
            unit.biomass += share;
        }
        share * self.units.len() as f64
    }
}

/// All organs of one plant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganState {
    pub seed: Seed,
    pub leaf: Leaf,
    pub stem: Stem,
    pub grain: Grain,
    pub buds: Cohort,
    pub flowers: Cohort,
}

impl OrganState {
    pub fn with_seed(biomass: f64) -> Self {
        Self {
            seed: Seed { biomass: biomass.max(0.0) },
            ..Default::default()
        }
    }

    pub fn organ(&self, kind: OrganKind) -> &dyn Organ {
        match kind {
            OrganKind::Seed => &self.seed,
            OrganKind::Leaf => &self.leaf,
            OrganKind::Stem => &self.stem,
            OrganKind::Grain => &self.grain,
            OrganKind::Buds => &self.buds,
            OrganKind::Flowers => &self.flowers,
        }
    }

    pub fn organ_mut(&mut self, kind: OrganKind) -> &mut dyn Organ {
        match kind {
            OrganKind::Seed => &mut self.seed,
            OrganKind::Leaf => &mut self.leaf,
            OrganKind::Stem => &mut self.stem,
            OrganKind::Grain => &mut self.grain,
            OrganKind::Buds => &mut self.buds,
            OrganKind::Flowers => &mut self.flowers,
        }
    }

    pub fn total_biomass(&self) -> f64 {
        [
            OrganKind::Seed,
            OrganKind::Leaf,
            OrganKind::Stem,
            OrganKind::Grain,
            OrganKind::Buds,
            OrganKind::Flowers,
        ]
        .iter()
        .map(|&kind| self.organ(kind).total_biomass())
        .sum()
    }
}

/// Per-organ demand weights; only positive entries are active sinks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkStrengthTable {
    strengths: BTreeMap<OrganKind, f64>,
}

impl SinkStrengthTable {
    pub fn set(&mut self, kind: OrganKind, strength: f64) {
        self.strengths.insert(kind, strength.max(0.0));
    }

    pub fn get(&self, kind: OrganKind) -> f64 {
        self.strengths.get(&kind).copied().unwrap_or(0.0)
    }

    pub fn clear(&mut self) {
        for strength in self.strengths.values_mut() {
            *strength = 0.0;
        }
    }

    /// Active sinks in allocation order
    pub fn active(&self) -> Vec<(OrganKind, f64)> {
        self.strengths
            .iter()
            .filter(|(_, &s)| s > 0.0)
            .map(|(&k, &s)| (k, s))
            .collect()
    }

    pub fn total_active(&self) -> f64 {
        self.strengths.values().filter(|&&s| s > 0.0).sum()
    }
}
