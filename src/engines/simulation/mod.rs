pub mod environment;
pub mod phenology;
pub mod organs;
pub mod allocation;
pub mod simulator;
pub mod legacy;

pub use environment::{Irradiance, TemperatureSeries};
pub use phenology::{CardinalTemperatures, PhenologyClock, StageTransition};
pub use organs::{Organ, OrganKind, OrganState, SinkStrengthTable};
pub use allocation::{GrainParams, OrganAllocationEngine};
pub use simulator::PlantSimulator;
pub use legacy::{LegacyParams, LegacyYieldModel};
