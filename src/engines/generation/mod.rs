pub mod baseline;
pub mod codec;
pub mod evolution_engine;
pub mod genome;
pub mod hall_of_fame;
pub mod operators;
pub mod progress;

pub use baseline::BaselineEngine;
pub use codec::{Aggregation, TraitConfig, TraitSet};
pub use evolution_engine::{EvolutionEngine, OptimizationResult, PopulationSnapshot};
pub use genome::{Encoding, Genome, Individual};
pub use hall_of_fame::HallOfFame;
pub use progress::{ConsoleProgressCallback, ProgressCallback, SilentProgress};
