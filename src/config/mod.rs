pub mod traits;
pub mod evolution;
pub mod simulation;
pub mod genome;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::EvolutionConfig;
pub use simulation::SimulationConfig;
pub use genome::{AggregationScheme, GenomeConfig};
pub use traits::ConfigSection;
