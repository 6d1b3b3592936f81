pub mod cache;
pub mod connectors;

pub use cache::{CacheStats, FitnessCache};
pub use connectors::TemperatureCsvConnector;
