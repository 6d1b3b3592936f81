pub mod population;

pub use population::PopulationStats;
