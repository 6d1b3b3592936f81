pub mod fitness;

pub use fitness::{FitnessEvaluator, FitnessModel, RunContext};
