mod csv;

pub use csv::{TemperatureCsvConnector, TemperatureSummary, TEMPERATURE_ALIASES};
