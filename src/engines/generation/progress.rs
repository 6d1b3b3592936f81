use log::{debug, info};

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, elite_fitness: f64);
    /// `simulated` of the `total` plants needed a fresh simulation
    fn on_population_evaluated(&mut self, simulated: usize, total: usize);
}

/// Logs every `every`-th generation at info level
pub struct ConsoleProgressCallback {
    label: String,
    every: usize,
}

impl ConsoleProgressCallback {
    pub fn new(label: impl Into<String>, every: usize) -> Self {
        Self {
            label: label.into(),
            every: every.max(1),
        }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, generation: usize) {
        debug!("[{}] generation {} starting", self.label, generation + 1);
    }

    fn on_generation_complete(&mut self, generation: usize, best_fitness: f64, elite_fitness: f64) {
        if (generation + 1) % self.every == 0 || generation == 0 {
            info!(
                "[{}] generation {}: best {:.4}, elite {:.4}",
                self.label,
                generation + 1,
                best_fitness,
                elite_fitness
            );
        }
    }

    fn on_population_evaluated(&mut self, simulated: usize, total: usize) {
        debug!("[{}] simulated {}/{} plants", self.label, simulated, total);
    }
}

/// Discards all progress
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(&mut self, _generation: usize, _best: f64, _elite: f64) {}

    fn on_population_evaluated(&mut self, _simulated: usize, _total: usize) {}
}
