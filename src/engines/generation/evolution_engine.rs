use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::RunContext;
use crate::engines::generation::{
    genome::{Genome, Individual},
    hall_of_fame::HallOfFame,
    operators::{position_weighted_mutation, random_genome, sample_parents, two_point_crossover},
    progress::ProgressCallback,
};
use crate::engines::metrics::PopulationStats;
use crate::error::{CropError, Result};
use crate::types::Traits;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Population members at one generation, after replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub generation: usize,
    pub members: Vec<Individual>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best: Individual,
    /// Best fitness of each evaluated generation
    pub fitness_history: Vec<f64>,
    /// Best fitness seen so far, per generation
    pub elite_history: Vec<f64>,
    /// Coefficient of variation of fitness, per generation
    pub diversity_history: Vec<f64>,
    /// Mean decoded traits at the start of each generation
    pub trait_history: Vec<Traits>,
    pub snapshots: Vec<PopulationSnapshot>,
    pub simulations: usize,
}

/// Elitist GA: sorted truncation selection, elites carried over unchanged and
/// the best-ever plant re-inserted when the population loses it
pub struct EvolutionEngine {
    config: EvolutionConfig,
    context: RunContext,
    hall_of_fame: HallOfFame,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, context: RunContext) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let hall_of_fame = HallOfFame::new(config.hall_of_fame_size);

        Ok(Self {
            config,
            context,
            hall_of_fame,
            rng,
        })
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<OptimizationResult> {
        let generations = self.config.generations;
        let mut fitness_history = Vec::with_capacity(generations);
        let mut elite_history = Vec::with_capacity(generations);
        let mut diversity_history = Vec::with_capacity(generations);
        let mut trait_history = Vec::with_capacity(generations);
        let mut snapshots = Vec::new();

        let initial = self.initialize_population();
        let mut population = self.evaluate(initial, &mut callback);
        let mut simulations = 0;

        for generation in 0..generations {
            callback.on_generation_start(generation);
            trait_history.push(PopulationStats::mean_traits(&population.0));
            simulations += population.1;

            let mut sorted = population.0;
            sorted.sort_by(|a, b| {
                b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal)
            });

            let best = match sorted.first() {
                Some(best) => best.clone(),
                None => return Err(CropError::Simulation("Population is empty".to_string())),
            };
            fitness_history.push(best.fitness);
            self.hall_of_fame.try_add(best.clone());
            let elite = self.hall_of_fame.best().cloned().unwrap_or_else(|| best.clone());
            elite_history.push(elite.fitness);

            let offspring = self.create_next_generation(&sorted);
            let (mut next, simulated) = self.evaluate(offspring, &mut callback);

            if !next.iter().any(|i| i.same_traits(&elite)) {
                if let Some(last) = next.last_mut() {
                    debug!("generation {}: restoring elite {}", generation + 1, elite.traits);
                    *last = elite.clone();
                }
            }

            diversity_history.push(PopulationStats::fitness_diversity(&next));
            if Self::is_snapshot_generation(generation, generations) {
                snapshots.push(PopulationSnapshot {
                    generation,
                    members: next.clone(),
                });
            }

            callback.on_generation_complete(generation, best.fitness, elite.fitness);
            population = (next, simulated);
        }
        simulations += population.1;

        let best = population
            .0
            .iter()
            .max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(std::cmp::Ordering::Equal))
            .cloned()
            .ok_or_else(|| CropError::Simulation("Population is empty".to_string()))?;

        let stats = self.context.cache_stats();
        info!(
            "elitist run finished: best {:.4} ({}), {} simulations, cache {} entries / {} hits",
            best.fitness, best.traits, simulations, stats.entries, stats.hits
        );

        Ok(OptimizationResult {
            best,
            fitness_history,
            elite_history,
            diversity_history,
            trait_history,
            snapshots,
            simulations,
        })
    }

    fn is_snapshot_generation(generation: usize, generations: usize) -> bool {
        generation == 0 || generation == generations / 2 || generation + 1 == generations
    }

    fn initialize_population(&mut self) -> Vec<Genome> {
        let bits = self.context.genome_bits();
        (0..self.config.population_size)
            .map(|_| random_genome(bits, &mut self.rng))
            .collect()
    }

    fn evaluate<C: ProgressCallback>(
        &self,
        genomes: Vec<Genome>,
        callback: &mut C,
    ) -> (Vec<Individual>, usize) {
        let total = genomes.len();
        let (individuals, simulated) = self
            .context
            .evaluate_genomes(genomes, self.config.parallel_evaluation);
        callback.on_population_evaluated(simulated, total);
        (individuals, simulated)
    }

    /// Elites first, then children of parents drawn from the top of `sorted`
    fn create_next_generation(&mut self, sorted: &[Individual]) -> Vec<Genome> {
        let size = self.config.population_size;
        let elite_count = self.config.elite_count().min(sorted.len());
        let pool_size = self.config.parent_pool_size().min(sorted.len());
        let pool = &sorted[..pool_size];
        let encoding = self.context.encoding();

        let mut next_generation: Vec<Genome> = sorted
            .iter()
            .take(elite_count)
            .map(|i| i.genome.clone())
            .collect();

        while next_generation.len() < size {
            let Some((parent1, parent2)) = sample_parents(pool, &mut self.rng) else {
                break;
            };
            let child = two_point_crossover(&parent1.genome, &parent2.genome, &mut self.rng);
            let child = position_weighted_mutation(
                &child,
                self.config.mutation_rate,
                encoding,
                &mut self.rng,
            );
            next_generation.push(child);
        }

        next_generation
    }

    pub fn get_hall_of_fame(&self) -> &HallOfFame {
        &self.hall_of_fame
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }
}
