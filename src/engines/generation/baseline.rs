use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::RunContext;
use crate::engines::generation::{
    evolution_engine::OptimizationResult,
    genome::{Genome, Individual},
    operators::{position_weighted_mutation, random_genome, sample_distinct_parents, two_point_crossover},
    progress::ProgressCallback,
};
use crate::engines::metrics::PopulationStats;
use crate::error::{CropError, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Plain generational GA used as a reference point: every plant is simulated
/// every generation and the whole population is replaced by offspring
pub struct BaselineEngine {
    config: EvolutionConfig,
    context: RunContext,
    rng: StdRng,
}

impl BaselineEngine {
    pub fn new(config: EvolutionConfig, context: RunContext) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            context,
            rng,
        })
    }

    pub fn run<C: ProgressCallback>(&mut self, mut callback: C) -> Result<OptimizationResult> {
        let generations = self.config.generations;
        let mut fitness_history = Vec::with_capacity(generations);
        let mut elite_history = Vec::with_capacity(generations);
        let mut diversity_history = Vec::with_capacity(generations);
        let mut trait_history = Vec::with_capacity(generations);
        let mut best_ever: Option<Individual> = None;
        let mut simulations = 0;

        let bits = self.context.genome_bits();
        let mut genomes: Vec<Genome> = (0..self.config.population_size)
            .map(|_| random_genome(bits, &mut self.rng))
            .collect();

        for generation in 0..generations {
            callback.on_generation_start(generation);

            let total = genomes.len();
            let population = self
                .context
                .evaluate_uncached(genomes, self.config.parallel_evaluation);
            simulations += total;
            callback.on_population_evaluated(total, total);

            trait_history.push(PopulationStats::mean_traits(&population));
            diversity_history.push(PopulationStats::fitness_diversity(&population));

            let best = population
                .iter()
                .max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap_or(std::cmp::Ordering::Equal))
                .cloned()
                .ok_or_else(|| CropError::Simulation("Population is empty".to_string()))?;
            fitness_history.push(best.fitness);

            let improved = best_ever.as_ref().map_or(true, |b| best.fitness > b.fitness);
            if improved {
                best_ever = Some(best.clone());
            }
            let elite_fitness = best_ever.as_ref().map_or(best.fitness, |b| b.fitness);
            elite_history.push(elite_fitness);

            genomes = self.breed(&population);
            callback.on_generation_complete(generation, best.fitness, elite_fitness);
        }

        let best = best_ever.ok_or_else(|| CropError::Simulation("No generation was run".to_string()))?;
        info!(
            "baseline run finished: best {:.4} ({}), {} simulations",
            best.fitness, best.traits, simulations
        );

        Ok(OptimizationResult {
            best,
            fitness_history,
            elite_history,
            diversity_history,
            trait_history,
            snapshots: Vec::new(),
            simulations,
        })
    }

    /// One child per slot, each from two different parents
    fn breed(&mut self, population: &[Individual]) -> Vec<Genome> {
        let encoding = self.context.encoding();
        let mut children = Vec::with_capacity(population.len());
        for _ in 0..population.len() {
            let Some((parent1, parent2)) = sample_distinct_parents(population, &mut self.rng) else {
                break;
            };
            let child = two_point_crossover(&parent1.genome, &parent2.genome, &mut self.rng);
            children.push(position_weighted_mutation(
                &child,
                self.config.mutation_rate,
                encoding,
                &mut self.rng,
            ));
        }
        children
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }
}
