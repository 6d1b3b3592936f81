use crate::config::SimulationConfig;
use crate::error::Result;
use crate::data::{CacheStats, FitnessCache};
use crate::engines::generation::codec::TraitSet;
use crate::engines::generation::genome::{Encoding, Genome, Individual};
use crate::engines::simulation::{LegacyParams, LegacyYieldModel, PlantSimulator, TemperatureSeries};
use crate::types::{SimulationOutput, TraitKey, Traits};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which growth model turns traits into a yield
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum FitnessModel {
    /// Staged organ simulator
    #[default]
    Phenological,
    /// Stage-free source/sink model
    Legacy(LegacyParams),
}

/// Final yield of a simulated plant
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    simulator: PlantSimulator,
    legacy: LegacyYieldModel,
    temperatures: TemperatureSeries,
    model: FitnessModel,
}

impl FitnessEvaluator {
    /// Fails when `config` does not validate
    pub fn new(
        config: SimulationConfig,
        temperatures: TemperatureSeries,
        model: FitnessModel,
    ) -> Result<Self> {
        let legacy_params = match &model {
            FitnessModel::Legacy(params) => params.clone(),
            FitnessModel::Phenological => LegacyParams::default(),
        };
        Ok(Self {
            legacy: LegacyYieldModel::new(config.clone(), legacy_params)?,
            simulator: PlantSimulator::new(config)?,
            temperatures,
            model,
        })
    }

    /// Every call reseeds from `simulation_seed`, so equal traits give equal yields
    pub fn evaluate(&self, traits: &Traits) -> f64 {
        match self.model {
            FitnessModel::Phenological => self.simulate(traits).yield_total,
            FitnessModel::Legacy(_) => self.legacy.run(traits, &self.temperatures).0,
        }
    }

    /// Full daily trace of the staged simulator
    pub fn simulate(&self, traits: &Traits) -> SimulationOutput {
        let mut rng = StdRng::seed_from_u64(self.simulator.config().simulation_seed);
        self.simulator.run(traits, &self.temperatures, &mut rng)
    }

    pub fn evaluate_cached(&self, traits: &Traits, cache: &FitnessCache) -> f64 {
        let key = traits.key();
        if let Some(fitness) = cache.get(&key) {
            return fitness;
        }
        let fitness = self.evaluate(traits);
        cache.set(key, fitness);
        fitness
    }

    pub fn simulator(&self) -> &PlantSimulator {
        &self.simulator
    }

    pub fn temperatures(&self) -> &TemperatureSeries {
        &self.temperatures
    }

    pub fn model(&self) -> &FitnessModel {
        &self.model
    }
}

/// Everything one optimization run shares: trait decoding, the evaluator and
/// the fitness memo
pub struct RunContext {
    trait_set: TraitSet,
    evaluator: FitnessEvaluator,
    cache: FitnessCache,
}

impl RunContext {
    pub fn new(trait_set: TraitSet, evaluator: FitnessEvaluator) -> Self {
        Self {
            trait_set,
            evaluator,
            cache: FitnessCache::new(),
        }
    }

    pub fn decode(&self, genome: &Genome) -> Traits {
        self.trait_set.decode(genome)
    }

    pub fn encoding(&self) -> Encoding {
        self.trait_set.encoding()
    }

    pub fn genome_bits(&self) -> usize {
        self.trait_set.genome_bits()
    }

    /// Decode and score genomes, simulating each unseen trait signature once.
    /// Returns the individuals and how many simulations actually ran.
    pub fn evaluate_genomes(&self, genomes: Vec<Genome>, parallel: bool) -> (Vec<Individual>, usize) {
        let traits: Vec<Traits> = genomes.iter().map(|g| self.decode(g)).collect();

        let mut known: HashMap<TraitKey, f64> = HashMap::new();
        let mut queued: HashSet<TraitKey> = HashSet::new();
        let mut pending: Vec<Traits> = Vec::new();
        for t in &traits {
            let key = t.key();
            if known.contains_key(&key) || queued.contains(&key) {
                continue;
            }
            match self.cache.get(&key) {
                Some(fitness) => {
                    known.insert(key, fitness);
                }
                None => {
                    queued.insert(key);
                    pending.push(*t);
                }
            }
        }

        let simulated: Vec<(TraitKey, f64)> = if parallel {
            pending
                .par_iter()
                .map(|t| (t.key(), self.evaluator.evaluate(t)))
                .collect()
        } else {
            pending
                .iter()
                .map(|t| (t.key(), self.evaluator.evaluate(t)))
                .collect()
        };
        let simulations = simulated.len();
        for (key, fitness) in simulated {
            self.cache.set(key, fitness);
            known.insert(key, fitness);
        }

        let individuals = genomes
            .into_iter()
            .zip(traits)
            .map(|(genome, traits)| Individual {
                fitness: known.get(&traits.key()).copied().unwrap_or(0.0),
                genome,
                traits,
            })
            .collect();
        (individuals, simulations)
    }

    /// Decode and score genomes without touching the memo
    pub fn evaluate_uncached(&self, genomes: Vec<Genome>, parallel: bool) -> Vec<Individual> {
        let score = |genome: Genome| {
            let traits = self.decode(&genome);
            Individual {
                fitness: self.evaluator.evaluate(&traits),
                genome,
                traits,
            }
        };
        if parallel {
            genomes.into_par_iter().map(score).collect()
        } else {
            genomes.into_iter().map(score).collect()
        }
    }

    pub fn trait_set(&self) -> &TraitSet {
        &self.trait_set
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenomeConfig;

    fn context(model: FitnessModel) -> RunContext {
        let mut rng = StdRng::seed_from_u64(1);
        let trait_set = TraitSet::generate(&GenomeConfig::default(), &mut rng).unwrap();
        let config = SimulationConfig::default();
        let temperatures = TemperatureSeries::constant(18.0, config.days);
        RunContext::new(
            trait_set,
            FitnessEvaluator::new(config, temperatures, model).unwrap(),
        )
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let ctx = context(FitnessModel::Phenological);
        let traits = Traits::new(0.7, 90.0, 0.8, 2.5);
        let first = ctx.evaluator().evaluate(&traits);
        assert!(first > 0.0);
        assert_eq!(first, ctx.evaluator().evaluate(&traits));
    }

    #[test]
    fn test_invalid_simulation_config_is_rejected() {
        let config = SimulationConfig {
            seed_mass_divisor: 0.0,
            ..Default::default()
        };
        let temperatures = TemperatureSeries::constant(18.0, config.days);
        for model in [
            FitnessModel::Phenological,
            FitnessModel::Legacy(LegacyParams::default()),
        ] {
            assert!(FitnessEvaluator::new(config.clone(), temperatures.clone(), model).is_err());
        }
    }

    #[test]
    fn test_cache_counts_hits() {
        let ctx = context(FitnessModel::Phenological);
        let traits = Traits::default();
        let a = ctx.evaluator().evaluate_cached(&traits, ctx.cache());
        let b = ctx.evaluator().evaluate_cached(&traits, ctx.cache());
        assert_eq!(a, b);
        let stats = ctx.cache_stats();
        assert_eq!((stats.entries, stats.hits, stats.misses), (1, 1, 1));
    }

    #[test]
    fn test_duplicate_genomes_simulate_once() {
        let ctx = context(FitnessModel::Phenological);
        let genome: Genome = vec![1; ctx.genome_bits()];
        let (individuals, simulations) =
            ctx.evaluate_genomes(vec![genome.clone(), genome.clone(), genome], true);
        assert_eq!(simulations, 1);
        assert_eq!(individuals.len(), 3);
        assert!(individuals.iter().all(|i| i.fitness == individuals[0].fitness));

        let (_, again) = ctx.evaluate_genomes(vec![vec![1; ctx.genome_bits()]], false);
        assert_eq!(again, 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ctx = context(FitnessModel::Legacy(LegacyParams::default()));
        let mut rng = StdRng::seed_from_u64(4);
        let genomes: Vec<Genome> = (0..6)
            .map(|_| crate::engines::generation::operators::random_genome(ctx.genome_bits(), &mut rng))
            .collect();
        let parallel = ctx.evaluate_uncached(genomes.clone(), true);
        let sequential = ctx.evaluate_uncached(genomes, false);
        assert_eq!(parallel, sequential);
    }
}
