use crate::engines::generation::genome::Individual;
use crate::types::TraitKey;

use std::collections::HashSet;

/// Best distinct plants seen across a run, fittest first
pub struct HallOfFame {
    individuals: Vec<Individual>,
    max_size: usize,
    seen_signatures: HashSet<TraitKey>,
}

impl HallOfFame {
    pub fn new(max_size: usize) -> Self {
        Self {
            individuals: Vec::new(),
            max_size: max_size.max(1),
            seen_signatures: HashSet::new(),
        }
    }

    /// Attempt to add an individual; plants already present by trait
    /// signature are rejected
    pub fn try_add(&mut self, individual: Individual) -> bool {
        let signature = individual.traits.key();
        if self.seen_signatures.contains(&signature) {
            return false;
        }

        self.seen_signatures.insert(signature);
        self.individuals.push(individual);
        self.sort_and_trim();
        true
    }

    fn sort_and_trim(&mut self) {
        self.individuals.sort_by(|a, b| {
            b.fitness.partial_cmp(&a.fitness).unwrap_or(std::cmp::Ordering::Equal)
        });

        while self.individuals.len() > self.max_size {
            if let Some(removed) = self.individuals.pop() {
                self.seen_signatures.remove(&removed.traits.key());
            }
        }
    }

    /// The elite: fittest plant seen so far
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    pub fn get_top_n(&self, n: usize) -> &[Individual] {
        &self.individuals[..n.min(self.individuals.len())]
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }
}
