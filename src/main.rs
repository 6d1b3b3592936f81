use anyhow::{Context, Result};
use cropgen::config::ConfigManager;
use cropgen::data::TemperatureCsvConnector;
use cropgen::engines::evaluation::{FitnessEvaluator, FitnessModel, RunContext};
use cropgen::engines::generation::{
    BaselineEngine, ConsoleProgressCallback, EvolutionEngine, OptimizationResult, TraitSet,
};
use cropgen::engines::simulation::TemperatureSeries;
use cropgen::report::RunReport;
use cropgen::types::SimulationOutput;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

const USAGE: &str = "usage: cropgen [--json] [config.toml] [temperatures.csv]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut json = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => positional.push(arg),
        }
    }
    if positional.len() > 2 {
        anyhow::bail!(USAGE);
    }
    let config_path = positional.first().cloned();
    let csv_path = positional.get(1).cloned();

    let manager = ConfigManager::new();
    manager
        .load_layered(config_path.as_deref())
        .context("Failed to load configuration")?;
    let config = manager.get();

    let sim = &config.simulation;
    let (temperatures, summary) = match &csv_path {
        Some(path) => {
            let (series, summary) = TemperatureCsvConnector::load(path, sim.fallback_temperature)
                .with_context(|| format!("Failed to load temperatures from {}", path))?;
            info!(
                "loaded {} days from column '{}' ({:.1}..{:.1} °C)",
                summary.days, summary.column, summary.min, summary.max
            );
            (series, Some(summary))
        }
        None => {
            info!(
                "no temperature file, using a constant {:.1} °C",
                sim.fallback_temperature
            );
            (TemperatureSeries::constant(sim.fallback_temperature, sim.days), None)
        }
    };

    let mut rng = match config.evolution.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let trait_set = TraitSet::generate(&config.genome, &mut rng)?;
    let evaluator = FitnessEvaluator::new(sim.clone(), temperatures, FitnessModel::Phenological)?;

    let baseline = BaselineEngine::new(
        config.evolution.clone(),
        RunContext::new(trait_set.clone(), evaluator.clone()),
    )?
    .run(ConsoleProgressCallback::new("baseline", 20))?;

    let mut engine = EvolutionEngine::new(
        config.evolution.clone(),
        RunContext::new(trait_set, evaluator),
    )?;
    let elitist = engine.run(ConsoleProgressCallback::new("elitist", 20))?;
    let best_simulation = engine.context().evaluator().simulate(&elitist.best.traits);

    let mut report = RunReport::new(
        config.clone(),
        elitist,
        best_simulation,
        engine.context().cache_stats(),
    )
    .with_baseline(baseline);
    if let Some(summary) = summary {
        report = report.with_temperatures(summary);
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_comparison(&report);
        print_daily_trace(&report.best_simulation);
    }

    Ok(())
}

fn print_result(label: &str, result: &OptimizationResult) {
    let final_diversity = result.diversity_history.last().copied().unwrap_or(0.0);
    println!(
        "{:<9} yield {:>8.3}  simulations {:>6}  final diversity {:.3}",
        label, result.best.fitness, result.simulations, final_diversity
    );
    println!("          {}", result.best.traits);
}

fn print_comparison(report: &RunReport) {
    println!("=== Optimization ===");
    if let Some(baseline) = &report.baseline {
        print_result("baseline", baseline);
    }
    print_result("elitist", &report.elitist);
    if let Some(delta) = report.improvement() {
        println!("improvement over baseline: {:+.3}", delta);
    }
    println!(
        "fitness cache: {} entries, {} hits, {} misses",
        report.cache.entries, report.cache.hits, report.cache.misses
    );
}

fn print_daily_trace(output: &SimulationOutput) {
    println!();
    println!("=== Best plant ===");
    println!(
        "{:>4} {:>5} {:>10} {:>6} {:>5} {:>10} {:>9}",
        "day", "stage", "height_cm", "leaves", "buds", "biomass_g", "yield_g"
    );
    for r in &output.records {
        println!(
            "{:>4} {:>5} {:>10.2} {:>6} {:>5} {:>10.3} {:>9.3}",
            r.day,
            r.stage.value(),
            r.stem_height,
            r.leaf_count,
            r.bud_count,
            r.total_biomass,
            r.yield_total
        );
    }
    match output.terminal_day {
        Some(day) => println!("maturity reached on day {}", day),
        None => println!("maturity not reached"),
    }
}
