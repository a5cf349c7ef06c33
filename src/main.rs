//! Wind farm layout CLI - Run a layout search from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;

use windfarm_ga::{
    EvolutionEngine,
    schema::{ConfigLoadError, EvolutionConfig, EvolutionResult},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [result.json]", args[0]);
        eprintln!();
        eprintln!("Search for a wind farm layout from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to search configuration file");
        eprintln!("  result.json  Where to write the full result (optional)");
        eprintln!();
        eprintln!("Print an example configuration with --example [fixed].");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config(args.get(2).is_some_and(|a| a == "fixed"));
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let result_path = args.get(2).map(PathBuf::from);

    let config = EvolutionConfig::from_json_file(&config_path).unwrap_or_else(|e| {
        match e {
            ConfigLoadError::Invalid(err) => {
                eprintln!("----- Invalid configuration -----");
                for violation in &err.violations {
                    eprintln!("  - {}", violation);
                }
            }
            other => eprintln!("Error loading config: {}", other),
        }
        std::process::exit(1);
    });

    let grid = config.grid();
    println!("Wind Farm Layout Search");
    println!("=======================");
    println!(
        "Grid: {} rows x {} columns ({} cells)",
        grid.rows(),
        grid.columns(),
        grid.cell_count()
    );
    println!("Variant: {:?}", config.variant);
    println!(
        "Population: {}, generation cap: {}",
        config.population.size, config.population.max_generations
    );
    println!();

    let mut engine = EvolutionEngine::new(config.clone()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let cap = config.population.max_generations;
    let result = engine.run_with_callback(|progress| {
        if progress.generation % (cap / 10).max(1) == 0 {
            println!(
                "  Generation {}/{}: fitness={:.6}, power={:.4} kW, turbines={}",
                progress.generation,
                progress.total_generations,
                progress.best_fitness,
                progress.best_power,
                progress.best_turbine_count
            );
        }
    });

    print_summary(&result);

    if let Some(path) = result_path {
        let json = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            eprintln!("Error serializing result: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = fs::write(&path, json) {
            eprintln!("Error writing {}: {}", path.display(), e);
            std::process::exit(1);
        }
        println!("Result written to {}", path.display());
    }
}

fn print_summary(result: &EvolutionResult) {
    let best = &result.best;
    let stats = &result.stats;

    println!();
    println!("Winner layout:");
    println!("  Evolved:           {} times", stats.generations);
    println!("  Stop reason:       {:?}", stats.stop_reason);
    println!("  Cells:             {:?}", best.cells);
    println!("  Columns:           {:?}", best.columns);
    println!("  Power:             {:.4} kW", best.power);
    println!("  Max power:         {:.4} kW", best.max_power);
    println!("  Efficiency:        {:.2} %", 100.0 * best.efficiency);
    println!("  Turbines:          {}", best.turbine_count);
    if let (Some(cost), Some(ratio)) = (best.cost, best.cost_power_ratio) {
        println!("  Cost:              {:.6}", cost);
        println!("  Cost / power:      {:.8}", ratio);
    }
    println!(
        "  Cutoff efficiency: {:.2} %",
        100.0 * stats.cutoff_efficiency
    );
    println!();
    println!(
        "History: {} generations, last best fitness {:.8}",
        result.history.best_fitness.len(),
        result.history.best_fitness.last().copied().unwrap_or(f64::NAN)
    );
    println!(
        "Time: {:.2}s ({} evaluations)",
        stats.elapsed_seconds, stats.total_evaluations
    );
}

fn print_example_config(fixed: bool) {
    let config = if fixed {
        EvolutionConfig::fixed_count()
    } else {
        EvolutionConfig::default()
    };

    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing example config: {}", e);
            std::process::exit(1);
        }
    }
}
