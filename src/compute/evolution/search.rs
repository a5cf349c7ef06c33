//! Generational search over turbine layouts.

use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::compute::{Grid, Layout, PowerModel, WakeModel};
use crate::schema::{
    ConfigError, EvolutionConfig, EvolutionHistory, EvolutionProgress, EvolutionResult,
    EvolutionStats, LayoutSnapshot, StopReason,
};

use super::fitness::{FitnessPolicy, LayoutEvaluation};
use super::genome::{LayoutRng, VariationPolicy};

/// Evolution engine that runs the search.
///
/// Each generation after the first is built from the previous, ranked one:
/// the elite slice copied unchanged, the crossover slice recombined and
/// mutated, and a block of fresh random layouts. The search stops once the
/// best layout exceeds the cutoff fraction of its wake-free power, or when
/// the generation cap is reached.
pub struct EvolutionEngine<M: PowerModel = WakeModel> {
    config: EvolutionConfig,
    grid: Grid,
    model: M,
    fitness: FitnessPolicy,
    variation: VariationPolicy,
    rng: LayoutRng,
    population: Vec<LayoutEvaluation>,
    history: EvolutionHistory,
    generation: usize,
    evaluations: u64,
}

impl EvolutionEngine<WakeModel> {
    /// Create an engine scored by the wake model.
    pub fn new(config: EvolutionConfig) -> Result<Self, ConfigError> {
        let model = WakeModel::from_config(&config);
        Self::with_power_model(config, model)
    }
}

impl<M: PowerModel> EvolutionEngine<M> {
    /// Create an engine scored by any power model.
    ///
    /// Refuses configurations that break any validation rule.
    pub fn with_power_model(config: EvolutionConfig, model: M) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.random_seed {
            Some(seed) => LayoutRng::new(seed),
            None => LayoutRng::random(),
        };

        Ok(Self {
            grid: config.grid(),
            fitness: FitnessPolicy::for_variant(&config.variant),
            variation: VariationPolicy::for_variant(&config.variant),
            config,
            model,
            rng,
            population: Vec::new(),
            history: EvolutionHistory::default(),
            generation: 0,
            evaluations: 0,
        })
    }

    /// Replace the random source.
    pub fn with_rng(mut self, rng: LayoutRng) -> Self {
        self.rng = rng;
        self
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Current population, best first.
    #[inline]
    pub fn population(&self) -> &[LayoutEvaluation] {
        &self.population
    }

    /// Best layout of the current generation.
    #[inline]
    pub fn best(&self) -> Option<&LayoutEvaluation> {
        self.population.first()
    }

    /// Generations produced beyond generation 0.
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Build, evaluate and rank generation 0 from random layouts.
    pub fn initialize(&mut self) {
        self.generation = 0;
        self.evaluations = 0;
        self.history = EvolutionHistory::default();

        let layouts = self.random_layouts(self.config.population.size);
        self.population = self.evaluate(layouts);
        self.fitness.rank(&mut self.population);
        self.record();
    }

    /// Produce, evaluate and rank the next generation.
    pub fn step_generation(&mut self) {
        let population = &self.config.population;
        let elite_count = population.elite_count().min(self.population.len());
        let crossover_count = population.crossover_count().min(self.population.len());
        let random_count = population.random_count();

        let mut next: Vec<LayoutEvaluation> =
            Vec::with_capacity(elite_count + crossover_count + random_count);

        // Elitism: the occupancy is unchanged, so the evaluation carries over.
        next.extend(self.population[..elite_count].iter().cloned());

        let mut offspring: Vec<Layout> = self.population[..crossover_count]
            .iter()
            .map(|candidate| candidate.layout().clone())
            .collect();
        if !self.variation.recombine(&mut self.rng, &mut offspring) {
            warn!(
                "crossover slice of {} layouts cannot be paired; passing it through",
                crossover_count
            );
            next.extend(self.population[..crossover_count].iter().cloned());
            offspring.clear();
        }

        offspring.extend(self.random_layouts(random_count));
        next.extend(self.evaluate(offspring));

        self.fitness.rank(&mut next);
        self.population = next;
        self.generation += 1;
        self.record();
    }

    fn random_layouts(&mut self, count: usize) -> Vec<Layout> {
        let cell_count = self.grid.cell_count();
        (0..count)
            .map(|_| self.rng.random_layout(&self.config.variant, cell_count))
            .collect()
    }

    /// Evaluate layouts in parallel. Output order matches input order.
    fn evaluate(&mut self, layouts: Vec<Layout>) -> Vec<LayoutEvaluation> {
        self.evaluations += layouts.len() as u64;
        let model = &self.model;
        let policy = self.fitness;

        layouts
            .into_par_iter()
            .map(|layout| policy.evaluate(layout, model))
            .collect()
    }

    fn record(&mut self) {
        if let Some(best) = self.population.first() {
            self.history.best_fitness.push(best.fitness());
            self.history.best_power.push(best.power());
            debug!(
                "generation {}: best fitness {:.6}, power {:.4} kW, {} turbines",
                self.generation,
                best.fitness(),
                best.power(),
                best.turbine_count()
            );
        }
    }

    /// Wake-free power of the best layout's turbines.
    fn theoretical_max_power(&self, best: &LayoutEvaluation) -> f64 {
        let turbines = self
            .config
            .variant
            .fixed_turbine_count()
            .unwrap_or(best.turbine_count());
        turbines as f64 * self.model.free_stream_turbine_power()
    }

    /// Whether the current best layout exceeds the cutoff efficiency.
    pub fn reached_cutoff(&self) -> bool {
        self.best().is_some_and(|best| {
            best.power() > self.config.cutoff_efficiency * self.theoretical_max_power(best)
        })
    }

    /// Check if evolution should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.reached_cutoff() {
            return Some(StopReason::CutoffReached);
        }

        if self.generation >= self.config.population.max_generations {
            return Some(StopReason::MaxGenerations);
        }

        None
    }

    /// Get current progress.
    pub fn progress(&self) -> EvolutionProgress {
        let best = self.best();
        EvolutionProgress {
            generation: self.generation,
            total_generations: self.config.population.max_generations,
            best_fitness: best.map_or(f64::NAN, LayoutEvaluation::fitness),
            best_power: best.map_or(0.0, LayoutEvaluation::power),
            best_turbine_count: best.map_or(0, LayoutEvaluation::turbine_count),
            population_size: self.population.len(),
        }
    }

    /// Snapshot of the current best layout.
    ///
    /// Before initialization this is an empty layout scored by the fitness policy.
    pub fn best_snapshot(&self) -> LayoutSnapshot {
        let turbine_power = self.model.free_stream_turbine_power();
        match self.best() {
            Some(best) => best.to_snapshot(&self.grid, turbine_power),
            None => self
                .fitness
                .evaluate(Layout::empty(self.grid.cell_count()), &self.model)
                .to_snapshot(&self.grid, turbine_power),
        }
    }

    /// Run evolution with progress callback.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> EvolutionResult
    where
        F: FnMut(&EvolutionProgress),
    {
        let start_time = Instant::now();
        info!(
            "starting layout search on a {}x{} grid ({:?}), population {}, cap {}",
            self.grid.rows(),
            self.grid.columns(),
            self.config.variant,
            self.config.population.size,
            self.config.population.max_generations
        );

        self.initialize();
        callback(&self.progress());

        let stop_reason = loop {
            if let Some(reason) = self.should_stop() {
                break reason;
            }

            self.step_generation();
            callback(&self.progress());
        };

        let elapsed = start_time.elapsed().as_secs_f64();
        let best = self.best_snapshot();

        info!(
            "search stopped after {} generations ({:?}): power {:.4} kW, {} turbines",
            self.generation, stop_reason, best.power, best.turbine_count
        );

        EvolutionResult {
            best,
            stats: EvolutionStats {
                generations: self.generation,
                total_evaluations: self.evaluations,
                elapsed_seconds: elapsed,
                cutoff_efficiency: self.config.cutoff_efficiency,
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Run evolution (blocking).
    pub fn run(&mut self) -> EvolutionResult {
        self.run_with_callback(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FarmConfig, LayoutVariant, PopulationConfig};

    fn small_config(variant: LayoutVariant, max_generations: usize) -> EvolutionConfig {
        EvolutionConfig {
            farm: FarmConfig {
                width: 400.0,
                height: 500.0,
                rotor_diameter: 50.0,
                horizontal_spacing: 2.0,
                vertical_spacing: 2.0,
                ..Default::default()
            },
            variant,
            population: PopulationConfig {
                size: 20,
                max_generations,
                elite_rate: 0.1,
                crossover_rate: 0.4,
            },
            random_seed: Some(42),
            ..Default::default()
        }
    }

    /// Full wake-free power only when cell 0 holds a turbine, half otherwise.
    struct CornerModel;

    impl PowerModel for CornerModel {
        fn farm_power(&self, layout: &Layout) -> f64 {
            let full = layout.turbine_count() as f64 * self.free_stream_turbine_power();
            if layout.is_occupied(0) { full } else { full / 2.0 }
        }

        fn free_stream_turbine_power(&self) -> f64 {
            100.0
        }
    }

    /// Never better than half the wake-free power.
    struct HalfModel;

    impl PowerModel for HalfModel {
        fn farm_power(&self, layout: &Layout) -> f64 {
            layout.turbine_count() as f64 * 50.0
        }

        fn free_stream_turbine_power(&self) -> f64 {
            100.0
        }
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let mut config = small_config(LayoutVariant::VariableCount, 5);
        config.population.size = 15;
        config.population.max_generations = 1;
        let err = EvolutionEngine::new(config).err().unwrap();
        assert_eq!(err.violations.len(), 2);
    }

    #[test]
    fn test_best_snapshot_before_and_after_run() {
        let config = small_config(LayoutVariant::FixedCount { turbine_count: 4 }, 3);
        let mut engine = EvolutionEngine::with_power_model(config, HalfModel).unwrap();

        let empty = engine.best_snapshot();
        assert_eq!(empty.turbine_count, 0);
        assert_eq!(empty.power, 0.0);
        assert_eq!(empty.cells.len(), 20);

        let result = engine.run();
        assert_eq!(engine.best_snapshot().cells, result.best.cells);
        assert_eq!(result.best.turbine_count, 4);
    }

    #[test]
    fn test_initialize() {
        let mut engine = EvolutionEngine::new(small_config(LayoutVariant::VariableCount, 5)).unwrap();
        engine.initialize();

        assert_eq!(engine.grid().rows(), 5);
        assert_eq!(engine.grid().columns(), 4);
        assert_eq!(engine.population().len(), 20);
        assert_eq!(engine.generation(), 0);
        let fitness: Vec<f64> = engine.population().iter().map(|c| c.fitness()).collect();
        assert!(fitness.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_generation_composition() {
        let mut engine = EvolutionEngine::new(small_config(LayoutVariant::VariableCount, 5)).unwrap();
        engine.initialize();
        let best_before = engine.best().unwrap().layout().clone();

        engine.step_generation();
        // 2 elites + 8 recombined + 10 random
        assert_eq!(engine.population().len(), 20);
        assert_eq!(engine.generation(), 1);
        assert!(
            engine
                .population()
                .iter()
                .any(|c| c.layout() == &best_before)
        );
    }

    #[test]
    fn test_run_to_generation_cap() {
        let config = small_config(LayoutVariant::FixedCount { turbine_count: 4 }, 6);
        let mut engine = EvolutionEngine::with_power_model(config, HalfModel).unwrap();
        let mut reported = Vec::new();
        let result = engine.run_with_callback(|p| reported.push(p.generation));

        assert_eq!(result.stats.stop_reason, StopReason::MaxGenerations);
        assert_eq!(result.stats.generations, 6);
        assert_eq!(result.history.best_fitness.len(), 7);
        assert_eq!(reported, vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(result.best.turbine_count, 4);
    }

    #[test]
    fn test_cutoff_stops_early() {
        let config = small_config(LayoutVariant::FixedCount { turbine_count: 3 }, 200);
        let mut engine = EvolutionEngine::with_power_model(config, CornerModel).unwrap();
        let result = engine.run();

        assert_eq!(result.stats.stop_reason, StopReason::CutoffReached);
        assert!(result.stats.generations < 200);
        assert_eq!(result.history.best_fitness.len(), result.stats.generations + 1);
        assert_eq!(result.best.power, 300.0);
        assert_eq!(result.best.cells[0], 1);
        assert!((result.best.efficiency - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cutoff_uses_best_turbine_count_when_free() {
        let config = small_config(LayoutVariant::VariableCount, 200);
        let mut engine = EvolutionEngine::with_power_model(config, CornerModel).unwrap();
        let result = engine.run();

        assert_eq!(result.stats.stop_reason, StopReason::CutoffReached);
        assert_eq!(result.best.cells[0], 1);
        assert_eq!(
            result.best.power,
            result.best.turbine_count as f64 * 100.0
        );
    }

    #[test]
    fn test_fixed_count_holds_across_generations() {
        let config = small_config(LayoutVariant::FixedCount { turbine_count: 5 }, 10);
        let mut engine = EvolutionEngine::new(config).unwrap();
        engine.initialize();
        for _ in 0..10 {
            engine.step_generation();
            assert!(engine.population().iter().all(|c| c.turbine_count() == 5));
        }
    }

    #[test]
    fn test_elitism_is_monotone() {
        let mut engine = EvolutionEngine::new(small_config(LayoutVariant::VariableCount, 15)).unwrap();
        let result = engine.run();
        let history = &result.history.best_fitness;
        assert!(history.windows(2).all(|w| w[1] <= w[0]));

        let config = small_config(LayoutVariant::FixedCount { turbine_count: 6 }, 15);
        let result = EvolutionEngine::new(config).unwrap().run();
        let history = &result.history.best_fitness;
        assert!(history.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            EvolutionEngine::new(small_config(LayoutVariant::VariableCount, 8))
                .unwrap()
                .run()
        };
        let first = run();
        let second = run();
        assert_eq!(first.history.best_fitness, second.history.best_fitness);
        assert_eq!(first.best.cells, second.best.cells);
        assert_eq!(first.stats.total_evaluations, second.stats.total_evaluations);
    }

    #[test]
    fn test_odd_crossover_slice_passes_through() {
        let mut config = small_config(LayoutVariant::VariableCount, 5);
        config.population = PopulationConfig {
            size: 10,
            max_generations: 5,
            elite_rate: 0.2,
            crossover_rate: 0.3,
        };
        let mut engine = EvolutionEngine::with_power_model(config, HalfModel).unwrap();
        engine.initialize();
        let top_three: Vec<Layout> = engine.population()[..3]
            .iter()
            .map(|c| c.layout().clone())
            .collect();

        engine.step_generation();
        // 2 elites + 3 passed through + 5 random
        assert_eq!(engine.population().len(), 10);
        for layout in &top_three {
            assert!(engine.population().iter().any(|c| c.layout() == layout));
        }
    }
}
