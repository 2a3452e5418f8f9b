use std::sync::Arc;

use crate::assembly::strategy::{AnnealingStrategy, GreedyStrategy, SelectionStrategy};
use crate::config::{Config, StrategyKind};

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no mutable state: every request is an independent unit of work.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable selection strategy. Default: GreedyStrategy. Swap via SELECTION_STRATEGY.
    pub strategy: Arc<dyn SelectionStrategy>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let strategy: Arc<dyn SelectionStrategy> = match config.selection_strategy {
            StrategyKind::Greedy => Arc::new(GreedyStrategy),
            StrategyKind::Annealing => Arc::new(AnnealingStrategy::new(
                config.annealing_iterations,
                config.annealing_seed,
            )),
        };
        Self { config, strategy }
    }
}
