// Assessment assembly engine.
// Implements: constraint evaluation, greedy/annealing selection, parallel forms,
// length optimization, content balance diagnostics, blueprint derivation.
// Engine functions are pure and synchronous; handlers run them via spawn_blocking.

pub mod assembler;
pub mod balance;
pub mod blueprint;
pub mod evaluator;
pub mod handlers;
pub mod length;
pub mod parallel;
pub mod scoring;
pub mod strategy;
pub mod validation;
