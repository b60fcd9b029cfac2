pub mod conflict;
pub mod consistency;
pub mod domain;
pub mod engine;
pub mod generate;
pub mod grid;
pub mod heuristics;
pub mod propagate;
pub mod stats;
pub mod strategies;
pub mod strategy;
