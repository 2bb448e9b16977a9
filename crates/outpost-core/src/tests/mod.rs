//! Crate-level tests that drive the full simulation.
//!
//! # Test Structure
//!
//! - `helpers.rs`: Simulation setup and clock-driving utilities
//! - `integration.rs`: End-to-end scenarios on the shipped maps
//! - `determinism.rs`: Same seed and inputs give the same world
//! - `properties.rs`: `proptest` checks of the rules that must always hold

mod determinism;
mod helpers;
mod properties;
