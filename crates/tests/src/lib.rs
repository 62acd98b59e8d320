//! Integration test harness for Gatework.
//!
//! This crate provides utilities for end-to-end testing of the full
//! pipeline: Registry → Instantiate → Simulate → Verify.

use std::sync::Arc;

use gatework_runtime::{Gate, Simulation, TemplateRegistry};
use gatework_types::Value;

/// Registry shipped with the `gatework-run` binary.
pub const DEFAULT_GATES: &str = include_str!("../../gatework-run/circuits/default-gates.json");

/// Load the bundled registry.
///
/// # Panics
///
/// Panics if the bundled document is invalid.
pub fn default_registry() -> Arc<TemplateRegistry> {
    Arc::new(TemplateRegistry::from_json(DEFAULT_GATES).expect("bundled registry is invalid"))
}

/// Test harness driving one root gate.
pub struct TestHarness {
    simulation: Simulation,
}

impl TestHarness {
    /// Create a harness rooted at `gate` from the bundled registry.
    ///
    /// # Panics
    ///
    /// Panics if the gate cannot be instantiated.
    pub fn new(gate: &str) -> Self {
        Self::with_registry(&default_registry(), gate)
    }

    /// Create a harness rooted at `gate` from `registry`.
    ///
    /// # Panics
    ///
    /// Panics if the gate cannot be instantiated.
    pub fn with_registry(registry: &Arc<TemplateRegistry>, gate: &str) -> Self {
        let root = Gate::from_template(gate, registry)
            .unwrap_or_else(|e| panic!("failed to instantiate `{gate}`: {e}"));
        Self::from_gate(root)
    }

    /// Wrap an already built root gate.
    ///
    /// # Panics
    ///
    /// Panics if the host links cannot be bound.
    pub fn from_gate(root: Gate) -> Self {
        let simulation = Simulation::new(root).expect("failed to bind host links");
        Self { simulation }
    }

    /// Drive the root input with a value literal such as `[1, 0]`.
    ///
    /// # Panics
    ///
    /// Panics if the literal does not parse or fit the root input.
    pub fn set_input(&mut self, literal: &str) {
        let value: Value = literal.parse().expect("invalid value literal");
        self.simulation.set_input(value).expect("input rejected");
    }

    /// Execute a single tick.
    pub fn tick(&mut self) {
        self.simulation.tick();
    }

    /// Execute multiple ticks.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Root output after the last tick.
    pub fn output(&self) -> Option<&Value> {
        self.simulation.output()
    }

    /// Root output flattened to its bits, empty when there is none.
    pub fn output_bits(&self) -> Vec<bool> {
        self.output().map(Value::leaves).unwrap_or_default()
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.simulation.tick_count()
    }

    pub fn root(&self) -> &Gate {
        self.simulation.root()
    }

    pub fn root_mut(&mut self) -> &mut Gate {
        self.simulation.root_mut()
    }
}
