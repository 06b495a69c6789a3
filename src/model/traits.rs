//! Model Traits: Shared API for the Continuous Field and the Automaton
//!
//! Two seams separate the pipeline stages:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │  VectorField        continuous RHS (F, G) at (x, y)        │
//! │      │                                                     │
//! │      ▼  quantized once per parameter point                 │
//! │  Lut ──────────────► DynamicalSystem (automaton, per tick) │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The quantizer only needs [`VectorField`]; anything stepping in discrete
//! time implements [`DynamicalSystem`].

/// Two-dimensional autonomous vector field on normalized coordinates
pub trait VectorField {
    /// Evaluate (dx/dt, dy/dt) at the normalized point (x, y)
    fn eval(&self, x: f64, y: f64) -> (f64, f64);
}

/// Discrete-time system advanced one tick at a time
pub trait DynamicalSystem {
    /// State type for this system
    type State;

    /// Advance system by one tick
    fn step(&mut self);

    /// Run multiple ticks
    fn run(&mut self, n_steps: usize) {
        for _ in 0..n_steps {
            self.step();
        }
    }

    /// Get current state snapshot
    fn state(&self) -> Self::State;
}
