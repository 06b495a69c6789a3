//! Kernel Module: Discrete-Time Evolution
//!
//! Each automaton is a pair of independently clocked leaky integrators on
//! the N×N lattice. An axis only votes to move when its own phase clock
//! fires, and only moves once the number of votes matches the quantized
//! slope in the LUT: a fixed-point analogue of explicit Euler integration
//! with slope-dependent, axis-asynchronous step timing.
//!
//! The kernel is deterministic and single-threaded per trajectory.
//! Parallelism lives in [`crate::sweep`].

mod automaton;
mod evolution;

pub use automaton::{Automaton, AutomatonState, AxisRange};
pub use evolution::{Kernel, Outcome, Trajectory, TrajectorySummary};
