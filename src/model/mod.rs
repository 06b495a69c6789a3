//! Model Module: the Continuous Switch and its Configuration
//!
//! - **Switch**: the rational two-variable vector field and its parameter
//!   presets
//! - **Config**: the flat parameter record plus the typed lattice, clock,
//!   quantizer and protocol settings derived from it
//! - **Traits**: the seams between field, quantizer and automaton

mod config;
mod switch;
mod traits;

pub use config::{ClockConfig, EcaConfig, Lattice, Protocol, QuantizerConfig};
pub use switch::{BifurcationPoint, ParameterSet, SwitchModel, SwitchParams};
pub use traits::{DynamicalSystem, VectorField};
