//! LUT Module: Quantized Vector Field
//!
//! The automaton never evaluates the continuous field. Instead the field is
//! sampled once per parameter point on the N×N lattice and turned into two
//! integer tables, `Fin` and `Gin`, holding the signed number of clock
//! firings each axis needs before stepping.
//!
//! Tables are immutable after construction and shared read-only by every
//! trajectory of a sweep.

mod export;
mod quantizer;

pub use export::{to_verilog_string, write_verilog};
pub use quantizer::Lut;
