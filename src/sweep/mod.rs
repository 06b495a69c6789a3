//! Sweep Module: Parallel Parameter and Initial-Condition Sweeps
//!
//! - **Bifurcation**: S varies against a fixed grid of initial conditions
//! - **Parameter region**: (S, Q) cells, each classified into a regime
//! - **Attraction basin**: one parameter point, initial conditions crossed
//!   with hidden-state (P, Q, phX, phY) settings
//! - **Clock scan**: region maps over axis clock periods, scored against a
//!   reference map

mod driver;
mod grid;

pub use driver::{
    BasinRow, BasinSweep, BifurcationRow, BifurcationSweep, CancelToken, ClockScan, ClockScanRow,
    RegionRow, RegionSweep,
};
pub use grid::{InitialGrid, Nuisance, NuisanceGrid, ParamRange};
