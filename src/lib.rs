//! # ECA-Switch
//!
//! Ergodic Cellular Automaton Surrogate for a Bistable Biochemical Switch
//!
//! ## Overview
//!
//! The two-variable switch
//!
//!   τ₁ dx/dt = F(x, y; Q, S),    τ₂ dy/dt = G(x, y; Q, S)
//!
//! is replaced by a digital, hardware-realizable automaton on an N×N
//! integer lattice. The continuous flow survives only as a quantized lookup
//! table; time advances through two independent phase-accumulated clocks.
//!
//! ### Pipeline
//!
//! 1. **Quantizer** ([`lut`]): evaluate (F, G) at every lattice cell and
//!    turn each slope into a signed "ticks before stepping" count, capped
//!    at M − 1
//!
//! 2. **Kernel** ([`kernel`]): advance (X, Y, P, Q, phX, phY) tick by tick;
//!    an axis steps once its counter has matched the LUT entry
//!
//! 3. **Sweep driver** ([`sweep`]): rebuild the LUT per parameter point and
//!    run one trajectory per grid point on a thread pool
//!
//! 4. **Classifier** ([`regime`]): merge post-transient (max, min)
//!    signatures into equilibria and periodic orbits and label the point
//!    monostable, bistable, periodic, coexistence or other
//!
//! ## Example
//!
//! ```no_run
//! use eca_switch::{EcaConfig, Kernel, Lut};
//!
//! let config = EcaConfig::default();
//! let lut = Lut::build(&config)?;
//! let kernel = Kernel::from_config(&lut, &config)?;
//! let summary = kernel.run_extrema(config.initial_state())?;
//! println!("X in [{}, {}]", summary.x.min, summary.x.max);
//! # Ok::<(), eca_switch::EcaError>(())
//! ```

pub mod error;
pub mod kernel;
pub mod lut;
pub mod model;
pub mod regime;
pub mod sweep;

pub use error::{EcaError, Result};

// Re-exports from model
pub use model::{
    BifurcationPoint,
    ClockConfig,
    DynamicalSystem,
    EcaConfig,
    Lattice,
    ParameterSet,
    Protocol,
    QuantizerConfig,
    SwitchModel,
    SwitchParams,
    VectorField,
};

// Re-exports from lut
pub use lut::{to_verilog_string, write_verilog, Lut};

// Re-exports from kernel
pub use kernel::{
    Automaton,
    AutomatonState,
    AxisRange,
    Kernel,
    Outcome,
    Trajectory,
    TrajectorySummary,
};

// Re-exports from regime
pub use regime::{
    agreement_rate,
    classify_basin,
    classify_pairs,
    Attractor,
    AttractorSet,
    BasinState,
    ClassifierConfig,
    Regime,
    SignatureTable,
};

// Re-exports from sweep
pub use sweep::{
    BasinRow,
    BasinSweep,
    BifurcationRow,
    BifurcationSweep,
    CancelToken,
    ClockScan,
    ClockScanRow,
    InitialGrid,
    Nuisance,
    NuisanceGrid,
    ParamRange,
    RegionRow,
    RegionSweep,
};
