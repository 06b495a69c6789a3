//! Regime Module: Attractor Merging and Classification
//!
//! Reduces per-trajectory (max, min) signatures to a small canonical set of
//! equilibria and periodic orbits, then labels the analysis unit:
//!
//! | equilibria | orbits | regime       | state |
//! |-----------:|-------:|--------------|------:|
//! | 1          | 0      | monostable   | 1     |
//! | 2          | 0      | bistable     | 2     |
//! | 0          | 1      | periodic     | 3     |
//! | 1          | 1      | coexistence  | 4     |
//! | otherwise  |        | other        | 5     |
//!
//! The same merge is used by every sweep; only the tolerances in
//! [`ClassifierConfig`] change between integer and continuous data.

mod attractor;
mod classifier;

pub use attractor::{Attractor, AttractorSet};
pub use classifier::{
    agreement_rate, classify_basin, classify_pairs, BasinState, ClassifierConfig, Regime,
    SignatureTable,
};
