//! Regime labels for parameter points and initial conditions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::attractor::{Attractor, AttractorSet};
use crate::error::{EcaError, Result};
use crate::kernel::TrajectorySummary;
use crate::model::BifurcationPoint;

/// Merge tolerances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Largest `max − min` still counted as an equilibrium
    pub spread_threshold: f64,
    /// Two boxes whose bounds both differ by at most this much merge
    pub proximity: f64,
    /// Unique signatures kept per analysis unit
    pub max_signatures: usize,
}

impl ClassifierConfig {
    /// Tolerances for continuous-valued (max, min) data
    pub fn continuous() -> Self {
        Self {
            spread_threshold: 0.005,
            proximity: 0.015,
            max_signatures: 10,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.spread_threshold.is_finite() && self.spread_threshold >= 0.0) {
            return Err(EcaError::config(format!(
                "spread_threshold must be non-negative, got {}",
                self.spread_threshold
            )));
        }
        if !(self.proximity.is_finite() && self.proximity >= 0.0) {
            return Err(EcaError::config(format!(
                "proximity must be non-negative, got {}",
                self.proximity
            )));
        }
        if self.max_signatures == 0 {
            return Err(EcaError::config("max_signatures must be >= 1"));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            spread_threshold: 4.0,
            proximity: 1.0,
            max_signatures: 10,
        }
    }
}

/// Classification of a parameter point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Monostable = 1,
    Bistable = 2,
    Periodic = 3,
    Coexistence = 4,
    Other = 5,
}

impl Regime {
    /// e equilibria and p periodic orbits
    pub fn from_counts(e: usize, p: usize) -> Self {
        match (e, p) {
            (1, 0) => Regime::Monostable,
            (2, 0) => Regime::Bistable,
            (0, 1) => Regime::Periodic,
            (1, 1) => Regime::Coexistence,
            _ => Regime::Other,
        }
    }

    /// Numeric `state` column value
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Regime::Monostable),
            2 => Some(Regime::Bistable),
            3 => Some(Regime::Periodic),
            4 => Some(Regime::Coexistence),
            5 => Some(Regime::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Regime::Monostable => "monostable",
            Regime::Bistable => "bistable",
            Regime::Periodic => "periodic",
            Regime::Coexistence => "coexistence",
            Regime::Other => "other",
        }
    }
}

/// Which canonical attractor an initial condition reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasinState {
    FirstEquilibrium = 1,
    SecondEquilibrium = 2,
    PeriodicOrbit = 3,
    /// Hidden-state sensitive, diverged, or beyond the tracked attractors
    Other = 4,
}

impl BasinState {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Sorted unique (max, min) signatures of one analysis unit
///
/// At most `max_signatures` pairs are kept; slots past the end read as
/// absent and take no part in merging or counting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureTable {
    pairs: Vec<(f64, f64)>,
    diverged: usize,
}

impl SignatureTable {
    /// Non-finite pairs are dropped
    pub fn from_pairs<I>(pairs: I, max_signatures: usize) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut pairs: Vec<(f64, f64)> = pairs
            .into_iter()
            .filter(|(max, min)| max.is_finite() && min.is_finite())
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        pairs.dedup();
        pairs.truncate(max_signatures);
        Self { pairs, diverged: 0 }
    }

    /// X signatures of completed runs; diverged runs are only counted
    pub fn from_summaries(summaries: &[TrajectorySummary], max_signatures: usize) -> Self {
        let diverged = summaries.iter().filter(|s| s.diverged()).count();
        let completed = summaries
            .iter()
            .filter(|s| !s.diverged())
            .map(|s| (s.x.max as f64, s.x.min as f64));
        Self {
            diverged,
            ..Self::from_pairs(completed, max_signatures)
        }
    }

    /// Count `count` more diverged runs
    pub fn with_diverged(mut self, count: usize) -> Self {
        self.diverged += count;
        self
    }

    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    /// Pair in slot `i`, `None` when absent
    pub fn slot(&self, i: usize) -> Option<(f64, f64)> {
        self.pairs.get(i).copied()
    }

    pub fn diverged(&self) -> usize {
        self.diverged
    }

    pub fn attractors(&self, config: &ClassifierConfig) -> AttractorSet {
        let divergence = (self.diverged > 0).then_some(Attractor::Diverged);
        let signatures = self
            .pairs
            .iter()
            .map(|&(max, min)| Attractor::classify(max, min, config))
            .chain(divergence);
        AttractorSet::from_attractors(signatures, config.proximity)
    }

    pub fn regime(&self, config: &ClassifierConfig) -> Regime {
        self.attractors(config).regime()
    }
}

/// Label a set of raw (max, min) pairs
pub fn classify_pairs<I>(pairs: I, config: &ClassifierConfig) -> Regime
where
    I: IntoIterator<Item = (f64, f64)>,
{
    SignatureTable::from_pairs(pairs, config.max_signatures).regime(config)
}

/// Basin label per initial condition from its runs across the nuisance grid
///
/// All runs of every initial condition feed one shared attractor set. An
/// initial condition is labeled by the member its runs reach, provided they
/// all reach the same one.
pub fn classify_basin(runs: &[Vec<Attractor>], config: &ClassifierConfig) -> Vec<BasinState> {
    // integer signatures repeat heavily; merge each distinct one once
    let mut distinct: Vec<Attractor> = Vec::new();
    let mut index: HashMap<SignatureKey, usize> = HashMap::new();
    let assigned: Vec<Vec<usize>> = runs
        .iter()
        .map(|ic_runs| {
            ic_runs
                .iter()
                .map(|a| {
                    *index.entry(SignatureKey::of(a)).or_insert_with(|| {
                        distinct.push(*a);
                        distinct.len() - 1
                    })
                })
                .collect()
        })
        .collect();

    let set = AttractorSet::from_attractors(distinct, config.proximity);
    debug!(
        equilibria = set.equilibria().count(),
        orbits = set.periodic_orbits().count(),
        "basin attractor set"
    );

    assigned
        .iter()
        .map(|ids| {
            let mut members = ids.iter().map(|&i| set.member_of(i));
            let first = match members.next() {
                Some(Some(m)) => m,
                _ => return BasinState::Other,
            };
            if members.any(|m| m != Some(first)) {
                return BasinState::Other;
            }
            membership_state(&set, first)
        })
        .collect()
}

/// Hashable identity of an attractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SignatureKey {
    Equilibrium(u64, u64),
    PeriodicOrbit(u64, u64),
    Diverged,
}

impl SignatureKey {
    fn of(a: &Attractor) -> Self {
        match *a {
            Attractor::Equilibrium { max, min } => {
                SignatureKey::Equilibrium(max.to_bits(), min.to_bits())
            }
            Attractor::PeriodicOrbit { max, min } => {
                SignatureKey::PeriodicOrbit(max.to_bits(), min.to_bits())
            }
            Attractor::Diverged => SignatureKey::Diverged,
        }
    }
}

fn membership_state(set: &AttractorSet, member: usize) -> BasinState {
    match (set.get(member), set.rank_within_kind(member)) {
        (Some(Attractor::Equilibrium { .. }), Some(0)) => BasinState::FirstEquilibrium,
        (Some(Attractor::Equilibrium { .. }), Some(1)) => BasinState::SecondEquilibrium,
        (Some(Attractor::PeriodicOrbit { .. }), Some(0)) => BasinState::PeriodicOrbit,
        _ => BasinState::Other,
    }
}

/// Fraction of shared (Q, S) cells whose state codes agree
///
/// Cells are matched on (Q, S) rounded to 1e-6. `None` when the maps share
/// no cell.
pub fn agreement_rate<A, B>(ours: A, reference: B) -> Option<f64>
where
    A: IntoIterator<Item = (BifurcationPoint, u8)>,
    B: IntoIterator<Item = (BifurcationPoint, u8)>,
{
    let key = |p: &BifurcationPoint| ((p.q * 1e6).round() as i64, (p.s * 1e6).round() as i64);
    let reference: HashMap<(i64, i64), u8> =
        reference.into_iter().map(|(p, state)| (key(&p), state)).collect();

    let (mut shared, mut matched) = (0usize, 0usize);
    for (p, state) in ours {
        if let Some(&r) = reference.get(&key(&p)) {
            shared += 1;
            if r == state {
                matched += 1;
            }
        }
    }

    (shared > 0).then(|| matched as f64 / shared as f64)
}
