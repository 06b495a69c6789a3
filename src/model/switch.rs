//! Bistable Switch: the Two-Variable Rational Vector Field
//!
//! Excitatory/inhibitory population model of a biochemical switch:
//!
//!   τ₁ dx/dt = (b₁S + W^E₁₁x² + W^E₁₂y²)(1 − x) − (1 + W^I₁₁x² + W^I₁₂y²) x
//!   τ₂ dy/dt = (b₂S + W^E₂₁x² + W^E₂₂y²)(1 − y) − (1 + W^I₂₁x² + W^I₂₂y²) y
//!
//! S is the input bifurcation parameter. The second bifurcation parameter Q
//! enters only through a [`ParameterSet`] mapping that rewrites b₁, b₂ and
//! W^I₁₂.
//!
//! With the default mapping (b₁ = 0.13(1+Q), W^I₁₂ = 0.5Q) the switch shows
//! a single low equilibrium for small S, two coexisting equilibria in a
//! fold region, and relaxation oscillations when the inhibitory feedback
//! dominates.

use serde::{Deserialize, Serialize};

use super::traits::VectorField;

/// One point of the (Q, S) bifurcation plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BifurcationPoint {
    pub q: f64,
    pub s: f64,
}

impl BifurcationPoint {
    pub fn new(q: f64, s: f64) -> Self {
        Self { q, s }
    }
}

/// How the Q parameter rewrites the model constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ParameterSet {
    #[default]
    #[serde(rename = "set 1")]
    Set1,
    #[serde(rename = "set 2")]
    Set2,
    #[serde(rename = "set 3")]
    Set3,
    /// Q moves input drive from x to y instead of adding inhibition
    #[serde(rename = "set 4")]
    Set4,
}

impl ParameterSet {
    /// (b1, b2, WI12) for a given Q
    pub fn resolve(self, q: f64) -> (f64, f64, f64) {
        match self {
            ParameterSet::Set1 | ParameterSet::Set2 | ParameterSet::Set3 => {
                (0.13 * (1.0 + q), 0.0, 0.5 * q)
            }
            ParameterSet::Set4 => (0.13 * (1.0 - q), 0.26 * q, 0.0),
        }
    }
}

/// Immutable model constants plus the current bifurcation point
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchParams {
    pub tau1: f64,
    pub tau2: f64,
    pub b1: f64,
    pub b2: f64,
    pub we11: f64,
    pub we12: f64,
    pub we21: f64,
    pub we22: f64,
    pub wi11: f64,
    pub wi12: f64,
    pub wi21: f64,
    pub wi22: f64,
    pub q: f64,
    pub s: f64,
}

impl SwitchParams {
    /// Pattern 2(a): equal time constants
    pub fn pattern_2a(q: f64, s: f64) -> Self {
        let (b1, b2, wi12) = ParameterSet::Set1.resolve(q);
        Self {
            tau1: 1.0,
            tau2: 1.0,
            b1,
            b2,
            we11: 3.9,
            we12: 0.0,
            we21: 3.0,
            we22: 3.0,
            wi11: 0.0,
            wi12,
            wi21: 0.0,
            wi22: 0.0,
            q,
            s,
        }
    }

    /// Pattern 2(b): slow y population (τ₂ = 10)
    pub fn pattern_2b(q: f64, s: f64) -> Self {
        Self {
            tau2: 10.0,
            ..Self::pattern_2a(q, s)
        }
    }

    /// Copy moved to a new bifurcation point, Q applied through `set`
    pub fn at(&self, point: BifurcationPoint, set: ParameterSet) -> Self {
        let (b1, b2, wi12) = set.resolve(point.q);
        Self {
            b1,
            b2,
            wi12,
            q: point.q,
            s: point.s,
            ..self.clone()
        }
    }

    /// Copy with only S replaced
    pub fn with_s(&self, s: f64) -> Self {
        Self { s, ..self.clone() }
    }

    pub fn point(&self) -> BifurcationPoint {
        BifurcationPoint::new(self.q, self.s)
    }

    pub(crate) fn all_finite(&self) -> bool {
        [
            self.tau1, self.tau2, self.b1, self.b2, self.we11, self.we12, self.we21, self.we22,
            self.wi11, self.wi12, self.wi21, self.wi22, self.q, self.s,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

impl Default for SwitchParams {
    fn default() -> Self {
        Self::pattern_2a(0.50, 0.544)
    }
}

/// The continuous switch as a [`VectorField`]
#[derive(Debug, Clone)]
pub struct SwitchModel {
    params: SwitchParams,
}

impl SwitchModel {
    pub fn new(params: SwitchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SwitchParams {
        &self.params
    }

    /// dx/dt
    pub fn fx(&self, x: f64, y: f64) -> f64 {
        let p = &self.params;
        let (x2, y2) = (x * x, y * y);
        ((p.b1 * p.s + p.we11 * x2 + p.we12 * y2) * (1.0 - x)
            - (1.0 + p.wi11 * x2 + p.wi12 * y2) * x)
            / p.tau1
    }

    /// dy/dt
    pub fn fy(&self, x: f64, y: f64) -> f64 {
        let p = &self.params;
        let (x2, y2) = (x * x, y * y);
        ((p.b2 * p.s + p.we21 * x2 + p.we22 * y2) * (1.0 - y)
            - (1.0 + p.wi21 * x2 + p.wi22 * y2) * y)
            / p.tau2
    }
}

impl VectorField for SwitchModel {
    fn eval(&self, x: f64, y: f64) -> (f64, f64) {
        (self.fx(x, y), self.fy(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_set_mapping() {
        let (b1, b2, wi12) = ParameterSet::Set1.resolve(0.5);
        assert!((b1 - 0.195).abs() < 1e-12);
        assert_eq!(b2, 0.0);
        assert!((wi12 - 0.25).abs() < 1e-12);

        let (b1, b2, wi12) = ParameterSet::Set4.resolve(0.5);
        assert!((b1 - 0.065).abs() < 1e-12);
        assert!((b2 - 0.13).abs() < 1e-12);
        assert_eq!(wi12, 0.0);
    }

    #[test]
    fn test_origin_is_fixed_without_input() {
        // S = 0 removes the constant drive, so (0, 0) is an equilibrium
        let model = SwitchModel::new(SwitchParams::pattern_2a(0.0, 0.0));
        let (f, g) = model.eval(0.0, 0.0);
        assert_eq!(f, 0.0);
        assert_eq!(g, 0.0);
    }

    #[test]
    fn test_monostable_decay_at_zero_input() {
        // 3.9 x (1 − x) < 1 everywhere, so dx/dt < 0 for every x > 0
        let model = SwitchModel::new(SwitchParams::pattern_2a(0.0, 0.0));
        for i in 1..64 {
            let x = i as f64 / 64.0;
            assert!(model.fx(x, 0.3) < 0.0, "fx({}) should be negative", x);
        }
    }

    #[test]
    fn test_pattern_2b_only_changes_tau2() {
        let a = SwitchParams::pattern_2a(0.3, 0.4);
        let b = SwitchParams::pattern_2b(0.3, 0.4);
        assert_eq!(b.tau2, 10.0);
        assert_eq!(SwitchParams { tau2: 1.0, ..b }, a);
    }

    #[test]
    fn test_at_moves_point_and_remaps() {
        let base = SwitchParams::default();
        let moved = base.at(BifurcationPoint::new(0.2, 0.6), ParameterSet::Set1);
        assert_eq!(moved.point(), BifurcationPoint::new(0.2, 0.6));
        assert!((moved.b1 - 0.156).abs() < 1e-12);
        assert!((moved.wi12 - 0.1).abs() < 1e-12);
        assert_eq!(moved.we11, base.we11);
    }
}
