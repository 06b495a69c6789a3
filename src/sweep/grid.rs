//! Sweep grids: parameter ranges, initial conditions and nuisance settings.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::{EcaError, Result};
use crate::kernel::AutomatonState;

/// Evenly spaced scalar values from `start` through `stop` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl ParamRange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// A single value
    pub fn point(v: f64) -> Self {
        Self::new(v, v, 1.0)
    }

    /// S ∈ [0, 0.80], step 0.01
    pub fn bifurcation_s() -> Self {
        Self::new(0.0, 0.80, 0.01)
    }

    /// S, Q ∈ [0.20, 0.69], step 0.01
    pub fn region() -> Self {
        Self::new(0.20, 0.69, 0.01)
    }

    pub fn len(&self) -> usize {
        if self.stop < self.start {
            return 0;
        }
        ((self.stop - self.start) / self.step + 1e-9).floor() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values rounded to 12 decimals so 0.01 steps print cleanly
    pub fn values(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| ((self.start + i as f64 * self.step) * 1e12).round() / 1e12)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let finite = self.start.is_finite() && self.stop.is_finite() && self.step.is_finite();
        if !finite || self.step <= 0.0 || self.stop < self.start {
            return Err(EcaError::config(format!(
                "invalid range {}..={} step {}",
                self.start, self.stop, self.step
            )));
        }
        Ok(())
    }
}

/// Initial lattice coordinates, Y outer and X inner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialGrid {
    points: Vec<(u32, u32)>,
}

impl InitialGrid {
    /// Every `step`-th coordinate in `[0, limit)` on both axes
    pub fn stepped(limit: u32, step: u32) -> Self {
        let axis: Vec<u32> = (0..limit).step_by(step.max(1) as usize).collect();
        let points = axis
            .iter()
            .flat_map(|&y| axis.iter().map(move |&x| (x, y)))
            .collect();
        Self { points }
    }

    pub fn from_points(points: Vec<(u32, u32)>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Hidden automaton variables for one run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Nuisance {
    pub p: u32,
    pub q: u32,
    pub ph_x: f64,
    pub ph_y: f64,
}

impl Nuisance {
    pub fn new(p: u32, q: u32, ph_x: f64, ph_y: f64) -> Self {
        Self { p, q, ph_x, ph_y }
    }

    pub fn of(state: &AutomatonState) -> Self {
        Self::new(state.p, state.q, state.ph_x, state.ph_y)
    }

    pub fn apply(&self, x: u32, y: u32) -> AutomatonState {
        AutomatonState::at(x, y).with_hidden(self.p, self.q, self.ph_x, self.ph_y)
    }
}

/// Nuisance settings each initial condition is crossed with
#[derive(Debug, Clone, PartialEq)]
pub struct NuisanceGrid {
    settings: Vec<Nuisance>,
}

impl NuisanceGrid {
    pub fn fixed(nuisance: Nuisance) -> Self {
        Self {
            settings: vec![nuisance],
        }
    }

    /// Cartesian product, P outermost and phY innermost
    pub fn cartesian(p: &[u32], q: &[u32], ph_x: &[f64], ph_y: &[f64]) -> Self {
        let mut settings = Vec::with_capacity(p.len() * q.len() * ph_x.len() * ph_y.len());
        for &p in p {
            for &q in q {
                for &ph_x in ph_x {
                    for &ph_y in ph_y {
                        settings.push(Nuisance::new(p, q, ph_x, ph_y));
                    }
                }
            }
        }
        Self { settings }
    }

    /// P, Q ∈ {0, 2, 4, 8, 16, 32}; phX, phY ∈ {0, 0.2, 0.4, 0.6, 0.8}
    pub fn standard() -> Self {
        let counters = [0, 2, 4, 8, 16, 32];
        let phases = [0.0, 0.2, 0.4, 0.6, 0.8];
        Self::cartesian(&counters, &counters, &phases, &phases)
    }

    /// `count` settings drawn uniformly: counters in [0, m), phases in [0, 1)
    pub fn random(count: usize, m: u32, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let counter = Uniform::new(0, m)
            .map_err(|e| EcaError::config(format!("counter range: {}", e)))?;
        let phase = Uniform::new(0.0, 1.0)
            .map_err(|e| EcaError::config(format!("phase range: {}", e)))?;

        let settings = (0..count)
            .map(|_| {
                Nuisance::new(
                    counter.sample(&mut rng),
                    counter.sample(&mut rng),
                    phase.sample(&mut rng),
                    phase.sample(&mut rng),
                )
            })
            .collect();
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &[Nuisance] {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

impl Default for NuisanceGrid {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges() {
        let s = ParamRange::bifurcation_s().values();
        assert_eq!(s.len(), 81);
        assert_eq!(s[0], 0.0);
        assert_eq!(s[54], 0.54);
        assert_eq!(s[80], 0.8);

        let r = ParamRange::region().values();
        assert_eq!(r.len(), 50);
        assert_eq!(r[0], 0.2);
        assert_eq!(r[49], 0.69);

        assert_eq!(ParamRange::point(0.544).values(), vec![0.544]);
        assert!(ParamRange::new(0.0, 1.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_initial_grid_order() {
        let grid = InitialGrid::stepped(64, 2);
        assert_eq!(grid.len(), 32 * 32);
        assert_eq!(grid.points()[0], (0, 0));
        assert_eq!(grid.points()[1], (2, 0));
        assert_eq!(grid.points()[32], (0, 2));
        assert_eq!(*grid.points().last().unwrap(), (62, 62));

        assert_eq!(InitialGrid::stepped(64, 8).len(), 64);
    }

    #[test]
    fn test_standard_nuisance_grid() {
        let grid = NuisanceGrid::standard();
        assert_eq!(grid.len(), 6 * 6 * 5 * 5);
        assert_eq!(grid.settings()[0], Nuisance::default());
        assert_eq!(grid.settings()[1].ph_y, 0.2);
        assert_eq!(grid.settings().last().unwrap().p, 32);
    }

    #[test]
    fn test_random_nuisance_in_range_and_seeded() {
        let a = NuisanceGrid::random(200, 64, 7).unwrap();
        let b = NuisanceGrid::random(200, 64, 7).unwrap();
        assert_eq!(a, b);
        for n in a.settings() {
            assert!(n.p < 64 && n.q < 64);
            assert!((0.0..1.0).contains(&n.ph_x) && (0.0..1.0).contains(&n.ph_y));
        }
        assert!(NuisanceGrid::random(1, 0, 7).is_err());
    }

    #[test]
    fn test_nuisance_apply() {
        let state = Nuisance::new(3, 4, 0.5, 0.25).apply(10, 20);
        assert_eq!((state.x, state.y, state.p, state.q), (10, 20, 3, 4));
        assert_eq!(Nuisance::of(&state), Nuisance::new(3, 4, 0.5, 0.25));
    }
}
