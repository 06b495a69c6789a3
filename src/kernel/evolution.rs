//! Fixed-Length Trajectory Runner
//!
//! Drives an [`Automaton`] for `total_ticks` ticks and records the
//! post-update (X, Y) of every `stride`-th tick from `index_start` on.
//! Reaching the upper lattice edge on either axis ends the run early; the
//! summary then reports the edge value as both extrema so downstream
//! classification sees a single out-of-range point.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::automaton::{Automaton, AutomatonState, AxisRange, ClockStep};
use crate::error::Result;
use crate::lut::Lut;
use crate::model::{ClockConfig, DynamicalSystem, EcaConfig, Protocol};

/// How a trajectory ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// All `total_ticks` ticks were simulated
    Completed,
    /// A coordinate hit N − 1 at the given tick
    Diverged { tick: usize },
}

/// Post-transient extrema of one trajectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub x: AxisRange,
    pub y: AxisRange,
    pub outcome: Outcome,
    /// Number of recorded samples
    pub samples: usize,
}

impl TrajectorySummary {
    pub fn diverged(&self) -> bool {
        matches!(self.outcome, Outcome::Diverged { .. })
    }
}

/// Decimated waveform of one trajectory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub t: Vec<f64>,
    pub x: Vec<u32>,
    pub y: Vec<u32>,
    pub outcome: Option<Outcome>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Runs trajectories on one read-only LUT under one clock and protocol
#[derive(Debug, Clone)]
pub struct Kernel<'a> {
    lut: &'a Lut,
    clock: ClockConfig,
    step: ClockStep,
    protocol: Protocol,
}

impl<'a> Kernel<'a> {
    pub fn new(lut: &'a Lut, clock: ClockConfig, protocol: Protocol) -> Result<Self> {
        clock.validate()?;
        protocol.validate()?;
        Ok(Self {
            lut,
            clock,
            step: ClockStep::from(&clock),
            protocol,
        })
    }

    /// Clock and protocol taken from the record
    pub fn from_config(lut: &'a Lut, config: &EcaConfig) -> Result<Self> {
        Self::new(lut, config.clock(), config.protocol())
    }

    pub fn lut(&self) -> &Lut {
        self.lut
    }

    pub fn clock(&self) -> &ClockConfig {
        &self.clock
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Tick loop shared by every entry point; `record(tick, x, y)` sees each
    /// retained sample
    fn drive<R>(&self, initial: AutomatonState, mut record: R) -> Result<Outcome>
    where
        R: FnMut(usize, u32, u32),
    {
        let mut automaton = Automaton::with_step(self.lut, self.step, initial)?;
        let Protocol {
            total_ticks,
            index_start,
            stride,
        } = self.protocol;

        for tick in 0..total_ticks {
            automaton.step();

            if automaton.at_boundary() {
                debug!(
                    tick,
                    x = automaton.x(),
                    y = automaton.y(),
                    "trajectory reached lattice edge"
                );
                return Ok(Outcome::Diverged { tick });
            }

            if tick >= index_start && (tick - index_start) % stride == 0 {
                record(tick, automaton.x(), automaton.y());
            }
        }

        Ok(Outcome::Completed)
    }

    /// (max, min) of X and Y over the retained samples
    pub fn run_extrema(&self, initial: AutomatonState) -> Result<TrajectorySummary> {
        let mut ranges: Option<(AxisRange, AxisRange)> = None;
        let mut samples = 0;

        let outcome = self.drive(initial, |_, x, y| {
            samples += 1;
            match ranges.as_mut() {
                Some((rx, ry)) => {
                    rx.include(x);
                    ry.include(y);
                }
                None => ranges = Some((AxisRange::point(x), AxisRange::point(y))),
            }
        })?;

        let (x, y) = match (outcome, ranges) {
            (Outcome::Diverged { .. }, _) => {
                let edge = AxisRange::point(self.lut.lattice().max_index());
                (edge, edge)
            }
            (Outcome::Completed, Some(r)) => r,
            // a validated protocol always records index_start
            (Outcome::Completed, None) => {
                (AxisRange::point(initial.x), AxisRange::point(initial.y))
            }
        };

        Ok(TrajectorySummary {
            x,
            y,
            outcome,
            samples,
        })
    }

    /// Retained samples with their simulated time
    pub fn run_trajectory(&self, initial: AutomatonState) -> Result<Trajectory> {
        let mut traj = Trajectory {
            t: Vec::with_capacity(self.protocol.samples()),
            x: Vec::with_capacity(self.protocol.samples()),
            y: Vec::with_capacity(self.protocol.samples()),
            outcome: None,
        };
        let tc = self.clock.tc;

        let outcome = self.drive(initial, |tick, x, y| {
            traj.t.push((tick + 1) as f64 * tc);
            traj.x.push(x);
            traj.y.push(y);
        })?;

        traj.outcome = Some(outcome);
        Ok(traj)
    }

    /// Independent runs sharing this kernel; one result per initial state
    pub fn run_batch(&self, initials: &[AutomatonState]) -> Vec<Result<TrajectorySummary>> {
        initials.iter().map(|&init| self.run_extrema(init)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EcaError;
    use crate::model::{Lattice, QuantizerConfig, VectorField};

    struct Uniform(f64, f64);

    impl VectorField for Uniform {
        fn eval(&self, _x: f64, _y: f64) -> (f64, f64) {
            (self.0, self.1)
        }
    }

    fn regression_config() -> EcaConfig {
        EcaConfig {
            n: 64,
            m: 64,
            s1: 64.0,
            s2: 64.0,
            q: 0.50,
            s: 0.544,
            init_x: 19,
            init_y: 30,
            s_t: 0.0,
            e_t: 200.0,
            ..EcaConfig::default()
        }
    }

    #[test]
    fn test_regression_scenario() {
        let config = regression_config();
        let lut = Lut::build(&config).unwrap();
        let kernel = Kernel::from_config(&lut, &config).unwrap();
        assert_eq!(kernel.protocol().total_ticks, 20001);

        let summary = kernel.run_extrema(config.initial_state()).unwrap();
        assert_eq!(summary.outcome, Outcome::Completed);
        assert_eq!(summary.samples, 201);

        // recorded extrema of the reference kernel, ±1 lattice unit
        let close = |got: u32, want: u32| got.abs_diff(want) <= 1;
        assert!(
            close(summary.x.max, 26) && close(summary.x.min, 19),
            "X range {:?}",
            summary.x
        );
        assert!(
            close(summary.y.max, 40) && close(summary.y.min, 30),
            "Y range {:?}",
            summary.y
        );
    }

    #[test]
    fn test_deterministic() {
        let config = regression_config();
        let lut = Lut::build(&config).unwrap();
        let kernel = Kernel::from_config(&lut, &config).unwrap();

        let a = kernel.run_trajectory(config.initial_state()).unwrap();
        let b = kernel.run_trajectory(config.initial_state()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 201);

        let s = kernel.run_extrema(config.initial_state()).unwrap();
        assert_eq!(s.x.max, *a.x.iter().max().unwrap());
        assert_eq!(s.x.min, *a.x.iter().min().unwrap());
        assert_eq!(s.y.max, *a.y.iter().max().unwrap());
    }

    #[test]
    fn test_sampling_respects_transient_and_stride() {
        let config = regression_config();
        let lut = Lut::build(&config).unwrap();
        let kernel = Kernel::new(&lut, config.clock(), Protocol::new(1000, 250, 50)).unwrap();

        let traj = kernel.run_trajectory(config.initial_state()).unwrap();
        assert_eq!(traj.len(), 15);
        assert!((traj.t[0] - 2.51).abs() < 1e-9);
        assert!((traj.t[1] - 3.01).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_divergence_is_recorded() {
        // everything flows up and to the right as fast as possible
        let lattice = Lattice::square(4);
        let clock = ClockConfig::new(1.0, 1.0, 1.0);
        let quant = QuantizerConfig::default();
        let lut = Lut::from_field(&Uniform(1e9, 1e9), &lattice, &clock, &quant);
        let kernel = Kernel::new(&lut, clock, Protocol::new(1000, 500, 1)).unwrap();

        let summary = kernel.run_extrema(AutomatonState::at(2, 2)).unwrap();
        assert!(summary.diverged());
        assert_eq!(summary.x, AxisRange::point(15));
        assert_eq!(summary.y, AxisRange::point(15));
        assert_eq!(summary.samples, 0);
        // entry 1 → one step every two ticks, X needs 13 steps
        assert_eq!(summary.outcome, Outcome::Diverged { tick: 25 });
    }

    #[test]
    fn test_worst_case_lut_stays_in_range() {
        let lattice = Lattice::square(4);
        let clock = ClockConfig::new(1.0, 1.0, 1.0);
        // saturated downward flow: coordinates pile up at 0, never below
        let quant = QuantizerConfig::default();
        let lut = Lut::from_field(&Uniform(-1e-9, -1e-9), &lattice, &clock, &quant);
        let kernel = Kernel::new(&lut, clock, Protocol::new(5000, 0, 1)).unwrap();

        let traj = kernel.run_trajectory(AutomatonState::at(14, 14)).unwrap();
        assert_eq!(traj.outcome, Some(Outcome::Completed));
        assert!(traj.x.iter().chain(traj.y.iter()).all(|&v| v <= 15));
        assert_eq!(*traj.x.last().unwrap(), 0);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let config = regression_config();
        let lut = Lut::build(&config).unwrap();
        let kernel = Kernel::from_config(&lut, &config).unwrap();

        let results = kernel.run_batch(&[
            AutomatonState::at(19, 30),
            AutomatonState::at(64, 0),
            AutomatonState::at(19, 30),
        ]);
        assert_eq!(results.len(), 3);
        assert!(matches!(results[1], Err(EcaError::InvalidInitialState(_))));
        assert_eq!(results[0].as_ref().unwrap(), results[2].as_ref().unwrap());
    }

    #[test]
    fn test_rejects_bad_protocol() {
        let config = regression_config();
        let lut = Lut::build(&config).unwrap();
        assert!(Kernel::new(&lut, config.clock(), Protocol::new(100, 100, 1)).is_err());
        assert!(Kernel::new(&lut, config.clock(), Protocol::new(100, 0, 0)).is_err());
    }
}
