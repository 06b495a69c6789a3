//! Single automaton instance and its tick rule.
//!
//! Per tick, for each axis independently:
//!
//! 1. The axis clock fires iff the phase *before* advancing is within one
//!    window of wraparound (`ph ≥ 1 − W/T`); the phase then advances by
//!    Tc/T and wraps by subtraction.
//! 2. On a firing, the axis reads its LUT entry at the pre-tick (X, Y).
//!    While the counter is below |entry| (and below M − 1) it increments;
//!    otherwise it resets and the coordinate steps one unit in the sign of
//!    the entry, clamped to [0, N − 1].

use serde::{Deserialize, Serialize};

use crate::error::{EcaError, Result};
use crate::lut::Lut;
use crate::model::{ClockConfig, DynamicalSystem, Lattice};

/// Full automaton state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutomatonState {
    /// Lattice coordinates
    pub x: u32,
    pub y: u32,
    /// Auxiliary step counters, in [0, M)
    pub p: u32,
    pub q: u32,
    /// Phase accumulators, in [0, 1)
    pub ph_x: f64,
    pub ph_y: f64,
}

impl AutomatonState {
    /// Counters and phases at zero
    pub fn at(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            p: 0,
            q: 0,
            ph_x: 0.0,
            ph_y: 0.0,
        }
    }

    /// Same coordinates with the hidden (nuisance) variables replaced
    pub fn with_hidden(self, p: u32, q: u32, ph_x: f64, ph_y: f64) -> Self {
        Self {
            p,
            q,
            ph_x,
            ph_y,
            ..self
        }
    }

    pub fn validate(&self, lattice: &Lattice) -> Result<()> {
        if self.x >= lattice.n || self.y >= lattice.n {
            return Err(EcaError::InvalidInitialState(format!(
                "(X, Y) = ({}, {}) outside [0, {})",
                self.x, self.y, lattice.n
            )));
        }
        if self.p >= lattice.m || self.q >= lattice.m {
            return Err(EcaError::InvalidInitialState(format!(
                "(P, Q) = ({}, {}) outside [0, {})",
                self.p, self.q, lattice.m
            )));
        }
        for (name, ph) in [("phX", self.ph_x), ("phY", self.ph_y)] {
            if !(0.0..1.0).contains(&ph) {
                return Err(EcaError::InvalidInitialState(format!(
                    "{} = {} outside [0, 1)",
                    name, ph
                )));
            }
        }
        Ok(())
    }
}

/// Clock constants folded for the tick loop
#[derive(Debug, Clone, Copy)]
pub(crate) struct ClockStep {
    inc_x: f64,
    inc_y: f64,
    fire_x: f64,
    fire_y: f64,
}

impl From<&ClockConfig> for ClockStep {
    fn from(clock: &ClockConfig) -> Self {
        Self {
            inc_x: clock.increment_x(),
            inc_y: clock.increment_y(),
            fire_x: 1.0 - clock.window_x(),
            fire_y: 1.0 - clock.window_y(),
        }
    }
}

/// Observed [min, max] of one coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub max: u32,
    pub min: u32,
}

impl AxisRange {
    pub fn point(v: u32) -> Self {
        Self { max: v, min: v }
    }

    pub fn include(&mut self, v: u32) {
        self.max = self.max.max(v);
        self.min = self.min.min(v);
    }
}

/// One automaton advancing on a shared LUT
#[derive(Debug, Clone)]
pub struct Automaton<'a> {
    lut: &'a Lut,
    clock: ClockStep,
    state: AutomatonState,
    ticks: usize,
}

impl<'a> Automaton<'a> {
    pub fn new(lut: &'a Lut, clock: &ClockConfig, initial: AutomatonState) -> Result<Self> {
        initial.validate(lut.lattice())?;
        Ok(Self {
            lut,
            clock: ClockStep::from(clock),
            state: initial,
            ticks: 0,
        })
    }

    pub(crate) fn with_step(
        lut: &'a Lut,
        clock: ClockStep,
        initial: AutomatonState,
    ) -> Result<Self> {
        initial.validate(lut.lattice())?;
        Ok(Self {
            lut,
            clock,
            state: initial,
            ticks: 0,
        })
    }

    /// Ticks taken so far
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn x(&self) -> u32 {
        self.state.x
    }

    pub fn y(&self) -> u32 {
        self.state.y
    }

    /// Either coordinate sits on the upper lattice edge
    pub fn at_boundary(&self) -> bool {
        let edge = self.lut.lattice().max_index();
        self.state.x == edge || self.state.y == edge
    }
}

impl DynamicalSystem for Automaton<'_> {
    type State = AutomatonState;

    fn step(&mut self) {
        let s = &mut self.state;
        let c = &self.clock;

        let cx = s.ph_x >= c.fire_x;
        let cy = s.ph_y >= c.fire_y;

        s.ph_x += c.inc_x;
        if s.ph_x >= 1.0 {
            s.ph_x -= 1.0;
        }
        s.ph_y += c.inc_y;
        if s.ph_y >= 1.0 {
            s.ph_y -= 1.0;
        }

        if cx || cy {
            let lattice = self.lut.lattice();
            let (edge, cap) = (lattice.max_index(), lattice.max_count() as u32);
            // both axes read the pre-tick cell
            let (fx, gy) = self.lut.get(s.x, s.y);
            if cx {
                advance_axis(&mut s.x, &mut s.p, fx, edge, cap);
            }
            if cy {
                advance_axis(&mut s.y, &mut s.q, gy, edge, cap);
            }
        }

        self.ticks += 1;
    }

    fn state(&self) -> AutomatonState {
        self.state
    }
}

/// Count one firing toward `|entry|`, or step once the count is reached
#[inline]
fn advance_axis(coord: &mut u32, counter: &mut u32, entry: i32, edge: u32, cap: u32) {
    if *counter < entry.unsigned_abs() && *counter < cap {
        *counter += 1;
        return;
    }
    *counter = 0;
    if entry >= 0 {
        if *coord < edge {
            *coord += 1;
        }
    } else if *coord > 0 {
        *coord -= 1;
    }
}
