//! Configuration: the flat parameter record and the typed structs derived
//! from it.
//!
//! The record keeps the historical key names (`tau1`, `WE11`, `Tc`, `sT`,
//! ...) so existing JSON parameter files load unchanged. Everything
//! downstream receives one of the small immutable structs below instead of
//! the record itself.

use std::io::Read;

use serde::{Deserialize, Serialize};

use super::switch::{ParameterSet, SwitchParams};
use crate::error::{EcaError, Result};
use crate::kernel::AutomatonState;
use crate::regime::ClassifierConfig;

/// Lattice geometry: N×N states, counters bounded by M, scale factors s1, s2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    pub n: u32,
    pub m: u32,
    pub s1: f64,
    pub s2: f64,
}

impl Lattice {
    pub fn new(n: u32, m: u32, s1: f64, s2: f64) -> Self {
        Self { n, m, s1, s2 }
    }

    /// N = M = s1 = s2 = 2^bits
    pub fn square(bits: u32) -> Self {
        let n = 1u32 << bits;
        Self::new(n, n, n as f64, n as f64)
    }

    /// Largest lattice coordinate, also the divergence sentinel
    pub fn max_index(&self) -> u32 {
        self.n - 1
    }

    /// Largest LUT magnitude and counter value
    pub fn max_count(&self) -> i32 {
        self.m as i32 - 1
    }

    /// Geometric center used by the rotated quantizer
    pub fn center(&self) -> f64 {
        (self.n - 1) as f64 / 2.0
    }

    /// Lattice coordinate to the field's normalized coordinate
    pub fn normalize(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.s1, y / self.s2)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n < 2 || !self.n.is_power_of_two() {
            return Err(EcaError::config(format!("N must be a power of two >= 2, got {}", self.n)));
        }
        if self.m < 2 || !self.m.is_power_of_two() || self.m > (1 << 30) {
            return Err(EcaError::config(format!("M must be a power of two >= 2, got {}", self.m)));
        }
        if !(self.s1.is_finite() && self.s1 > 0.0 && self.s2.is_finite() && self.s2 > 0.0) {
            return Err(EcaError::config(format!(
                "s1, s2 must be positive, got {}, {}",
                self.s1, self.s2
            )));
        }
        Ok(())
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Self::square(6)
    }
}

/// Common tick Tc and the two axis clock periods
///
/// The optional window widths generalize the firing rule: an axis clock
/// fires while its phase lies within `W/T` of wraparound, and the LUT is
/// scaled by the same ratio. Without a window `W = Tc`, i.e. exactly one
/// firing per period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockConfig {
    pub tc: f64,
    pub tx: f64,
    pub ty: f64,
    pub wx: Option<f64>,
    pub wy: Option<f64>,
}

impl ClockConfig {
    pub fn new(tc: f64, tx: f64, ty: f64) -> Self {
        Self { tc, tx, ty, wx: None, wy: None }
    }

    /// Tc = 0.01, Tx = 0.01·√1.713, Ty = 0.01·√2.313
    pub fn standard() -> Self {
        Self::new(0.01, 0.01 * 1.713f64.sqrt(), 0.01 * 2.313f64.sqrt())
    }

    pub fn with_windows(mut self, wx: f64, wy: f64) -> Self {
        self.wx = Some(wx);
        self.wy = Some(wy);
        self
    }

    /// Phase increment per tick on the X clock
    pub fn increment_x(&self) -> f64 {
        self.tc / self.tx
    }

    pub fn increment_y(&self) -> f64 {
        self.tc / self.ty
    }

    /// Firing window of the X clock as a fraction of its period
    pub fn window_x(&self) -> f64 {
        self.wx.unwrap_or(self.tc) / self.tx
    }

    pub fn window_y(&self) -> f64 {
        self.wy.unwrap_or(self.tc) / self.ty
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tc.is_finite() && self.tc > 0.0) {
            return Err(EcaError::config(format!("Tc must be positive, got {}", self.tc)));
        }
        for (name, period) in [("Tx", self.tx), ("Ty", self.ty)] {
            if !period.is_finite() || period < self.tc {
                return Err(EcaError::config(format!(
                    "{} must be finite and >= Tc ({}), got {}",
                    name, self.tc, period
                )));
            }
        }
        for (name, window, period) in [("Wx", self.wx, self.tx), ("Wy", self.wy, self.ty)] {
            if let Some(w) = window {
                if !(w.is_finite() && w > 0.0 && w <= period) {
                    return Err(EcaError::config(format!(
                        "{} must lie in (0, {}], got {}",
                        name, period, w
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Axis gains and the near-zero slope cutoff used by the quantizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizerConfig {
    pub gamma_x: f64,
    pub gamma_y: f64,
    pub epsilon: f64,
}

impl QuantizerConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, g) in [("gamma_X", self.gamma_x), ("gamma_Y", self.gamma_y)] {
            if !(g.is_finite() && g > 0.0) {
                return Err(EcaError::config(format!("{} must be positive, got {}", name, g)));
            }
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(EcaError::config(format!("epsilon must be positive, got {}", self.epsilon)));
        }
        Ok(())
    }
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            gamma_x: 1.0,
            gamma_y: 1.0,
            epsilon: 1e-3,
        }
    }
}

/// Evaluation protocol in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protocol {
    /// Ticks simulated per trajectory
    pub total_ticks: usize,
    /// First tick whose post-update state is recorded
    pub index_start: usize,
    /// Decimation: every `stride`-th post-transient tick is recorded
    pub stride: usize,
}

impl Protocol {
    pub const DEFAULT_STRIDE: usize = 100;
    /// Longest time-based run accepted by validation
    pub const MAX_TICKS: usize = u32::MAX as usize;

    pub fn new(total_ticks: usize, index_start: usize, stride: usize) -> Self {
        Self {
            total_ticks,
            index_start,
            stride,
        }
    }

    /// Time-based window: ⌊eT/Tc⌋ + 1 ticks, recording from ⌊sT/Tc⌋
    pub fn from_times(s_t: f64, e_t: f64, tc: f64) -> Self {
        let total_ticks = ((e_t / tc) as usize).saturating_add(1);
        let index_start = (s_t / tc) as usize;
        Self::new(total_ticks, index_start, Self::DEFAULT_STRIDE)
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Number of samples a non-truncated trajectory records
    pub fn samples(&self) -> usize {
        let window = self.total_ticks.saturating_sub(self.index_start);
        window.div_ceil(self.stride.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.stride == 0 {
            return Err(EcaError::config("store stride must be >= 1"));
        }
        if self.total_ticks > Self::MAX_TICKS {
            return Err(EcaError::config(format!(
                "total_step ({}) exceeds {} ticks",
                self.total_ticks,
                Self::MAX_TICKS
            )));
        }
        if self.total_ticks <= self.index_start {
            return Err(EcaError::config(format!(
                "total_step ({}) must exceed index_start ({})",
                self.total_ticks, self.index_start
            )));
        }
        Ok(())
    }
}

/// Flat parameter record as found in JSON parameter files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EcaConfig {
    pub tau1: f64,
    pub tau2: f64,
    pub b1: f64,
    pub b2: f64,
    #[serde(rename = "WE11")]
    pub we11: f64,
    #[serde(rename = "WE12")]
    pub we12: f64,
    #[serde(rename = "WE21")]
    pub we21: f64,
    #[serde(rename = "WE22")]
    pub we22: f64,
    #[serde(rename = "WI11")]
    pub wi11: f64,
    #[serde(rename = "WI12")]
    pub wi12: f64,
    #[serde(rename = "WI21")]
    pub wi21: f64,
    #[serde(rename = "WI22")]
    pub wi22: f64,
    #[serde(rename = "Q")]
    pub q: f64,
    #[serde(rename = "S")]
    pub s: f64,
    /// When present, b1, b2 and WI12 are derived from Q
    #[serde(rename = "param set", skip_serializing_if = "Option::is_none")]
    pub param_set: Option<ParameterSet>,

    #[serde(rename = "N")]
    pub n: u32,
    #[serde(rename = "M")]
    pub m: u32,
    pub s1: f64,
    pub s2: f64,
    #[serde(rename = "gamma_X")]
    pub gamma_x: f64,
    #[serde(rename = "gamma_Y")]
    pub gamma_y: f64,
    pub epsilon: f64,

    #[serde(rename = "Tc")]
    pub tc: f64,
    #[serde(rename = "Tx")]
    pub tx: f64,
    #[serde(rename = "Ty")]
    pub ty: f64,
    #[serde(rename = "Wx", skip_serializing_if = "Option::is_none")]
    pub wx: Option<f64>,
    #[serde(rename = "Wy", skip_serializing_if = "Option::is_none")]
    pub wy: Option<f64>,
    /// Lattice rotation in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deg: Option<f64>,

    #[serde(rename = "sT")]
    pub s_t: f64,
    #[serde(rename = "eT")]
    pub e_t: f64,
    /// Explicit tick protocol, overrides sT/eT when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_start: Option<usize>,
    /// Decimation stride
    pub store_step: usize,

    #[serde(rename = "init_X")]
    pub init_x: u32,
    #[serde(rename = "init_Y")]
    pub init_y: u32,
    #[serde(rename = "init_P")]
    pub init_p: u32,
    #[serde(rename = "init_Q")]
    pub init_q: u32,
    #[serde(rename = "init_phX")]
    pub init_ph_x: f64,
    #[serde(rename = "init_phY")]
    pub init_ph_y: f64,

    pub spread_threshold: f64,
    pub proximity: f64,
    pub max_signatures: usize,
}

impl Default for EcaConfig {
    fn default() -> Self {
        let p = SwitchParams::default();
        let lattice = Lattice::default();
        let clock = ClockConfig::standard();
        let quant = QuantizerConfig::default();
        let classifier = ClassifierConfig::default();
        Self {
            tau1: p.tau1,
            tau2: p.tau2,
            b1: p.b1,
            b2: p.b2,
            we11: p.we11,
            we12: p.we12,
            we21: p.we21,
            we22: p.we22,
            wi11: p.wi11,
            wi12: p.wi12,
            wi21: p.wi21,
            wi22: p.wi22,
            q: p.q,
            s: p.s,
            param_set: None,
            n: lattice.n,
            m: lattice.m,
            s1: lattice.s1,
            s2: lattice.s2,
            gamma_x: quant.gamma_x,
            gamma_y: quant.gamma_y,
            epsilon: quant.epsilon,
            tc: clock.tc,
            tx: clock.tx,
            ty: clock.ty,
            wx: None,
            wy: None,
            deg: None,
            s_t: 0.0,
            e_t: 200.0,
            total_step: None,
            index_start: None,
            store_step: Protocol::DEFAULT_STRIDE,
            init_x: 19,
            init_y: 30,
            init_p: 0,
            init_q: 0,
            init_ph_x: 0.0,
            init_ph_y: 0.0,
            spread_threshold: classifier.spread_threshold,
            proximity: classifier.proximity,
            max_signatures: classifier.max_signatures,
        }
    }
}

impl EcaConfig {
    /// Parse and validate a JSON record
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn lattice(&self) -> Lattice {
        Lattice::new(self.n, self.m, self.s1, self.s2)
    }

    pub fn clock(&self) -> ClockConfig {
        ClockConfig {
            tc: self.tc,
            tx: self.tx,
            ty: self.ty,
            wx: self.wx,
            wy: self.wy,
        }
    }

    pub fn quantizer(&self) -> QuantizerConfig {
        QuantizerConfig {
            gamma_x: self.gamma_x,
            gamma_y: self.gamma_y,
            epsilon: self.epsilon,
        }
    }

    /// Model constants at the configured (Q, S)
    pub fn switch_params(&self) -> SwitchParams {
        let mut p = SwitchParams {
            tau1: self.tau1,
            tau2: self.tau2,
            b1: self.b1,
            b2: self.b2,
            we11: self.we11,
            we12: self.we12,
            we21: self.we21,
            we22: self.we22,
            wi11: self.wi11,
            wi12: self.wi12,
            wi21: self.wi21,
            wi22: self.wi22,
            q: self.q,
            s: self.s,
        };
        if let Some(set) = self.param_set {
            let (b1, b2, wi12) = set.resolve(self.q);
            p.b1 = b1;
            p.b2 = b2;
            p.wi12 = wi12;
        }
        p
    }

    /// Mapping used when a sweep varies Q
    pub fn parameter_set(&self) -> ParameterSet {
        self.param_set.unwrap_or_default()
    }

    /// Time window [sT, eT] in this record's Tc and stride
    pub fn window(&self, s_t: f64, e_t: f64) -> Protocol {
        Protocol::from_times(s_t, e_t, self.tc).with_stride(self.store_step)
    }

    pub fn protocol(&self) -> Protocol {
        match self.total_step {
            Some(total) => Protocol::new(total, self.index_start.unwrap_or(0), self.store_step),
            None => Protocol::from_times(self.s_t, self.e_t, self.tc).with_stride(self.store_step),
        }
    }

    pub fn initial_state(&self) -> AutomatonState {
        AutomatonState {
            x: self.init_x,
            y: self.init_y,
            p: self.init_p,
            q: self.init_q,
            ph_x: self.init_ph_x,
            ph_y: self.init_ph_y,
        }
    }

    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            spread_threshold: self.spread_threshold,
            proximity: self.proximity,
            max_signatures: self.max_signatures,
        }
    }

    /// Run every check; nothing is built from an invalid record
    pub fn validate(&self) -> Result<()> {
        self.lattice().validate()?;
        self.clock().validate()?;
        self.quantizer().validate()?;
        let params = self.switch_params();
        if !params.all_finite() {
            return Err(EcaError::config("model constants must be finite"));
        }
        if params.tau1 == 0.0 || params.tau2 == 0.0 {
            return Err(EcaError::config("tau1 and tau2 must be non-zero"));
        }
        if let Some(deg) = self.deg {
            if !deg.is_finite() {
                return Err(EcaError::config(format!("deg must be finite, got {}", deg)));
            }
        }
        if self.total_step.is_none() {
            let ordered = self.s_t >= 0.0 && self.e_t >= self.s_t;
            if !(self.s_t.is_finite() && self.e_t.is_finite() && ordered) {
                return Err(EcaError::config(format!(
                    "need 0 <= sT <= eT, got sT={}, eT={}",
                    self.s_t, self.e_t
                )));
            }
        }
        self.protocol().validate()?;
        self.classifier().validate()?;
        Ok(())
    }
}
