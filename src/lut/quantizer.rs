//! Vector-Field Quantizer
//!
//! Converts the continuous slope at every lattice cell into the number of
//! clock firings an axis must accumulate before it steps by one unit:
//!
//!   Fin[x, y] = ⌈ r / (γ F) ⌉    for F ≥ ε
//!   Fin[x, y] = ⌊ r / (γ F) ⌋    for F ≤ −ε
//!   Fin[x, y] = ±(M − 1)          for |F| < ε   (sign of F)
//!
//! where r = W/T is the axis clock window ratio (Tc/Tx for the standard
//! clock). Steep slopes need few firings, shallow ones many; magnitudes are
//! capped at M − 1, which the kernel treats as "practically never".
//! A table entry is never 0.

use ndarray::Array2;
use tracing::debug;

use crate::error::{EcaError, Result};
use crate::model::{ClockConfig, EcaConfig, Lattice, QuantizerConfig, SwitchModel, VectorField};

/// Quantized vector field: one signed tick count per cell and axis
#[derive(Debug, Clone, PartialEq)]
pub struct Lut {
    fin: Array2<i32>,
    gin: Array2<i32>,
    lattice: Lattice,
    rotation_deg: Option<f64>,
}

impl Lut {
    /// Validate the configuration and build the axis-aligned table
    pub fn build(config: &EcaConfig) -> Result<Self> {
        config.validate()?;
        let model = SwitchModel::new(config.switch_params());
        Ok(Self::from_field(
            &model,
            &config.lattice(),
            &config.clock(),
            &config.quantizer(),
        ))
    }

    /// Validate the configuration and build a table whose lattice is
    /// rotated by `deg` degrees about its center
    pub fn build_rotated(config: &EcaConfig, deg: f64) -> Result<Self> {
        config.validate()?;
        if !deg.is_finite() {
            return Err(EcaError::config(format!("deg must be finite, got {}", deg)));
        }
        let model = SwitchModel::new(config.switch_params());
        Ok(Self::from_field_rotated(
            &model,
            &config.lattice(),
            &config.clock(),
            &config.quantizer(),
            deg,
        ))
    }

    /// Rotated when the record carries `deg`, axis-aligned otherwise
    pub fn for_config(config: &EcaConfig) -> Result<Self> {
        match config.deg {
            Some(deg) => Self::build_rotated(config, deg),
            None => Self::build(config),
        }
    }

    /// Quantize any field on an already validated lattice and clock
    pub fn from_field<F: VectorField>(
        field: &F,
        lattice: &Lattice,
        clock: &ClockConfig,
        quant: &QuantizerConfig,
    ) -> Self {
        let n = lattice.n as usize;
        let max_count = lattice.max_count();
        let (rx, ry) = (clock.window_x(), clock.window_y());

        let mut fin = Array2::<i32>::zeros((n, n));
        let mut gin = Array2::<i32>::zeros((n, n));

        for x in 0..n {
            for y in 0..n {
                let (u, v) = lattice.normalize(x as f64, y as f64);
                let (f, g) = field.eval(u, v);
                fin[[x, y]] = quantize(f, rx, quant.gamma_x, quant.epsilon, max_count);
                gin[[x, y]] = quantize(g, ry, quant.gamma_y, quant.epsilon, max_count);
            }
        }

        debug!(n, m = lattice.m, "built axis-aligned LUT");

        Self {
            fin,
            gin,
            lattice: *lattice,
            rotation_deg: None,
        }
    }

    /// Quantize with the lattice axes rotated by `deg` degrees
    ///
    /// Each cell is rotated about the lattice center before the field is
    /// evaluated, and the resulting (F, G) is rotated back by −θ so the
    /// table stays expressed in lattice axes.
    pub fn from_field_rotated<F: VectorField>(
        field: &F,
        lattice: &Lattice,
        clock: &ClockConfig,
        quant: &QuantizerConfig,
        deg: f64,
    ) -> Self {
        let n = lattice.n as usize;
        let max_count = lattice.max_count();
        let (rx, ry) = (clock.window_x(), clock.window_y());
        let c = lattice.center();
        let (sin, cos) = deg.to_radians().sin_cos();

        let mut fin = Array2::<i32>::zeros((n, n));
        let mut gin = Array2::<i32>::zeros((n, n));

        for x in 0..n {
            for y in 0..n {
                let (dx, dy) = (x as f64 - c, y as f64 - c);
                let xr = c + dx * cos - dy * sin;
                let yr = c + dx * sin + dy * cos;

                let (u, v) = lattice.normalize(xr, yr);
                let (f, g) = field.eval(u, v);
                let fr = f * cos + g * sin;
                let gr = -f * sin + g * cos;

                fin[[x, y]] = quantize(fr, rx, quant.gamma_x, quant.epsilon, max_count);
                gin[[x, y]] = quantize(gr, ry, quant.gamma_y, quant.epsilon, max_count);
            }
        }

        debug!(n, m = lattice.m, deg, "built rotated LUT");

        Self {
            fin,
            gin,
            lattice: *lattice,
            rotation_deg: Some(deg),
        }
    }

    /// X-axis table
    pub fn fin(&self) -> &Array2<i32> {
        &self.fin
    }

    /// Y-axis table
    pub fn gin(&self) -> &Array2<i32> {
        &self.gin
    }

    /// (Fin, Gin) at a cell
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> (i32, i32) {
        let idx = [x as usize, y as usize];
        (self.fin[idx], self.gin[idx])
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn rotation_deg(&self) -> Option<f64> {
        self.rotation_deg
    }

    /// Number of cells whose X entry sits at the ±(M − 1) cap
    pub fn saturated_cells(&self) -> usize {
        let cap = self.lattice.max_count();
        self.fin.iter().filter(|v| v.abs() == cap).count()
    }
}

/// Map one slope value to a signed, non-zero tick count
pub(crate) fn quantize(value: f64, ratio: f64, gamma: f64, epsilon: f64, max_count: i32) -> i32 {
    let cap = max_count as f64;
    if value >= 0.0 {
        if value < epsilon {
            return max_count;
        }
        (ratio / (gamma * value)).ceil().clamp(1.0, cap) as i32
    } else {
        if value > -epsilon || value.is_nan() {
            return -max_count;
        }
        (ratio / (gamma * value)).floor().clamp(-cap, -1.0) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SwitchParams;

    fn standard_lut(q: f64, s: f64) -> Lut {
        let model = SwitchModel::new(SwitchParams::pattern_2a(q, s));
        Lut::from_field(
            &model,
            &Lattice::square(6),
            &ClockConfig::standard(),
            &QuantizerConfig::default(),
        )
    }

    #[test]
    fn test_quantize_rounding_direction() {
        // r / F = 2.5 → 3 ; r / F = −2.5 → −3
        assert_eq!(quantize(0.4, 1.0, 1.0, 1e-3, 63), 3);
        assert_eq!(quantize(-0.4, 1.0, 1.0, 1e-3, 63), -3);
        // steep slopes still need at least one firing
        assert_eq!(quantize(1e6, 1.0, 1.0, 1e-3, 63), 1);
        assert_eq!(quantize(-1e6, 1.0, 1.0, 1e-3, 63), -1);
    }

    #[test]
    fn test_quantize_saturation() {
        assert_eq!(quantize(0.0, 1.0, 1.0, 1e-3, 63), 63);
        assert_eq!(quantize(5e-4, 1.0, 1.0, 1e-3, 63), 63);
        assert_eq!(quantize(-5e-4, 1.0, 1.0, 1e-3, 63), -63);
        assert_eq!(quantize(f64::NAN, 1.0, 1.0, 1e-3, 63), -63);
        // shallow but above epsilon: clamped, not wrapped
        assert_eq!(quantize(2e-3, 1.0, 1.0, 1e-3, 63), 63);
        assert_eq!(quantize(-2e-3, 1.0, 1.0, 1e-3, 63), -63);
    }

    #[test]
    fn test_lut_never_zero_and_bounded() {
        for &(q, s) in &[(0.0, 0.0), (0.5, 0.544), (0.7, 0.2)] {
            let lut = standard_lut(q, s);
            for table in [lut.fin(), lut.gin()] {
                assert!(table.iter().all(|&v| v != 0 && v.abs() <= 63));
            }
        }
    }

    #[test]
    fn test_near_zero_field_saturates() {
        let lattice = Lattice::square(6);
        let params = SwitchParams::pattern_2a(0.5, 0.544);
        let model = SwitchModel::new(params);
        let lut = standard_lut(0.5, 0.544);
        let eps = QuantizerConfig::default().epsilon;

        for x in 0..64u32 {
            for y in 0..64u32 {
                let (u, v) = lattice.normalize(x as f64, y as f64);
                let (f, g) = model.eval(u, v);
                let (fx, gy) = lut.get(x, y);
                if f.abs() < eps {
                    assert_eq!(fx.abs(), 63, "cell ({}, {}) F = {}", x, y, f);
                }
                if g.abs() < eps {
                    assert_eq!(gy.abs(), 63, "cell ({}, {}) G = {}", x, y, g);
                }
            }
        }
    }

    #[test]
    fn test_sign_follows_field() {
        let lattice = Lattice::square(6);
        let model = SwitchModel::new(SwitchParams::pattern_2a(0.5, 0.544));
        let lut = standard_lut(0.5, 0.544);

        for x in 0..64u32 {
            for y in 0..64u32 {
                let (u, v) = lattice.normalize(x as f64, y as f64);
                let (f, _) = model.eval(u, v);
                let (fx, _) = lut.get(x, y);
                assert_eq!(f >= 0.0, fx > 0, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_zero_input_origin_saturates_positive() {
        // F(0, y) = 0 exactly when S = 0
        let lut = standard_lut(0.0, 0.0);
        assert_eq!(lut.get(0, 10).0, 63);
        // the cell next to it decays back toward the origin
        assert!(lut.get(1, 10).0 < 0);
    }

    #[test]
    fn test_rotation_zero_matches_axis_aligned() {
        let config = EcaConfig::default();
        let plain = Lut::build(&config).unwrap();
        let rotated = Lut::build_rotated(&config, 0.0).unwrap();

        assert_eq!(plain.fin(), rotated.fin());
        assert_eq!(plain.gin(), rotated.gin());
        assert_eq!(rotated.rotation_deg(), Some(0.0));
    }

    #[test]
    fn test_rotation_changes_table() {
        let config = EcaConfig::default();
        let plain = Lut::build(&config).unwrap();
        let rotated = Lut::build_rotated(&config, 10.0).unwrap();
        assert_ne!(plain.fin(), rotated.fin());
    }

    #[test]
    fn test_for_config_dispatch() {
        let config = EcaConfig { deg: Some(1.0), ..EcaConfig::default() };
        let lut = Lut::for_config(&config).unwrap();
        assert_eq!(lut.rotation_deg(), Some(1.0));
    }

    #[test]
    fn test_build_fails_fast() {
        let config = EcaConfig { n: 0, ..EcaConfig::default() };
        assert!(Lut::build(&config).is_err());
        assert!(Lut::build_rotated(&EcaConfig::default(), f64::NAN).is_err());
    }

    #[test]
    fn test_wider_window_needs_more_firings() {
        let model = SwitchModel::new(SwitchParams::default());
        let lattice = Lattice::square(6);
        let quant = QuantizerConfig::default();
        let clock = ClockConfig::standard();
        let wide = clock.with_windows(1.2 * clock.tc, 1.2 * clock.tc);
        assert!(wide.validate().is_ok());

        let a = Lut::from_field(&model, &lattice, &clock, &quant);
        let b = Lut::from_field(&model, &lattice, &wide, &quant);
        for (va, vb) in a.fin().iter().zip(b.fin().iter()) {
            assert!(vb.abs() >= va.abs());
        }
    }
}
