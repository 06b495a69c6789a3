//! Parallel Parameter Sweeps
//!
//! Every sweep follows the same shape:
//!
//! 1. Validate the record once. Each sweep kind carries its own evaluation
//!    window; only the bifurcation sweep follows the record's sT/eT.
//! 2. For each distinct parameter point build one LUT; it is immutable and
//!    shared read-only by every trajectory at that point.
//! 3. Run one trajectory per grid point on the rayon pool. Results are
//!    collected in index order, so scheduling never changes a row.
//! 4. Classify after all trajectories of a unit have finished.
//!
//! A grid point whose run fails yields a NaN (or empty) row and a warning;
//! the sweep itself carries on. Cancellation aborts the whole sweep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::grid::{InitialGrid, Nuisance, NuisanceGrid, ParamRange};
use crate::error::{EcaError, Result};
use crate::kernel::{Kernel, TrajectorySummary};
use crate::lut::Lut;
use crate::model::{
    BifurcationPoint, ClockConfig, EcaConfig, Protocol, SwitchModel, SwitchParams,
};
use crate::regime::{agreement_rate, classify_basin, Attractor, SignatureTable};

/// Shared flag for aborting a running sweep
///
/// Clones observe the same flag; workers poll it before every trajectory.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(EcaError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// LUT for one parameter point, rotated when the record asks for it
fn point_lut(params: SwitchParams, config: &EcaConfig, clock: &ClockConfig) -> Lut {
    let model = SwitchModel::new(params);
    let lattice = config.lattice();
    let quant = config.quantizer();
    match config.deg {
        Some(deg) => Lut::from_field_rotated(&model, &lattice, clock, &quant, deg),
        None => Lut::from_field(&model, &lattice, clock, &quant),
    }
}

// ============================================================================
// Bifurcation: S against a fixed set of initial conditions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BifurcationRow {
    #[serde(rename = "Q")]
    pub q: f64,
    #[serde(rename = "S")]
    pub s: f64,
    pub x: u32,
    pub y: u32,
    pub max_val: f64,
    pub min_val: f64,
    /// Trajectory hit the lattice edge; `max_val = min_val = N − 1`
    pub diverged: bool,
}

/// One-parameter sweep over S at the record's Q
#[derive(Debug, Clone)]
pub struct BifurcationSweep {
    pub config: EcaConfig,
    pub s_range: ParamRange,
    pub initial: InitialGrid,
    pub protocol: Protocol,
}

impl BifurcationSweep {
    /// S ∈ [0, 0.80] over every second coordinate of `[0, N − 1)`
    pub fn new(config: EcaConfig) -> Self {
        let initial = InitialGrid::stepped(config.n.saturating_sub(1), 2);
        let protocol = config.protocol();
        Self {
            config,
            s_range: ParamRange::bifurcation_s(),
            initial,
            protocol,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_s_range(mut self, s_range: ParamRange) -> Self {
        self.s_range = s_range;
        self
    }

    pub fn with_initial(mut self, initial: InitialGrid) -> Self {
        self.initial = initial;
        self
    }

    pub fn run(&self, cancel: &CancelToken) -> Result<Vec<BifurcationRow>> {
        self.config.validate()?;
        self.s_range.validate()?;

        let clock = self.config.clock();
        let protocol = self.protocol;
        let base = self.config.switch_params();
        let hidden = Nuisance::of(&self.config.initial_state());
        let s_values = self.s_range.values();
        let points = self.initial.points();

        info!(
            s_points = s_values.len(),
            initial_conditions = points.len(),
            q = base.q,
            "bifurcation sweep started"
        );
        let started = Instant::now();

        let per_s: Vec<Vec<BifurcationRow>> = s_values
            .par_iter()
            .map(|&s| -> Result<Vec<BifurcationRow>> {
                cancel.check()?;
                let lut = point_lut(base.with_s(s), &self.config, &clock);
                let kernel = Kernel::new(&lut, clock, protocol)?;

                let rows = points
                    .par_iter()
                    .map(|&(x, y)| -> Result<BifurcationRow> {
                        cancel.check()?;
                        let (max_val, min_val, diverged) =
                            match kernel.run_extrema(hidden.apply(x, y)) {
                                Ok(summary) => (
                                    summary.x.max as f64,
                                    summary.x.min as f64,
                                    summary.diverged(),
                                ),
                                Err(e) => {
                                    warn!(s, x, y, error = %e, "grid point failed, recording NaN");
                                    (f64::NAN, f64::NAN, false)
                                }
                            };
                        Ok(BifurcationRow {
                            q: base.q,
                            s,
                            x,
                            y,
                            max_val,
                            min_val,
                            diverged,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                debug!(s, "bifurcation point done");
                Ok(rows)
            })
            .collect::<Result<_>>()?;

        let rows: Vec<BifurcationRow> = per_s.into_iter().flatten().collect();
        info!(rows = rows.len(), elapsed = ?started.elapsed(), "bifurcation sweep finished");
        Ok(rows)
    }
}

// ============================================================================
// Parameter region: (S, Q) cells, each classified into a regime
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    #[serde(rename = "Q")]
    pub q: f64,
    #[serde(rename = "S")]
    pub s: f64,
    pub max_1: Option<f64>,
    pub max_2: Option<f64>,
    pub max_3: Option<f64>,
    pub min_1: Option<f64>,
    pub min_2: Option<f64>,
    pub min_3: Option<f64>,
    pub state: u8,
}

impl RegionRow {
    fn from_table(point: BifurcationPoint, table: &SignatureTable, state: u8) -> Self {
        let slot = |i: usize| table.slot(i);
        Self {
            q: point.q,
            s: point.s,
            max_1: slot(0).map(|p| p.0),
            max_2: slot(1).map(|p| p.0),
            max_3: slot(2).map(|p| p.0),
            min_1: slot(0).map(|p| p.1),
            min_2: slot(1).map(|p| p.1),
            min_3: slot(2).map(|p| p.1),
            state,
        }
    }

    pub fn point(&self) -> BifurcationPoint {
        BifurcationPoint::new(self.q, self.s)
    }
}

/// Two-parameter regime map over (S, Q)
#[derive(Debug, Clone)]
pub struct RegionSweep {
    pub config: EcaConfig,
    pub s_range: ParamRange,
    pub q_range: ParamRange,
    pub initial: InitialGrid,
    pub protocol: Protocol,
}

impl RegionSweep {
    /// Transient and recording window (sT, eT) in time units
    pub const WINDOW: (f64, f64) = (500.0, 800.0);

    /// S, Q ∈ [0.20, 0.69] over every eighth lattice coordinate
    pub fn new(config: EcaConfig) -> Self {
        let initial = InitialGrid::stepped(config.n, 8);
        let protocol = config.window(Self::WINDOW.0, Self::WINDOW.1);
        Self {
            config,
            s_range: ParamRange::region(),
            q_range: ParamRange::region(),
            initial,
            protocol,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_ranges(mut self, s_range: ParamRange, q_range: ParamRange) -> Self {
        self.s_range = s_range;
        self.q_range = q_range;
        self
    }

    pub fn with_initial(mut self, initial: InitialGrid) -> Self {
        self.initial = initial;
        self
    }

    /// Rows with S outer and Q inner
    pub fn run(&self, cancel: &CancelToken) -> Result<Vec<RegionRow>> {
        self.config.validate()?;
        self.s_range.validate()?;
        self.q_range.validate()?;

        let cells: Vec<BifurcationPoint> = self
            .s_range
            .values()
            .into_iter()
            .flat_map(|s| {
                self.q_range
                    .values()
                    .into_iter()
                    .map(move |q| BifurcationPoint::new(q, s))
            })
            .collect();

        info!(
            cells = cells.len(),
            initial_conditions = self.initial.len(),
            "parameter region sweep started"
        );
        let started = Instant::now();

        let rows = cells
            .par_iter()
            .map(|&point| self.run_cell(point, cancel))
            .collect::<Result<Vec<_>>>()?;

        info!(rows = rows.len(), elapsed = ?started.elapsed(), "parameter region sweep finished");
        Ok(rows)
    }

    /// Classify a single (Q, S) cell
    pub fn run_cell(&self, point: BifurcationPoint, cancel: &CancelToken) -> Result<RegionRow> {
        cancel.check()?;
        let clock = self.config.clock();
        let params = self
            .config
            .switch_params()
            .at(point, self.config.parameter_set());
        let lut = point_lut(params, &self.config, &clock);
        let kernel = Kernel::new(&lut, clock, self.protocol)?;
        let hidden = Nuisance::of(&self.config.initial_state());

        let runs = self
            .initial
            .points()
            .par_iter()
            .map(|&(x, y)| -> Result<Result<TrajectorySummary>> {
                cancel.check()?;
                Ok(kernel.run_extrema(hidden.apply(x, y)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut summaries: Vec<TrajectorySummary> = Vec::with_capacity(runs.len());
        for (run, &(x, y)) in runs.into_iter().zip(self.initial.points()) {
            match run {
                Ok(summary) => summaries.push(summary),
                Err(e) => warn!(q = point.q, s = point.s, x, y, error = %e, "grid point skipped"),
            }
        }

        let classifier = self.config.classifier();
        let table = SignatureTable::from_summaries(&summaries, classifier.max_signatures);
        let regime = table.regime(&classifier);
        debug!(
            q = point.q,
            s = point.s,
            signatures = table.pairs().len(),
            diverged = table.diverged(),
            regime = regime.label(),
            "region cell classified"
        );

        Ok(RegionRow::from_table(point, &table, regime.code()))
    }
}

// ============================================================================
// Attraction basin: initial conditions crossed with hidden-state settings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinRow {
    pub init_x: u32,
    pub init_y: u32,
    /// Empty when the initial condition could not be run
    pub state: Option<u8>,
}

/// Basin map at the record's (Q, S)
#[derive(Debug, Clone)]
pub struct BasinSweep {
    pub config: EcaConfig,
    pub initial: InitialGrid,
    pub nuisance: NuisanceGrid,
    pub protocol: Protocol,
}

impl BasinSweep {
    /// Transient and recording window (sT, eT) in time units
    pub const WINDOW: (f64, f64) = (300.0, 400.0);

    /// Every second lattice coordinate crossed with the standard nuisance grid
    pub fn new(config: EcaConfig) -> Self {
        let initial = InitialGrid::stepped(config.n, 2);
        let protocol = config.window(Self::WINDOW.0, Self::WINDOW.1);
        Self {
            config,
            initial,
            nuisance: NuisanceGrid::standard(),
            protocol,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_initial(mut self, initial: InitialGrid) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_nuisance(mut self, nuisance: NuisanceGrid) -> Self {
        self.nuisance = nuisance;
        self
    }

    pub fn run(&self, cancel: &CancelToken) -> Result<Vec<BasinRow>> {
        self.config.validate()?;
        if self.nuisance.is_empty() {
            return Err(EcaError::config("nuisance grid is empty"));
        }

        let clock = self.config.clock();
        let lut = point_lut(self.config.switch_params(), &self.config, &clock);
        let kernel = Kernel::new(&lut, clock, self.protocol)?;
        let classifier = self.config.classifier();
        let points = self.initial.points();

        info!(
            initial_conditions = points.len(),
            nuisance = self.nuisance.len(),
            "attraction basin sweep started"
        );
        let started = Instant::now();

        let runs: Vec<Option<Vec<Attractor>>> = points
            .par_iter()
            .map(|&(x, y)| -> Result<Option<Vec<Attractor>>> {
                let mut reached = Vec::with_capacity(self.nuisance.len());
                for hidden in self.nuisance.settings() {
                    cancel.check()?;
                    match kernel.run_extrema(hidden.apply(x, y)) {
                        Ok(summary) => reached.push(Attractor::from_summary(&summary, &classifier)),
                        Err(e) => {
                            warn!(x, y, error = %e, "initial condition failed, state left empty");
                            return Ok(None);
                        }
                    }
                }
                Ok(Some(reached))
            })
            .collect::<Result<_>>()?;

        let flat: Vec<Vec<Attractor>> =
            runs.iter().map(|r| r.clone().unwrap_or_default()).collect();
        let states = classify_basin(&flat, &classifier);

        let rows: Vec<BasinRow> = points
            .iter()
            .zip(runs.iter().zip(states))
            .map(|(&(x, y), (run, state))| BasinRow {
                init_x: x,
                init_y: y,
                state: run.as_ref().map(|_| state.code()),
            })
            .collect();

        info!(rows = rows.len(), elapsed = ?started.elapsed(), "attraction basin sweep finished");
        Ok(rows)
    }
}

// ============================================================================
// Clock scan: region maps for several (Tx, Ty) against a reference map
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockScanRow {
    #[serde(rename = "Tx")]
    pub tx: f64,
    #[serde(rename = "Ty")]
    pub ty: f64,
    /// Fraction of shared cells whose state matches the reference
    pub rate: Option<f64>,
}

/// Region sweep repeated over axis clock periods
#[derive(Debug, Clone)]
pub struct ClockScan {
    pub region: RegionSweep,
    pub tx_values: Vec<f64>,
    pub ty_values: Vec<f64>,
    pub reference: Vec<(BifurcationPoint, u8)>,
}

impl ClockScan {
    /// Transient and recording window (sT, eT) of every region map
    pub const WINDOW: (f64, f64) = (300.0, 500.0);

    /// Tx = k·0.01·√2, Ty = k·0.01·√3 for k ∈ {1, 3, 5, 7, 9}
    pub fn new(region: RegionSweep, reference: Vec<(BifurcationPoint, u8)>) -> Self {
        let ks = [1.0, 3.0, 5.0, 7.0, 9.0];
        let protocol = region.config.window(Self::WINDOW.0, Self::WINDOW.1);
        Self {
            region: region.with_protocol(protocol),
            tx_values: ks.iter().map(|k| k * 0.01 * 2f64.sqrt()).collect(),
            ty_values: ks.iter().map(|k| k * 0.01 * 3f64.sqrt()).collect(),
            reference,
        }
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.region.protocol = protocol;
        self
    }

    pub fn with_periods(mut self, tx_values: Vec<f64>, ty_values: Vec<f64>) -> Self {
        self.tx_values = tx_values;
        self.ty_values = ty_values;
        self
    }

    /// Rows with Ty outer and Tx inner
    pub fn run(&self, cancel: &CancelToken) -> Result<Vec<ClockScanRow>> {
        info!(
            settings = self.tx_values.len() * self.ty_values.len(),
            reference_cells = self.reference.len(),
            "clock scan started"
        );

        let mut rows = Vec::with_capacity(self.tx_values.len() * self.ty_values.len());
        for &ty in &self.ty_values {
            for &tx in &self.tx_values {
                cancel.check()?;
                let sweep = RegionSweep {
                    config: EcaConfig {
                        tx,
                        ty,
                        ..self.region.config.clone()
                    },
                    ..self.region.clone()
                };
                let map = sweep.run(cancel)?;
                let rate = agreement_rate(
                    map.iter().map(|r| (r.point(), r.state)),
                    self.reference.iter().copied(),
                );
                info!(tx, ty, rate = ?rate, "clock setting done");
                rows.push(ClockScanRow { tx, ty, rate });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use super::*;
    use crate::model::ParameterSet;
    use crate::regime::{BasinState, Regime};

    /// 20 000 ticks, recording every tenth from tick 10 000
    const SHORT: Protocol = Protocol {
        total_ticks: 20_000,
        index_start: 10_000,
        stride: 10,
    };

    /// Standard 64×64 lattice with a short protocol
    fn short_config(q: f64, s: f64) -> EcaConfig {
        EcaConfig {
            q,
            s,
            param_set: Some(Default::default()),
            total_step: Some(SHORT.total_ticks),
            index_start: Some(SHORT.index_start),
            store_step: SHORT.stride,
            ..EcaConfig::default()
        }
    }

    #[test]
    fn test_bifurcation_rows_layout() {
        let sweep = BifurcationSweep::new(short_config(0.5, 0.5))
            .with_s_range(ParamRange::new(0.50, 0.52, 0.01))
            .with_initial(InitialGrid::stepped(63, 32));
        let rows = sweep.run(&CancelToken::new()).unwrap();

        assert_eq!(rows.len(), 3 * 4);
        assert_eq!((rows[0].s, rows[0].x, rows[0].y), (0.5, 0, 0));
        assert_eq!((rows[1].x, rows[1].y), (32, 0));
        assert_eq!(rows[4].s, 0.51);
        assert!(rows.iter().all(|r| r.q == 0.5 && r.min_val <= r.max_val));
    }

    #[test]
    fn test_default_grids() {
        let config = EcaConfig::default();
        assert_eq!(BifurcationSweep::new(config.clone()).initial.len(), 32 * 32);
        assert_eq!(BifurcationSweep::new(config.clone()).s_range.len(), 81);
        assert_eq!(RegionSweep::new(config.clone()).initial.len(), 8 * 8);
        assert_eq!(BasinSweep::new(config).nuisance.len(), 900);
    }

    #[test]
    fn test_default_windows_skip_transient() {
        let config = EcaConfig::default();

        let region = RegionSweep::new(config.clone()).protocol;
        assert_eq!((region.total_ticks, region.index_start), (80001, 50000));
        assert_eq!(region.samples(), 301);

        let basin = BasinSweep::new(config.clone()).protocol;
        assert_eq!((basin.total_ticks, basin.index_start), (40001, 30000));

        let scan = ClockScan::new(RegionSweep::new(config.clone()), Vec::new());
        let scan = scan.region.protocol;
        assert_eq!((scan.total_ticks, scan.index_start), (50001, 30000));

        // the bifurcation sweep follows the record's sT/eT
        assert_eq!(BifurcationSweep::new(config.clone()).protocol, config.protocol());
    }

    #[test]
    fn test_sweep_order_does_not_matter() {
        let config = short_config(0.5, 0.544);
        let points = InitialGrid::stepped(64, 12).points().to_vec();
        let mut shuffled = points.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(42));
        assert_ne!(points, shuffled);

        let run = |pts: Vec<(u32, u32)>| -> HashMap<(u32, u32), (u64, u64)> {
            BifurcationSweep::new(config.clone())
                .with_s_range(ParamRange::point(0.544))
                .with_initial(InitialGrid::from_points(pts))
                .run(&CancelToken::new())
                .unwrap()
                .into_iter()
                .map(|r| ((r.x, r.y), (r.max_val.to_bits(), r.min_val.to_bits())))
                .collect()
        };

        assert_eq!(run(points), run(shuffled));
    }

    #[test]
    fn test_region_cells_settle_to_monostable() {
        // single equilibrium in the continuous field at each of these cells;
        // only the default window lets the far initial conditions arrive
        let config = EcaConfig {
            param_set: Some(ParameterSet::Set1),
            ..EcaConfig::default()
        };
        let sweep = RegionSweep::new(config);
        for (q, s) in [(0.2, 0.2), (0.6, 0.3), (0.3, 0.6)] {
            let row = sweep
                .run_cell(BifurcationPoint::new(q, s), &CancelToken::new())
                .unwrap();
            assert_eq!(row.state, Regime::Monostable.code(), "Q={} S={}: {:?}", q, s, row);
        }
    }

    #[test]
    fn test_monostable_cell_is_state_1() {
        // zero input: dx/dt < 0 for every x > 0, a single low equilibrium
        let sweep = RegionSweep::new(short_config(0.0, 0.0)).with_protocol(SHORT);
        let row = sweep
            .run_cell(BifurcationPoint::new(0.0, 0.0), &CancelToken::new())
            .unwrap();

        assert_eq!(row.state, Regime::Monostable.code());
        assert!(row.max_1.unwrap() <= 1.0);
        assert_eq!(row.min_1, Some(0.0));
    }

    #[test]
    fn test_region_rows_order() {
        let corner = ParamRange::new(0.0, 0.01, 0.01);
        let sweep = RegionSweep::new(short_config(0.0, 0.0))
            .with_protocol(SHORT)
            .with_ranges(corner, corner)
            .with_initial(InitialGrid::stepped(64, 32));
        let rows = sweep.run(&CancelToken::new()).unwrap();

        let cells: Vec<(f64, f64)> = rows.iter().map(|r| (r.s, r.q)).collect();
        assert_eq!(cells, vec![(0.0, 0.0), (0.0, 0.01), (0.01, 0.0), (0.01, 0.01)]);
        assert!(rows.iter().all(|r| (1..=5).contains(&r.state)));
    }

    #[test]
    fn test_basin_at_monostable_point() {
        let sweep = BasinSweep::new(short_config(0.0, 0.0))
            .with_protocol(SHORT)
            .with_initial(InitialGrid::from_points(vec![(0, 0), (40, 10), (56, 56), (64, 0)]))
            .with_nuisance(NuisanceGrid::cartesian(&[0, 16], &[0], &[0.0, 0.5], &[0.0]));
        let rows = sweep.run(&CancelToken::new()).unwrap();

        assert_eq!(rows.len(), 4);
        for row in &rows[..3] {
            assert_eq!(row.state, Some(BasinState::FirstEquilibrium.code()));
        }
        // off-lattice initial condition
        assert_eq!(rows[3].state, None);
    }

    #[test]
    fn test_failed_point_is_nan_row() {
        let sweep = BifurcationSweep::new(short_config(0.5, 0.5))
            .with_s_range(ParamRange::point(0.5))
            .with_initial(InitialGrid::from_points(vec![(10, 10), (99, 10)]));
        let rows = sweep.run(&CancelToken::new()).unwrap();

        assert!(rows[0].max_val.is_finite());
        assert!(rows[1].max_val.is_nan() && rows[1].min_val.is_nan());
        assert!(!rows[1].diverged);
    }

    #[test]
    fn test_edge_start_is_flagged_diverged() {
        // no clock fires on the first tick, so X is still on the edge after it
        let sweep = BifurcationSweep::new(short_config(0.5, 0.5))
            .with_s_range(ParamRange::point(0.5))
            .with_initial(InitialGrid::from_points(vec![(10, 10), (63, 10)]));
        let rows = sweep.run(&CancelToken::new()).unwrap();

        assert!(rows[1].diverged);
        assert_eq!((rows[1].max_val, rows[1].min_val), (63.0, 63.0));
    }

    #[test]
    fn test_cancelled_sweep() {
        let cancel = CancelToken::new();
        let observer = cancel.clone();
        cancel.cancel();
        assert!(observer.is_cancelled());

        let result = RegionSweep::new(short_config(0.0, 0.0)).run(&observer);
        assert!(matches!(result, Err(EcaError::Cancelled)));

        let result = BasinSweep::new(short_config(0.0, 0.0)).run(&observer);
        assert!(matches!(result, Err(EcaError::Cancelled)));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = EcaConfig { n: 3, ..EcaConfig::default() };
        let result = BifurcationSweep::new(config).run(&CancelToken::new());
        assert!(matches!(result, Err(EcaError::InvalidConfig(_))));
    }

    #[test]
    fn test_clock_scan_against_own_map() {
        let region = RegionSweep::new(short_config(0.0, 0.0))
            .with_protocol(SHORT)
            .with_ranges(ParamRange::point(0.0), ParamRange::point(0.0))
            .with_initial(InitialGrid::stepped(64, 32));
        let reference: Vec<(BifurcationPoint, u8)> = region
            .run(&CancelToken::new())
            .unwrap()
            .iter()
            .map(|r| (r.point(), r.state))
            .collect();

        let clock = ClockConfig::standard();
        let scan = ClockScan::new(region, reference)
            .with_protocol(SHORT)
            .with_periods(vec![clock.tx], vec![clock.ty]);
        assert_eq!(scan.tx_values.len(), 1);
        assert_eq!(scan.region.protocol, SHORT);

        let rows = scan.run(&CancelToken::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rate, Some(1.0));
    }

    #[test]
    fn test_clock_scan_default_periods() {
        let scan = ClockScan::new(RegionSweep::new(EcaConfig::default()), Vec::new());
        assert_eq!(scan.tx_values.len(), 5);
        assert!((scan.tx_values[0] - 0.01 * 2f64.sqrt()).abs() < 1e-15);
        assert!((scan.ty_values[4] - 0.09 * 3f64.sqrt()).abs() < 1e-12);
    }
}
