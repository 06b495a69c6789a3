//! Bistable Switch: Coarse S Bifurcation Survey
//!
//! Sweeps the input strength S at the default Q on a coarse grid and prints
//! the merged attractors found at each point.
//!
//! ## Protocol
//!
//! 1. Build the LUT at S = 0 and report its saturation
//! 2. Run one reference trajectory from the record's initial state
//! 3. Sweep S ∈ [0, 0.8] in steps of 0.1 over a 4×4 initial grid,
//!    recording over t ∈ [300, 400] after the transient
//! 4. Classify each S by its (max, min) signatures; runs that hit the
//!    lattice edge are counted apart and force "other"

use eca_switch::{
    BifurcationSweep, CancelToken, EcaConfig, InitialGrid, Kernel, Lut, ParamRange,
    SignatureTable,
};

fn main() -> eca_switch::Result<()> {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ECA Bistable Switch: S Bifurcation Survey");
    println!("═══════════════════════════════════════════════════════════════\n");

    let mut config = EcaConfig::default();
    config.s = 0.0;
    let classifier = config.classifier();

    println!("Automaton Parameters:");
    println!("  N = {}, M = {}", config.n, config.m);
    println!("  Tc = {:.2}, Tx = {:.4}, Ty = {:.4}", config.tc, config.tx, config.ty);
    println!("  Q = {:.3}", config.q);
    println!();

    let lut = Lut::for_config(&config)?;
    let cells = (config.n * config.n) as usize;
    println!(
        "LUT at S = 0: {} of {} cells saturated",
        lut.saturated_cells(),
        cells
    );

    let kernel = Kernel::from_config(&lut, &config)?;
    let summary = kernel.run_extrema(config.initial_state())?;
    println!(
        "Reference run from ({}, {}): X ∈ [{}, {}], Y ∈ [{}, {}], {} samples",
        config.init_x, config.init_y, summary.x.min, summary.x.max, summary.y.min, summary.y.max,
        summary.samples
    );
    println!();

    println!("Sweeping S...");
    let rows = BifurcationSweep::new(config.clone())
        .with_s_range(ParamRange::new(0.0, 0.8, 0.1))
        .with_initial(InitialGrid::stepped(config.n, 16))
        .with_protocol(config.window(300.0, 400.0))
        .run(&CancelToken::new())?;

    println!("───────────────────────────────────────────────────────────────");
    println!("   S     signatures   diverged   regime");
    println!("───────────────────────────────────────────────────────────────");

    for chunk in rows.chunk_by(|a, b| a.s == b.s) {
        let s = chunk[0].s;
        let diverged = chunk.iter().filter(|r| r.diverged).count();
        let pairs = chunk
            .iter()
            .filter(|r| !r.diverged)
            .map(|r| (r.max_val, r.min_val));
        let table =
            SignatureTable::from_pairs(pairs, config.max_signatures).with_diverged(diverged);
        let regime = table.regime(&classifier);

        let sigs: Vec<String> = table
            .pairs()
            .iter()
            .map(|(max, min)| format!("[{:.0},{:.0}]", min, max))
            .collect();
        println!(
            "  {:.2}   {:<12} {:>8}   {}",
            s,
            sigs.join(" "),
            diverged,
            regime.label()
        );
    }

    println!("───────────────────────────────────────────────────────────────");
    println!("\n═══════════════════════════════════════════════════════════════");
    println!("  Done: {} trajectories", rows.len());
    println!("═══════════════════════════════════════════════════════════════");

    Ok(())
}
