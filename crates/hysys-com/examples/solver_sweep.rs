//! Example: solver convergence-time experiment over the HYSYS COM bridge.
//!
//! Sweeps a turbine efficiency cell on the `SS_turbine` spreadsheet twice:
//! once writing as fast as the bridge allows, once pausing the solver around
//! each write and waiting for it to reconverge. The recorded
//! efficiency/generation pairs show how stale the read-back values are when
//! the solver is not given time to settle.
//!
//! Prerequisites:
//!   - WINE installed and in PATH
//!   - Aspen HYSYS installed in the WINE prefix
//!   - hysys-com-bridge.exe built:
//!     cargo build --target x86_64-pc-windows-gnu -p hysys-com-bridge --release
//!
//! Run:
//!   cargo run --example solver_sweep -p hysys-com [-- path/to/Test_1.hsc]

use std::time::Duration;

use hysys_com::{ConnectOptions, HysysBridge, HysysBridgeConfig, Plant, Spreadsheet};

const POINTS: usize = 10;
const SOLVE_TIMEOUT: Duration = Duration::from_secs(120);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let case_file = std::env::args().nth(1).unwrap_or_else(|| "Test_1.hsc".to_string());

    println!("=== HYSYS solver sweep ===\n");

    // Start the bridge (this launches wine hysys-com-bridge.exe)
    println!("Starting HYSYS COM bridge...");
    let bridge = HysysBridge::start(HysysBridgeConfig::default())?;

    println!("Connecting to {case_file}...");
    let plant = bridge.connect(
        &ConnectOptions::open(&case_file)
            .spreadsheets(["SS_Flash", "SS_turbine", "SS_Distillation"])
            .unit_operations([
                "Cooler",
                "Flash Drum",
                "Heater",
                "Valve",
                "Reactor",
                "Distillation Column",
                "Turbine",
                "Pump",
            ]),
    )?;

    print_unit_notice();

    let turbine = &plant.spreadsheets["SS_turbine"];

    // .Cell(Column, Row) starting from 0
    let original_efficiency = turbine.cell_value(1, 0)?.as_f64().unwrap_or(f64::NAN);
    println!("Original turbine efficiency: {original_efficiency}\n");

    // Sweep 1: write as fast as the bridge allows; reads lag the solver
    let fast = sweep_without_waiting(turbine)?;

    // Restore and sweep again, this time letting the solver settle
    turbine.set_cell_value(1, 0, original_efficiency)?;
    let settled = sweep_with_solver_wait(&plant, turbine)?;

    // Return to original
    turbine.set_cell_value(1, 0, original_efficiency)?;

    print_table("Not waiting for solver", &fast);
    print_table("Waiting for solver", &settled);
    write_csv("solver_sweep.csv", &fast, &settled)?;
    println!("Wrote solver_sweep.csv");

    println!("\nShutting down...");
    bridge.shutdown()?;

    println!("\nDone!");
    Ok(())
}

/// Read (efficiency, generation), then bump efficiency, without giving the
/// solver any time to reconverge between points.
fn sweep_without_waiting(
    turbine: &Spreadsheet<'_>,
) -> Result<Vec<(f64, f64)>, Box<dyn std::error::Error>> {
    let mut points = Vec::with_capacity(POINTS);
    for _ in 0..POINTS {
        let efficiency = turbine.cell_value(1, 0)?.as_f64().unwrap_or(f64::NAN);
        let generation = turbine.cell_value(1, 1)?.as_f64().unwrap_or(f64::NAN);
        points.push((efficiency, generation));
        turbine.set_cell_value(1, 0, efficiency + 1.0)?;
    }
    Ok(points)
}

/// Same sweep, but with the solver paused around each write and a bounded
/// wait for reconvergence before the next read.
fn sweep_with_solver_wait(
    plant: &Plant<'_>,
    turbine: &Spreadsheet<'_>,
) -> Result<Vec<(f64, f64)>, Box<dyn std::error::Error>> {
    let mut points = Vec::with_capacity(POINTS);
    for _ in 0..POINTS {
        let efficiency = turbine.cell_value(1, 0)?.as_f64().unwrap_or(f64::NAN);
        let generation = turbine.cell_value(1, 1)?.as_f64().unwrap_or(f64::NAN);
        points.push((efficiency, generation));

        plant.solver.set_can_solve(false)?; // Turn off the solving mode
        turbine.set_cell_value(1, 0, efficiency + 1.0)?;
        plant.solver.set_can_solve(true)?; // Turn on the solving mode
        plant.solver.wait_until_idle(SOLVE_TIMEOUT)?;
    }
    Ok(points)
}

fn print_table(title: &str, points: &[(f64, f64)]) {
    println!("\n--- {title} ---");
    println!("{:>12}  {:>20}", "Efficiency", "Generation [kJ/s]");
    for (efficiency, generation) in points {
        println!("{efficiency:>12.4}  {generation:>20.4}");
    }
}

fn write_csv(
    path: &str,
    fast: &[(f64, f64)],
    settled: &[(f64, f64)],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["sweep", "efficiency", "generation_kj_per_s"])?;
    for (efficiency, generation) in fast {
        writer.write_record([
            "fast".to_string(),
            efficiency.to_string(),
            generation.to_string(),
        ])?;
    }
    for (efficiency, generation) in settled {
        writer.write_record([
            "settled".to_string(),
            efficiency.to_string(),
            generation.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_unit_notice() {
    println!("--- Be aware of the unit handling of this interface ---");
    println!("--- Check consistency in units between the HYSYS case");
    println!("    and the values read through this client. SI unit set:");
    println!("      Temperature:      C");
    println!("      Pressure:         kPa");
    println!("      Molar flowrate:   kgmole/s");
    println!("      Energy flowrate:  kJ/s");
    println!();
}
