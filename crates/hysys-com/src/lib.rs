//! Native Linux client library for Aspen HYSYS COM automation via a WINE
//! bridge process.
//!
//! This crate spawns a Windows `.exe` under WINE that automates HYSYS through
//! COM, communicating over JSON-over-stdio. It provides an ergonomic Rust API
//! for opening or attaching to simulation cases, resolving spreadsheets and
//! unit operations by name, reading/writing spreadsheet cells, and driving
//! the solver.
//!
//! # Architecture
//!
//! ```text
//! Your Rust code (native Linux)
//!     └── HysysBridge (this crate)
//!           └── spawns: wine hysys-com-bridge.exe
//!                 └── COM: HYSYS.Application
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use hysys_com::{ConnectOptions, HysysBridge, HysysBridgeConfig};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bridge = HysysBridge::start(HysysBridgeConfig::default())?;
//!     let plant = bridge.connect(
//!         &ConnectOptions::open("Test_1.hsc")
//!             .spreadsheets(["SS_turbine"])
//!             .unit_operations(["Cooler"]),
//!     )?;
//!
//!     let turbine = &plant.spreadsheets["SS_turbine"];
//!     let efficiency = turbine.cell_value(1, 0)?;
//!     turbine.set_cell_value(1, 0, efficiency.as_f64().unwrap_or(0.0) + 1.0)?;
//!     plant.solver.wait_until_idle(Duration::from_secs(60))?;
//!
//!     bridge.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! NOTE: HYSYS reports values in whatever unit set the case is configured
//! with; check consistency between the case and the caller before trusting
//! numbers read through this interface.

mod bridge;
mod case;
mod error;
mod solver;
mod transport;

pub use bridge::{CaseSource, ConnectOptions, HysysBridge};
pub use case::{Case, CaseInfo, Plant, Spreadsheet, StreamCollection, UnitOperation};
pub use error::{BridgeError, Result};
pub use hysys_com_protocol::CellValue;
pub use solver::Solver;
pub use transport::{linux_to_wine_path, HysysBridgeConfig, Transport, WineTransport};
