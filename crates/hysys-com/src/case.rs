//! Typed handles to remote flowsheet objects.
//!
//! Each handle borrows the bridge and forwards operations to the remote
//! process. Nothing is released implicitly: HYSYS outlives the client, and
//! handles simply become invalid when the remote process exits.

use std::collections::HashMap;

use hysys_com_protocol::CellValue;

use crate::bridge::HysysBridge;
use crate::error::Result;
use crate::solver::Solver;

/// Case title and fluid-package name, as read from the open case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseInfo {
    pub title: String,
    pub fluid_package: String,
}

/// A handle to an open simulation case in the HYSYS COM bridge.
pub struct Case<'a> {
    bridge: &'a HysysBridge,
    handle: u64,
}

impl<'a> Case<'a> {
    pub(crate) fn new(bridge: &'a HysysBridge, handle: u64) -> Self {
        Self { bridge, handle }
    }

    /// Get the internal handle ID.
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// Show or hide the case window in the HYSYS UI.
    pub fn set_visible(&self, visible: bool) -> Result<()> {
        self.bridge.set_visible(self.handle, visible)
    }

    /// Read the case title and fluid-package name.
    pub fn info(&self) -> Result<CaseInfo> {
        self.bridge.case_info(self.handle)
    }

    /// Resolve a named spreadsheet operation from the flowsheet registry.
    pub fn spreadsheet(&self, name: &str) -> Result<Spreadsheet<'a>> {
        let handle = self.bridge.resolve_operation(self.handle, name)?;
        Ok(Spreadsheet {
            bridge: self.bridge,
            handle,
            name: name.to_string(),
        })
    }

    /// Resolve a named unit operation from the flowsheet registry.
    pub fn unit_operation(&self, name: &str) -> Result<UnitOperation<'a>> {
        let handle = self.bridge.resolve_operation(self.handle, name)?;
        Ok(UnitOperation {
            handle,
            name: name.to_string(),
            _marker: std::marker::PhantomData,
        })
    }

    /// Get the flowsheet's material-stream collection, unfiltered.
    pub fn material_streams(&self) -> Result<StreamCollection<'a>> {
        Ok(StreamCollection {
            handle: self.bridge.material_streams(self.handle)?,
            _marker: std::marker::PhantomData,
        })
    }

    /// Get the flowsheet's energy-stream collection, unfiltered.
    pub fn energy_streams(&self) -> Result<StreamCollection<'a>> {
        Ok(StreamCollection {
            handle: self.bridge.energy_streams(self.handle)?,
            _marker: std::marker::PhantomData,
        })
    }

    /// Get a handle to the case's solve-control object.
    pub fn solver(&self) -> Solver<'a> {
        Solver::new(self.bridge, self.handle)
    }

    /// Close the case without saving. The case file is never written back.
    pub fn close(self) -> Result<()> {
        self.bridge.close_case(self.handle)
    }
}

/// A handle to a spreadsheet operation.
///
/// Cells are addressed as `(column, row)`, both 0-based, matching the HYSYS
/// `.Cell(Column, Row)` convention.
pub struct Spreadsheet<'a> {
    bridge: &'a HysysBridge,
    handle: u64,
    name: String,
}

impl Spreadsheet<'_> {
    /// Get the internal handle ID.
    pub fn handle(&self) -> u64 {
        self.handle
    }

    /// The name this spreadsheet was resolved under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a cell's value.
    pub fn cell_value(&self, col: u32, row: u32) -> Result<CellValue> {
        self.bridge.get_cell_value(self.handle, col, row)
    }

    /// Write a cell's value.
    ///
    /// Accepts anything that converts to CellValue:
    /// - `f64`, `i32`, etc. -> Number value
    /// - `&str` / `String` -> String value
    /// - `bool` -> Boolean value
    pub fn set_cell_value(&self, col: u32, row: u32, value: impl Into<CellValue>) -> Result<()> {
        self.bridge
            .set_cell_value(self.handle, col, row, value.into())
    }
}

/// A handle to a unit operation. Held for later manipulation; this client
/// defines no operations on it beyond identity.
pub struct UnitOperation<'a> {
    handle: u64,
    name: String,
    // Ties the handle to the bridge that minted it
    _marker: std::marker::PhantomData<&'a HysysBridge>,
}

impl UnitOperation<'_> {
    pub fn handle(&self) -> u64 {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A handle to a stream collection (material or energy), unfiltered.
pub struct StreamCollection<'a> {
    handle: u64,
    _marker: std::marker::PhantomData<&'a HysysBridge>,
}

impl StreamCollection<'_> {
    pub fn handle(&self) -> u64 {
        self.handle
    }
}

/// Everything [`HysysBridge::connect`] gathers from a case: the case itself,
/// its solver, and the requested named objects.
///
/// The spreadsheet and unit-operation maps are keyed by exactly the names
/// supplied in [`ConnectOptions`]; a name the flowsheet registry cannot
/// resolve fails the connect call instead of leaving a hole here.
///
/// [`ConnectOptions`]: crate::ConnectOptions
pub struct Plant<'a> {
    pub case: Case<'a>,
    pub solver: Solver<'a>,
    pub spreadsheets: HashMap<String, Spreadsheet<'a>>,
    pub unit_operations: HashMap<String, UnitOperation<'a>>,
    pub material_streams: StreamCollection<'a>,
    pub energy_streams: StreamCollection<'a>,
}
