//! HYSYS-specific COM automation layer built on top of the generic IDispatch wrapper.
//!
//! Every operation here is a fixed property-path walk over the HYSYS object
//! model: `SimulationCases.Open`, `ActiveDocument`, `Flowsheet.Operations.Item`,
//! `Flowsheet.FluidPackage.PropertyPackageName`, `Solver.IsSolving`, and the
//! spreadsheet `Cell(col, row).CellValue` accessors.

#![cfg(windows)]

use std::collections::HashMap;

use windows::Win32::System::Variant::VARIANT;

use hysys_com_protocol::CellValue;

use crate::dispatch::{
    variant_bool, variant_empty, variant_f64, variant_get_bool, variant_get_f64,
    variant_get_string, variant_i32, variant_is_empty, variant_str, DispatchObject,
};

/// Manages a HYSYS.Application COM instance and the remote objects handed out
/// to the client.
pub struct HysysApp {
    app: DispatchObject,
    /// Map from our handle IDs to remote dispatch objects (cases, operations,
    /// stream collections alike — the client never looks inside a handle).
    objects: HashMap<u64, DispatchObject>,
    /// Handles in `objects` that are simulation cases; these get a `Close`
    /// call on shutdown.
    case_handles: Vec<u64>,
    next_handle: u64,
}

impl HysysApp {
    /// Create a new HYSYS.Application instance via COM.
    pub fn new() -> Result<Self, String> {
        let app = DispatchObject::create_from_progid("HYSYS.Application")?;

        Ok(Self {
            app,
            objects: HashMap::new(),
            case_handles: Vec::new(),
            next_handle: 1,
        })
    }

    fn register(&mut self, obj: DispatchObject) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.objects.insert(handle, obj);
        handle
    }

    fn object(&self, handle: u64) -> Result<&DispatchObject, String> {
        self.objects
            .get(&handle)
            .ok_or_else(|| format!("Unknown object handle: {handle}"))
    }

    /// Open a simulation case from a file path. Returns the handle ID.
    pub fn open_case(&mut self, path: &str) -> Result<u64, String> {
        let cases = self.app.get_child("SimulationCases")?;
        let case = cases.invoke_child("Open", &[variant_str(path)])?;
        let handle = self.register(case);
        self.case_handles.push(handle);
        Ok(handle)
    }

    /// Attach to the case HYSYS currently has active. Returns the handle ID.
    pub fn active_case(&mut self) -> Result<u64, String> {
        let case = self.app.get_child("ActiveDocument")?;
        let handle = self.register(case);
        self.case_handles.push(handle);
        Ok(handle)
    }

    /// Set a case's visibility flag.
    pub fn set_visible(&self, case: u64, visible: bool) -> Result<(), String> {
        self.object(case)?.set_property("Visible", variant_bool(visible))
    }

    /// Read the case title and the flowsheet's fluid-package name.
    pub fn case_info(&self, case: u64) -> Result<(String, String), String> {
        let case = self.object(case)?;

        let title = case.get_child("Title")?.get_property("Value")?;
        let title = variant_get_string(&title).unwrap_or_default();

        let package = case
            .get_child("Flowsheet")?
            .get_child("FluidPackage")?
            .get_property("PropertyPackageName")?;
        let package = variant_get_string(&package).unwrap_or_default();

        Ok((title, package))
    }

    /// Resolve a named operation through the flowsheet operation registry.
    /// Returns the handle ID. A missing name fails with whatever error the
    /// registry raises.
    pub fn resolve_operation(&mut self, case: u64, name: &str) -> Result<u64, String> {
        let operations = self
            .object(case)?
            .get_child("Flowsheet")?
            .get_child("Operations")?;
        let op = operations.get_indexed("Item", &[variant_str(name)])?;
        Ok(self.register(op))
    }

    /// Get the flowsheet's material-stream collection. Returns the handle ID.
    pub fn material_streams(&mut self, case: u64) -> Result<u64, String> {
        let streams = self
            .object(case)?
            .get_child("Flowsheet")?
            .get_child("MaterialStreams")?;
        Ok(self.register(streams))
    }

    /// Get the flowsheet's energy-stream collection. Returns the handle ID.
    pub fn energy_streams(&mut self, case: u64) -> Result<u64, String> {
        let streams = self
            .object(case)?
            .get_child("Flowsheet")?
            .get_child("EnergyStreams")?;
        Ok(self.register(streams))
    }

    /// Read a spreadsheet cell value. Column and row are 0-based.
    pub fn get_cell_value(
        &self,
        spreadsheet: u64,
        col: u32,
        row: u32,
    ) -> Result<CellValue, String> {
        let cell = self
            .object(spreadsheet)?
            .get_indexed("Cell", &[variant_i32(col as i32), variant_i32(row as i32)])?;
        let variant = cell.get_property("CellValue")?;
        Ok(variant_to_cell_value(&variant))
    }

    /// Write a spreadsheet cell value. Column and row are 0-based.
    pub fn set_cell_value(
        &self,
        spreadsheet: u64,
        col: u32,
        row: u32,
        value: &CellValue,
    ) -> Result<(), String> {
        let cell = self
            .object(spreadsheet)?
            .get_indexed("Cell", &[variant_i32(col as i32), variant_i32(row as i32)])?;
        cell.set_property("CellValue", cell_value_to_variant(value))
    }

    /// Read the solver's running and enabled flags.
    pub fn solver_state(&self, case: u64) -> Result<(bool, bool), String> {
        let solver = self.object(case)?.get_child("Solver")?;

        let is_solving = solver.get_property("IsSolving")?;
        let is_solving = variant_get_bool(&is_solving)
            .ok_or_else(|| "'IsSolving' did not return a bool".to_string())?;

        let can_solve = solver.get_property("CanSolve")?;
        let can_solve = variant_get_bool(&can_solve)
            .ok_or_else(|| "'CanSolve' did not return a bool".to_string())?;

        Ok((is_solving, can_solve))
    }

    /// Enable or disable the solver.
    pub fn set_can_solve(&self, case: u64, can_solve: bool) -> Result<(), String> {
        self.object(case)?
            .get_child("Solver")?
            .set_property("CanSolve", variant_bool(can_solve))
    }

    /// Close a case without saving.
    pub fn close_case(&mut self, case: u64) -> Result<(), String> {
        let obj = self
            .objects
            .remove(&case)
            .ok_or_else(|| format!("Unknown object handle: {case}"))?;
        self.case_handles.retain(|h| *h != case);
        obj.invoke_method("Close", &[])?;
        Ok(())
    }

    /// Shut down: close all open cases and quit HYSYS.
    pub fn shutdown(mut self) -> Result<(), String> {
        let handles: Vec<u64> = self.case_handles.clone();
        for h in handles {
            let _ = self.close_case(h);
        }
        self.app.invoke_method("Quit", &[])?;
        Ok(())
    }
}

/// Convert our protocol CellValue to a COM VARIANT.
fn cell_value_to_variant(value: &CellValue) -> VARIANT {
    match value {
        CellValue::Null => variant_empty(),
        CellValue::Bool(b) => variant_bool(*b),
        CellValue::Number(n) => variant_f64(*n),
        CellValue::String(s) => variant_str(s),
    }
}

/// Convert a COM VARIANT to our protocol CellValue.
fn variant_to_cell_value(variant: &VARIANT) -> CellValue {
    if variant_is_empty(variant) {
        CellValue::Null
    } else if let Some(b) = variant_get_bool(variant) {
        CellValue::Bool(b)
    } else if let Some(n) = variant_get_f64(variant) {
        CellValue::Number(n)
    } else if let Some(s) = variant_get_string(variant) {
        CellValue::String(s)
    } else {
        CellValue::Null
    }
}
