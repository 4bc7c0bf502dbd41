//! Shared protocol types for communication between the native Linux client
//! and the Windows COM bridge process running under WINE.
//!
//! The protocol is JSON-over-stdio: one JSON object per line in each direction.

use serde::{Deserialize, Serialize};

/// A command sent from the Linux client to the WINE bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the client can send to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Initialize COM and create the HYSYS.Application instance.
    Init,

    /// Open a simulation case from a file path (Windows path).
    /// Returns a case handle.
    OpenCase { path: String },

    /// Attach to whichever case HYSYS currently has active.
    /// Fails if no case is open.
    ActiveCase,

    /// Set a case's visibility flag.
    SetVisible { case: u64, visible: bool },

    /// Read the case title and the fluid-package name of its flowsheet.
    CaseInfo { case: u64 },

    /// Resolve a named flowsheet operation (spreadsheet, cooler, column, ...)
    /// to an object handle. A missing name surfaces the COM error unmodified.
    ResolveOperation { case: u64, name: String },

    /// Get a handle to the flowsheet's material-stream collection.
    MaterialStreams { case: u64 },

    /// Get a handle to the flowsheet's energy-stream collection.
    EnergyStreams { case: u64 },

    /// Read a spreadsheet cell value. Column and row are 0-based,
    /// matching the HYSYS `.Cell(Column, Row)` convention.
    GetCellValue { spreadsheet: u64, col: u32, row: u32 },

    /// Write a spreadsheet cell value.
    SetCellValue {
        spreadsheet: u64,
        col: u32,
        row: u32,
        value: CellValue,
    },

    /// Read the solver's running and enabled flags for a case.
    SolverState { case: u64 },

    /// Enable or disable the solver for a case (`Solver.CanSolve`).
    SetCanSolve { case: u64, can_solve: bool },

    /// Close a case without saving. The case file is never written back.
    CloseCase { case: u64 },

    /// Shut down the bridge: close all cases, quit HYSYS, uninitialize COM.
    Shutdown,
}

/// A spreadsheet cell value that can be sent to/from HYSYS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

/// A response sent from the WINE bridge back to the Linux client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Data returned in successful responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Handle to a remote object (case, operation, stream collection).
    ObjectHandle { object: u64 },
    /// A cell value.
    Value { value: CellValue },
    /// Case title and fluid-package name.
    CaseInfo { title: String, fluid_package: String },
    /// Solver flags.
    SolverState { is_solving: bool, can_solve: bool },
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "<empty>"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}
