//! The main bridge handle and the flowsheet connection routine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use hysys_com_protocol::{CellValue, Command, ResponseData};

use crate::case::{Case, CaseInfo, Plant};
use crate::error::{BridgeError, Result};
use crate::transport::{linux_to_wine_path, HysysBridgeConfig, Transport, WineTransport};

/// Where the connection routine gets its simulation case from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseSource {
    /// Open the case file at this path.
    Open(PathBuf),
    /// Attach to whichever case HYSYS currently has active. The path the
    /// caller supplied, if any, is ignored.
    Active,
}

impl CaseSource {
    /// Build a source from the legacy integer selector: 0 opens `path`,
    /// 1 attaches to the active case, anything else is an invalid argument.
    pub fn from_flag(flag: i32, path: impl Into<PathBuf>) -> Result<Self> {
        match flag {
            0 => Ok(CaseSource::Open(path.into())),
            1 => Ok(CaseSource::Active),
            other => Err(BridgeError::InvalidCaseFlag(other)),
        }
    }
}

/// Options for [`HysysBridge::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub case_source: CaseSource,
    /// Whether the case window is shown in the HYSYS UI.
    pub visible: bool,
    /// Spreadsheet operations to resolve by name.
    pub spreadsheets: Vec<String>,
    /// Unit operations to resolve by name.
    pub unit_operations: Vec<String>,
}

impl ConnectOptions {
    /// Connect by opening the case file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            case_source: CaseSource::Open(path.into()),
            visible: true,
            spreadsheets: Vec::new(),
            unit_operations: Vec::new(),
        }
    }

    /// Connect by attaching to the currently active case.
    pub fn active() -> Self {
        Self {
            case_source: CaseSource::Active,
            visible: true,
            spreadsheets: Vec::new(),
            unit_operations: Vec::new(),
        }
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn spreadsheets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spreadsheets = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn unit_operations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unit_operations = names.into_iter().map(Into::into).collect();
        self
    }
}

/// The main handle for communicating with the HYSYS COM bridge.
///
/// This manages the WINE subprocess lifecycle and provides methods for
/// opening cases and resolving flowsheet objects into typed handles.
pub struct HysysBridge {
    transport: Box<dyn Transport>,
    solver_poll_interval: Duration,
}

impl HysysBridge {
    /// Start the bridge process and initialize HYSYS.
    pub fn start(config: HysysBridgeConfig) -> Result<Self> {
        let transport = WineTransport::spawn(&config)?;

        let bridge = Self {
            transport: Box::new(transport),
            solver_poll_interval: config.solver_poll_interval,
        };

        // Initialize COM and HYSYS
        bridge.transport.send(Command::Init)?;

        Ok(bridge)
    }

    /// Build a bridge over an arbitrary transport. This is the seam used to
    /// exercise the connector against a scripted in-memory automation layer.
    pub fn with_transport(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            solver_poll_interval: Duration::from_millis(50),
        }
    }

    /// Override the solver poll interval (see [`crate::Solver::wait_until_idle`]).
    pub fn set_solver_poll_interval(&mut self, interval: Duration) {
        self.solver_poll_interval = interval;
    }

    pub(crate) fn solver_poll_interval(&self) -> Duration {
        self.solver_poll_interval
    }

    /// Resolve or open a case and gather every handle the caller asked for.
    ///
    /// The sequence follows the HYSYS customization guide: open or attach,
    /// set visibility, read the case title and fluid-package name, resolve
    /// each named spreadsheet and unit operation through the flowsheet
    /// operation registry, then grab the stream collections and the solver.
    ///
    /// There is no partial success: the first name the registry cannot
    /// resolve fails the whole call with the remote error unmodified.
    pub fn connect(&self, options: &ConnectOptions) -> Result<Plant<'_>> {
        tracing::info!("Connecting to Aspen HYSYS...");

        let case = match &options.case_source {
            CaseSource::Open(path) => self.open_case_path(path)?,
            CaseSource::Active => self.active_case()?,
        };

        case.set_visible(options.visible)?;

        let info = case.info()?;
        tracing::info!(title = %info.title, "Aspen HYSYS file name");
        tracing::info!(fluid_package = %info.fluid_package, "Aspen HYSYS fluid package");

        let mut spreadsheets = HashMap::new();
        for name in &options.spreadsheets {
            spreadsheets.insert(name.clone(), case.spreadsheet(name)?);
        }

        let solver = case.solver();

        let material_streams = case.material_streams()?;
        let energy_streams = case.energy_streams()?;

        let mut unit_operations = HashMap::new();
        for name in &options.unit_operations {
            unit_operations.insert(name.clone(), case.unit_operation(name)?);
        }

        tracing::info!("Aspen HYSYS interface has been established successfully");

        Ok(Plant {
            case,
            solver,
            spreadsheets,
            unit_operations,
            material_streams,
            energy_streams,
        })
    }

    /// Open a simulation case from a Linux file path.
    ///
    /// The path is converted to a WINE path before it reaches HYSYS.
    pub fn open_case_path(&self, path: impl AsRef<std::path::Path>) -> Result<Case<'_>> {
        let wine_path = linux_to_wine_path(path.as_ref());
        self.open_case_raw(&wine_path)
    }

    /// Open a simulation case using a raw Windows/WINE path (no conversion).
    pub fn open_case_raw(&self, wine_path: &str) -> Result<Case<'_>> {
        let data = self.transport.send(Command::OpenCase {
            path: wine_path.to_string(),
        })?;
        Ok(Case::new(self, expect_object(data)?))
    }

    /// Attach to the case HYSYS currently has active.
    pub fn active_case(&self) -> Result<Case<'_>> {
        let data = self.transport.send(Command::ActiveCase)?;
        Ok(Case::new(self, expect_object(data)?))
    }

    /// Shut down the bridge: close all cases, quit HYSYS, and terminate the
    /// process.
    pub fn shutdown(self) -> Result<()> {
        self.transport.shutdown()
    }

    // -- Internal methods used by the handle types --

    pub(crate) fn set_visible(&self, case: u64, visible: bool) -> Result<()> {
        self.transport.send(Command::SetVisible { case, visible })?;
        Ok(())
    }

    pub(crate) fn case_info(&self, case: u64) -> Result<CaseInfo> {
        let data = self.transport.send(Command::CaseInfo { case })?;
        match data {
            Some(ResponseData::CaseInfo {
                title,
                fluid_package,
            }) => Ok(CaseInfo {
                title,
                fluid_package,
            }),
            _ => Err(BridgeError::UnexpectedResponse),
        }
    }

    pub(crate) fn resolve_operation(&self, case: u64, name: &str) -> Result<u64> {
        let data = self.transport.send(Command::ResolveOperation {
            case,
            name: name.to_string(),
        })?;
        expect_object(data)
    }

    pub(crate) fn material_streams(&self, case: u64) -> Result<u64> {
        let data = self.transport.send(Command::MaterialStreams { case })?;
        expect_object(data)
    }

    pub(crate) fn energy_streams(&self, case: u64) -> Result<u64> {
        let data = self.transport.send(Command::EnergyStreams { case })?;
        expect_object(data)
    }

    pub(crate) fn get_cell_value(&self, spreadsheet: u64, col: u32, row: u32) -> Result<CellValue> {
        let data = self
            .transport
            .send(Command::GetCellValue { spreadsheet, col, row })?;
        match data {
            Some(ResponseData::Value { value }) => Ok(value),
            _ => Err(BridgeError::UnexpectedResponse),
        }
    }

    pub(crate) fn set_cell_value(
        &self,
        spreadsheet: u64,
        col: u32,
        row: u32,
        value: CellValue,
    ) -> Result<()> {
        self.transport.send(Command::SetCellValue {
            spreadsheet,
            col,
            row,
            value,
        })?;
        Ok(())
    }

    pub(crate) fn solver_state(&self, case: u64) -> Result<(bool, bool)> {
        let data = self.transport.send(Command::SolverState { case })?;
        match data {
            Some(ResponseData::SolverState {
                is_solving,
                can_solve,
            }) => Ok((is_solving, can_solve)),
            _ => Err(BridgeError::UnexpectedResponse),
        }
    }

    pub(crate) fn set_can_solve(&self, case: u64, can_solve: bool) -> Result<()> {
        self.transport
            .send(Command::SetCanSolve { case, can_solve })?;
        Ok(())
    }

    pub(crate) fn close_case(&self, case: u64) -> Result<()> {
        self.transport.send(Command::CloseCase { case })?;
        Ok(())
    }
}

fn expect_object(data: Option<ResponseData>) -> Result<u64> {
    match data {
        Some(ResponseData::ObjectHandle { object }) => Ok(object),
        _ => Err(BridgeError::UnexpectedResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_flag_zero_opens_path() {
        let source = CaseSource::from_flag(0, "plant.hsc").unwrap();
        assert_eq!(source, CaseSource::Open(PathBuf::from("plant.hsc")));
    }

    #[test]
    fn case_flag_one_attaches() {
        // The path is ignored when attaching
        let source = CaseSource::from_flag(1, "plant.hsc").unwrap();
        assert_eq!(source, CaseSource::Active);
    }

    #[test]
    fn case_flag_other_is_invalid() {
        for flag in [-1, 2, 7, i32::MAX] {
            match CaseSource::from_flag(flag, "plant.hsc") {
                Err(BridgeError::InvalidCaseFlag(f)) => assert_eq!(f, flag),
                other => panic!("expected InvalidCaseFlag, got {other:?}"),
            }
        }
    }
}
