//! Scripted in-memory automation layer standing in for the WINE bridge.
//!
//! The mock models one case with a fixed operation registry and a solver
//! whose `IsSolving` reads are scripted in advance, which is enough to
//! exercise the connector and the bounded solver wait without a live HYSYS.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hysys_com::{BridgeError, Transport};
use hysys_com_protocol::{CellValue, Command, ResponseData};

#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MockObject {
    Case,
    Operation(String),
    Streams,
}

struct State {
    next_handle: u64,
    objects: HashMap<u64, MockObject>,
    /// Names the flowsheet operation registry can resolve.
    registry: Vec<String>,
    title: String,
    fluid_package: String,
    opened_path: Option<String>,
    attached_active: bool,
    visible: Option<bool>,
    /// Cells keyed by (operation name, col, row).
    cells: HashMap<(String, u32, u32), CellValue>,
    /// Scripted `IsSolving` reads, consumed front to back. When exhausted the
    /// solver reads idle unless `always_solving` is set.
    solver_reads: Vec<bool>,
    always_solving: bool,
    solver_polls: usize,
    can_solve: bool,
    can_solve_history: Vec<bool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_handle: 1,
                objects: HashMap::new(),
                registry: Vec::new(),
                title: "TEST CASE".to_string(),
                fluid_package: "Peng-Robinson".to_string(),
                opened_path: None,
                attached_active: false,
                visible: None,
                cells: HashMap::new(),
                solver_reads: Vec::new(),
                always_solving: false,
                solver_polls: 0,
                can_solve: true,
                can_solve_history: Vec::new(),
            })),
        }
    }

    pub fn with_operations<'a>(self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.state.lock().unwrap().registry = names.into_iter().map(String::from).collect();
        self
    }

    pub fn with_cell(self, operation: &str, col: u32, row: u32, value: impl Into<CellValue>) -> Self {
        self.state
            .lock()
            .unwrap()
            .cells
            .insert((operation.to_string(), col, row), value.into());
        self
    }

    pub fn with_solver_reads(self, reads: impl IntoIterator<Item = bool>) -> Self {
        self.state.lock().unwrap().solver_reads = reads.into_iter().collect();
        self
    }

    pub fn with_solver_never_idle(self) -> Self {
        self.state.lock().unwrap().always_solving = true;
        self
    }

    // -- Inspection --

    pub fn opened_path(&self) -> Option<String> {
        self.state.lock().unwrap().opened_path.clone()
    }

    pub fn attached_active(&self) -> bool {
        self.state.lock().unwrap().attached_active
    }

    pub fn visible(&self) -> Option<bool> {
        self.state.lock().unwrap().visible
    }

    pub fn solver_polls(&self) -> usize {
        self.state.lock().unwrap().solver_polls
    }

    pub fn remaining_solver_reads(&self) -> usize {
        self.state.lock().unwrap().solver_reads.len()
    }

    pub fn can_solve_history(&self) -> Vec<bool> {
        self.state.lock().unwrap().can_solve_history.clone()
    }

    pub fn cell(&self, operation: &str, col: u32, row: u32) -> Option<CellValue> {
        self.state
            .lock()
            .unwrap()
            .cells
            .get(&(operation.to_string(), col, row))
            .cloned()
    }

    /// The handle the mock minted for a resolved operation, if any.
    pub fn handle_of(&self, operation: &str) -> Option<u64> {
        let state = self.state.lock().unwrap();
        state.objects.iter().find_map(|(h, o)| match o {
            MockObject::Operation(name) if name == operation => Some(*h),
            _ => None,
        })
    }
}

impl State {
    fn mint(&mut self, object: MockObject) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.objects.insert(handle, object);
        handle
    }

    fn operation_name(&self, handle: u64) -> Result<String, BridgeError> {
        match self.objects.get(&handle) {
            Some(MockObject::Operation(name)) => Ok(name.clone()),
            _ => Err(BridgeError::Bridge(format!(
                "Unknown object handle: {handle}"
            ))),
        }
    }

    fn check_case(&self, handle: u64) -> Result<(), BridgeError> {
        match self.objects.get(&handle) {
            Some(MockObject::Case) => Ok(()),
            _ => Err(BridgeError::Bridge(format!(
                "Unknown object handle: {handle}"
            ))),
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, command: Command) -> Result<Option<ResponseData>, BridgeError> {
        let mut state = self.state.lock().unwrap();
        match command {
            Command::Init => Ok(None),
            Command::OpenCase { path } => {
                state.opened_path = Some(path);
                let object = state.mint(MockObject::Case);
                Ok(Some(ResponseData::ObjectHandle { object }))
            }
            Command::ActiveCase => {
                state.attached_active = true;
                let object = state.mint(MockObject::Case);
                Ok(Some(ResponseData::ObjectHandle { object }))
            }
            Command::SetVisible { case, visible } => {
                state.check_case(case)?;
                state.visible = Some(visible);
                Ok(None)
            }
            Command::CaseInfo { case } => {
                state.check_case(case)?;
                Ok(Some(ResponseData::CaseInfo {
                    title: state.title.clone(),
                    fluid_package: state.fluid_package.clone(),
                }))
            }
            Command::ResolveOperation { case, name } => {
                state.check_case(case)?;
                if !state.registry.contains(&name) {
                    // The registry error surfaces exactly as the COM layer
                    // formats it; the client must not translate it.
                    return Err(BridgeError::Bridge(format!(
                        "COM exception in 'Item': no operation named '{name}' (source: HYSYS)"
                    )));
                }
                let object = state.mint(MockObject::Operation(name));
                Ok(Some(ResponseData::ObjectHandle { object }))
            }
            Command::MaterialStreams { case } | Command::EnergyStreams { case } => {
                state.check_case(case)?;
                let object = state.mint(MockObject::Streams);
                Ok(Some(ResponseData::ObjectHandle { object }))
            }
            Command::GetCellValue {
                spreadsheet,
                col,
                row,
            } => {
                let name = state.operation_name(spreadsheet)?;
                let value = state
                    .cells
                    .get(&(name, col, row))
                    .cloned()
                    .unwrap_or(CellValue::Null);
                Ok(Some(ResponseData::Value { value }))
            }
            Command::SetCellValue {
                spreadsheet,
                col,
                row,
                value,
            } => {
                let name = state.operation_name(spreadsheet)?;
                state.cells.insert((name, col, row), value);
                Ok(None)
            }
            Command::SolverState { case } => {
                state.check_case(case)?;
                state.solver_polls += 1;
                let is_solving = if state.solver_reads.is_empty() {
                    state.always_solving
                } else {
                    state.solver_reads.remove(0)
                };
                Ok(Some(ResponseData::SolverState {
                    is_solving,
                    can_solve: state.can_solve,
                }))
            }
            Command::SetCanSolve { case, can_solve } => {
                state.check_case(case)?;
                state.can_solve = can_solve;
                state.can_solve_history.push(can_solve);
                Ok(None)
            }
            Command::CloseCase { case } => {
                state.check_case(case)?;
                state.objects.remove(&case);
                Ok(None)
            }
            Command::Shutdown => Ok(None),
        }
    }
}
