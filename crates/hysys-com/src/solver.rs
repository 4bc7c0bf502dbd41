//! Solver handle — read/write the solve-control flags and wait for the
//! remote solver to settle.

use std::time::{Duration, Instant};

use crate::bridge::HysysBridge;
use crate::error::{BridgeError, Result};

/// A handle to a case's solve-control object.
pub struct Solver<'a> {
    bridge: &'a HysysBridge,
    case: u64,
}

impl<'a> Solver<'a> {
    pub(crate) fn new(bridge: &'a HysysBridge, case: u64) -> Self {
        Self { bridge, case }
    }

    /// Whether the remote solver is currently iterating.
    pub fn is_solving(&self) -> Result<bool> {
        let (is_solving, _) = self.bridge.solver_state(self.case)?;
        Ok(is_solving)
    }

    /// Whether solving is enabled (`Solver.CanSolve`).
    pub fn can_solve(&self) -> Result<bool> {
        let (_, can_solve) = self.bridge.solver_state(self.case)?;
        Ok(can_solve)
    }

    /// Enable or disable solving. Disabling lets a caller batch cell writes
    /// without the solver reconverging after each one.
    pub fn set_can_solve(&self, can_solve: bool) -> Result<()> {
        self.bridge.set_can_solve(self.case, can_solve)
    }

    /// Poll the solving flag until it clears, or until `timeout` passes.
    ///
    /// The solver belongs to an external process this client does not
    /// control, so the wait is always bounded: if the flag never clears,
    /// this returns [`BridgeError::SolverTimeout`] instead of spinning
    /// forever. Returns only after an actual read of `false`.
    ///
    /// The poll interval comes from the bridge configuration
    /// (`solver_poll_interval`, 50 ms by default).
    pub fn wait_until_idle(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            if !self.is_solving()? {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(BridgeError::SolverTimeout { waited: timeout });
            }
            std::thread::sleep(self.bridge.solver_poll_interval());
        }
    }
}
