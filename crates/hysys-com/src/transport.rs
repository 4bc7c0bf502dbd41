//! Subprocess management and JSON IPC for the WINE bridge process.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use hysys_com_protocol::{Command, Request, Response, ResponseData, ResponseResult};

use crate::error::{BridgeError, Result};

/// The narrow capability seam between the client and the remote automation
/// layer. The connector and handle types only ever talk through this trait,
/// so they can be exercised against a scripted in-memory implementation
/// instead of a live HYSYS process.
pub trait Transport {
    /// Send one command and wait for its response.
    fn send(&self, command: Command) -> Result<Option<ResponseData>>;

    /// Shut down the remote side and release any local resources.
    fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).map(|_| ())
    }
}

/// Configuration for the HYSYS COM bridge.
pub struct HysysBridgeConfig {
    /// Path to the `hysys-com-bridge.exe` Windows executable.
    /// If None, will search in common locations relative to the current binary.
    pub bridge_exe_path: Option<PathBuf>,

    /// Path to the WINE executable. Defaults to "wine".
    pub wine_path: PathBuf,

    /// Optional WINEPREFIX to use (for isolating the WINE environment).
    pub wine_prefix: Option<PathBuf>,

    /// Timeout for waiting for bridge responses.
    pub timeout: Duration,

    /// Interval between solver-flag polls in [`Solver::wait_until_idle`].
    ///
    /// [`Solver::wait_until_idle`]: crate::Solver::wait_until_idle
    pub solver_poll_interval: Duration,
}

impl Default for HysysBridgeConfig {
    fn default() -> Self {
        Self {
            bridge_exe_path: None,
            wine_path: PathBuf::from("wine"),
            wine_prefix: None,
            timeout: Duration::from_secs(30),
            solver_poll_interval: Duration::from_millis(50),
        }
    }
}

/// Transport that spawns `wine hysys-com-bridge.exe` and speaks
/// newline-delimited JSON over its stdin/stdout.
pub struct WineTransport {
    child: Mutex<Child>,
    stdin: Mutex<std::process::ChildStdin>,
    stdout: Mutex<BufReader<std::process::ChildStdout>>,
    next_id: AtomicU64,
}

impl WineTransport {
    /// Start the bridge process. Does not send any command.
    pub fn spawn(config: &HysysBridgeConfig) -> Result<Self> {
        let exe_path = config
            .bridge_exe_path
            .clone()
            .unwrap_or_else(find_bridge_exe);

        if !exe_path.exists() {
            return Err(BridgeError::BridgeExeNotFound(
                exe_path.display().to_string(),
            ));
        }

        let mut cmd = std::process::Command::new(&config.wine_path);

        if let Some(prefix) = &config.wine_prefix {
            cmd.env("WINEPREFIX", prefix);
        }

        cmd.arg(&exe_path);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit()); // Bridge diagnostics go to our stderr

        tracing::debug!(exe = %exe_path.display(), "spawning WINE bridge");
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BridgeError::WineNotFound
            } else {
                BridgeError::SpawnFailed(e)
            }
        })?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");

        Ok(Self {
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            stdout: Mutex::new(BufReader::new(stdout)),
            next_id: AtomicU64::new(1),
        })
    }
}

impl Transport for WineTransport {
    fn send(&self, command: Command) -> Result<Option<ResponseData>> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let request = Request { id, command };
        let json = serde_json::to_string(&request)?;

        // Send the request
        {
            let mut stdin = self.stdin.lock().unwrap();
            writeln!(stdin, "{json}").map_err(|e| BridgeError::SendFailed(e.to_string()))?;
            stdin
                .flush()
                .map_err(|e| BridgeError::SendFailed(e.to_string()))?;
        }

        // Read the response
        let response: Response = {
            let mut stdout = self.stdout.lock().unwrap();
            let mut line = String::new();
            stdout
                .read_line(&mut line)
                .map_err(|e| BridgeError::ReadFailed(e.to_string()))?;

            if line.is_empty() {
                return Err(BridgeError::NotRunning);
            }

            serde_json::from_str(&line)?
        };

        match response.result {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => Err(BridgeError::Bridge(message)),
        }
    }

    fn shutdown(&self) -> Result<()> {
        let _ = self.send(Command::Shutdown);

        // Wait for the child process to exit
        let mut child = self.child.lock().unwrap();
        let _ = child.wait();

        Ok(())
    }
}

/// Convert a Linux filesystem path to a WINE (Windows) path.
///
/// WINE maps `/` to `Z:\`, so `/home/user/plant.hsc` becomes
/// `Z:\home\user\plant.hsc`. The WINE prefix's `drive_c` maps to `C:\`.
pub fn linux_to_wine_path(linux_path: &Path) -> String {
    let abs = if linux_path.is_absolute() {
        linux_path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(linux_path)
    };

    // WINE maps the root filesystem to Z:
    format!("Z:{}", abs.display()).replace('/', "\\")
}

/// Attempt to locate the bridge exe relative to the current executable or in common paths.
fn find_bridge_exe() -> PathBuf {
    // Check next to the current executable
    if let Ok(mut exe) = std::env::current_exe() {
        exe.pop();
        let candidate = exe.join("hysys-com-bridge.exe");
        if candidate.exists() {
            return candidate;
        }
    }

    // Check in the target directory (for development)
    let target_path = PathBuf::from("target/x86_64-pc-windows-gnu/release/hysys-com-bridge.exe");
    if target_path.exists() {
        return target_path;
    }

    let target_path = PathBuf::from("target/x86_64-pc-windows-gnu/debug/hysys-com-bridge.exe");
    if target_path.exists() {
        return target_path;
    }

    // Default: assume it's in the current directory
    PathBuf::from("hysys-com-bridge.exe")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wine_path_conversion() {
        assert_eq!(
            linux_to_wine_path(Path::new("/home/user/plant.hsc")),
            "Z:\\home\\user\\plant.hsc"
        );
    }
}
