//! HYSYS COM Bridge — a Windows process that automates Aspen HYSYS via COM,
//! controlled by JSON commands over stdin/stdout.
//!
//! Designed to be cross-compiled from Linux and run under WINE.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! - Reads `Request` objects from stdin
//! - Writes `Response` objects to stdout
//! - Diagnostic/log messages go to stderr (never stdout)

#[cfg(windows)]
mod dispatch;
#[cfg(windows)]
mod hysys;

#[cfg(not(windows))]
fn main() {
    eprintln!("hysys-com-bridge must be compiled for Windows (--target x86_64-pc-windows-gnu)");
    eprintln!("and run under WINE on Linux.");
    std::process::exit(1);
}

#[cfg(windows)]
fn main() {
    use std::io::{self, BufRead, Write};

    use hysys_com_protocol::*;

    // Use stderr for all diagnostic output so stdout stays clean for protocol
    eprintln!("[hysys-com-bridge] Starting up...");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut app: Option<hysys::HysysApp> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("[hysys-com-bridge] stdin read error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("[hysys-com-bridge] JSON parse error: {e}");
                eprintln!("[hysys-com-bridge] Line was: {line}");
                // Send an error response with id=0 since we couldn't parse the request
                let resp = Response {
                    id: 0,
                    result: ResponseResult::Error {
                        message: format!("JSON parse error: {e}"),
                    },
                };
                let _ = writeln!(out, "{}", serde_json::to_string(&resp).unwrap());
                let _ = out.flush();
                continue;
            }
        };

        let response = handle_command(&mut app, &request);
        let json = serde_json::to_string(&response).unwrap();
        let _ = writeln!(out, "{json}");
        let _ = out.flush();

        // If it was a shutdown command and it succeeded, exit
        if matches!(request.command, Command::Shutdown) {
            if matches!(response.result, ResponseResult::Ok { .. }) {
                eprintln!("[hysys-com-bridge] Shutdown complete, exiting.");
                break;
            }
        }
    }

    // If HYSYS is still running when stdin closes, try to clean up
    if let Some(app) = app {
        eprintln!("[hysys-com-bridge] stdin closed, shutting down HYSYS...");
        let _ = app.shutdown();
    }

    eprintln!("[hysys-com-bridge] Process exiting.");
}

#[cfg(windows)]
fn handle_command(
    app: &mut Option<hysys::HysysApp>,
    request: &hysys_com_protocol::Request,
) -> hysys_com_protocol::Response {
    use hysys_com_protocol::*;

    let id = request.id;

    let result = match &request.command {
        Command::Init => init_com_and_hysys(app),
        Command::OpenCase { path } => with_app(app, |app| {
            let handle = app.open_case(path)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::ObjectHandle { object: handle }),
            })
        }),
        Command::ActiveCase => with_app(app, |app| {
            let handle = app.active_case()?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::ObjectHandle { object: handle }),
            })
        }),
        Command::SetVisible { case, visible } => with_app(app, |app| {
            app.set_visible(*case, *visible)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::CaseInfo { case } => with_app(app, |app| {
            let (title, fluid_package) = app.case_info(*case)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::CaseInfo {
                    title,
                    fluid_package,
                }),
            })
        }),
        Command::ResolveOperation { case, name } => with_app(app, |app| {
            let handle = app.resolve_operation(*case, name)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::ObjectHandle { object: handle }),
            })
        }),
        Command::MaterialStreams { case } => with_app(app, |app| {
            let handle = app.material_streams(*case)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::ObjectHandle { object: handle }),
            })
        }),
        Command::EnergyStreams { case } => with_app(app, |app| {
            let handle = app.energy_streams(*case)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::ObjectHandle { object: handle }),
            })
        }),
        Command::GetCellValue {
            spreadsheet,
            col,
            row,
        } => with_app(app, |app| {
            let value = app.get_cell_value(*spreadsheet, *col, *row)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::Value { value }),
            })
        }),
        Command::SetCellValue {
            spreadsheet,
            col,
            row,
            value,
        } => with_app(app, |app| {
            app.set_cell_value(*spreadsheet, *col, *row, value)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::SolverState { case } => with_app(app, |app| {
            let (is_solving, can_solve) = app.solver_state(*case)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::SolverState {
                    is_solving,
                    can_solve,
                }),
            })
        }),
        Command::SetCanSolve { case, can_solve } => with_app(app, |app| {
            app.set_can_solve(*case, *can_solve)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::CloseCase { case } => with_app(app, |app| {
            app.close_case(*case)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::Shutdown => match app.take() {
            Some(hysys) => match hysys.shutdown() {
                Ok(()) => {
                    uninit_com();
                    ResponseResult::Ok { data: None }
                }
                Err(e) => ResponseResult::Error {
                    message: format!("Shutdown failed: {e}"),
                },
            },
            None => ResponseResult::Ok { data: None },
        },
    };

    Response { id, result }
}

#[cfg(windows)]
fn init_com_and_hysys(app: &mut Option<hysys::HysysApp>) -> hysys_com_protocol::ResponseResult {
    use hysys_com_protocol::ResponseResult;
    use windows::Win32::System::Com::{CoInitializeEx, COINIT_APARTMENTTHREADED};

    if app.is_some() {
        return ResponseResult::Ok { data: None }; // Already initialized
    }

    // Initialize COM in Single-Threaded Apartment mode (required by HYSYS)
    unsafe {
        let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
        if let Err(e) = hr.ok() {
            return ResponseResult::Error {
                message: format!("CoInitializeEx failed: {e}"),
            };
        }
    }

    eprintln!("[hysys-com-bridge] COM initialized (STA)");

    match hysys::HysysApp::new() {
        Ok(hysys) => {
            eprintln!("[hysys-com-bridge] HYSYS.Application created successfully");
            *app = Some(hysys);
            ResponseResult::Ok { data: None }
        }
        Err(e) => ResponseResult::Error {
            message: format!("Failed to create HYSYS.Application: {e}"),
        },
    }
}

#[cfg(windows)]
fn uninit_com() {
    unsafe {
        windows::Win32::System::Com::CoUninitialize();
    }
    eprintln!("[hysys-com-bridge] COM uninitialized");
}

#[cfg(windows)]
fn with_app(
    app: &mut Option<hysys::HysysApp>,
    f: impl FnOnce(&mut hysys::HysysApp) -> Result<hysys_com_protocol::ResponseResult, String>,
) -> hysys_com_protocol::ResponseResult {
    match app.as_mut() {
        Some(hysys) => match f(hysys) {
            Ok(r) => r,
            Err(e) => hysys_com_protocol::ResponseResult::Error { message: e },
        },
        None => hysys_com_protocol::ResponseResult::Error {
            message: "HYSYS not initialized. Send 'Init' command first.".to_string(),
        },
    }
}
