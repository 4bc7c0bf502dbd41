//! End-to-end test against a real bridge process under WINE.
//!
//! Requires:
//!
//! 1. WINE installed and in PATH, with Aspen HYSYS installed in the prefix.
//! 2. The bridge exe built:
//!    cargo build --target x86_64-pc-windows-gnu -p hysys-com-bridge --release
//! 3. `HYSYS_COM_BRIDGE_EXE` pointing at the built exe.
//!
//! If any of those are missing, the test is skipped.

use std::path::PathBuf;

use hysys_com::{HysysBridge, HysysBridgeConfig};

fn bridge_exe() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os("HYSYS_COM_BRIDGE_EXE")?);
    path.exists().then_some(path)
}

fn wine_available() -> bool {
    std::process::Command::new("wine")
        .arg("--version")
        .output()
        .is_ok()
}

macro_rules! skip_if_no_bridge {
    () => {
        match (bridge_exe(), wine_available()) {
            (Some(exe), true) => exe,
            _ => {
                eprintln!(
                    "SKIP: WINE bridge not available.\n\
                     Build it with:\n  \
                     cargo build --target x86_64-pc-windows-gnu -p hysys-com-bridge --release\n\
                     and set HYSYS_COM_BRIDGE_EXE to the built exe."
                );
                return;
            }
        }
    };
}

#[test]
fn test_start_and_shutdown() {
    let exe = skip_if_no_bridge!();

    let config = HysysBridgeConfig {
        bridge_exe_path: Some(exe),
        ..Default::default()
    };

    match HysysBridge::start(config) {
        Ok(bridge) => {
            eprintln!("OK: bridge started and HYSYS initialized");
            bridge.shutdown().expect("shutdown");
        }
        Err(e) => panic!("Failed to start bridge: {e}"),
    }
}
