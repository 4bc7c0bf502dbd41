//! Connection-routine contract, exercised against the scripted mock bridge.

mod common;

use std::collections::BTreeSet;

use common::MockTransport;
use hysys_com::{BridgeError, CaseSource, CellValue, ConnectOptions, HysysBridge};
use pretty_assertions::assert_eq;

#[test]
fn connect_binds_requested_names_to_stub_children() {
    let mock = MockTransport::new()
        .with_operations(["SS_A", "Cooler"])
        .with_cell("SS_A", 1, 0, 75.0);
    let bridge = HysysBridge::with_transport(Box::new(mock.clone()));

    let source = CaseSource::from_flag(0, "plant.sim").unwrap();
    let options = ConnectOptions {
        case_source: source,
        visible: true,
        spreadsheets: vec!["SS_A".to_string()],
        unit_operations: vec!["Cooler".to_string()],
    };

    let plant = bridge.connect(&options).expect("connect should succeed");

    // The stub saw the open and the visibility write
    assert!(mock.opened_path().unwrap().ends_with("plant.sim"));
    assert_eq!(mock.visible(), Some(true));

    // Requested names are bound to the stub's corresponding children
    assert_eq!(
        plant.spreadsheets["SS_A"].handle(),
        mock.handle_of("SS_A").unwrap()
    );
    assert_eq!(
        plant.unit_operations["Cooler"].handle(),
        mock.handle_of("Cooler").unwrap()
    );

    // Cell traffic flows through the bound spreadsheet handle
    let turbine = &plant.spreadsheets["SS_A"];
    assert_eq!(turbine.cell_value(1, 0).unwrap().as_f64(), Some(75.0));
    turbine.set_cell_value(1, 0, 76.0).unwrap();
    assert_eq!(mock.cell("SS_A", 1, 0).unwrap().as_f64(), Some(76.0));
}

#[test]
fn spreadsheet_keys_equal_input_names_exactly() {
    let mock = MockTransport::new().with_operations([
        "SS_Flash",
        "SS_turbine",
        "SS_Distillation",
        "Cooler",
        "Heater",
        "Valve",
    ]);
    let bridge = HysysBridge::with_transport(Box::new(mock));

    let options = ConnectOptions::open("Test_1.hsc")
        .spreadsheets(["SS_Flash", "SS_turbine"])
        .unit_operations(["Cooler", "Heater"]);

    let plant = bridge.connect(&options).unwrap();

    let ss_keys: BTreeSet<String> = plant.spreadsheets.keys().cloned().collect();
    let uo_keys: BTreeSet<String> = plant.unit_operations.keys().cloned().collect();
    assert_eq!(
        ss_keys,
        BTreeSet::from(["SS_Flash".to_string(), "SS_turbine".to_string()])
    );
    assert_eq!(
        uo_keys,
        BTreeSet::from(["Cooler".to_string(), "Heater".to_string()])
    );
}

#[test]
fn missing_spreadsheet_name_fails_the_whole_call() {
    let mock = MockTransport::new().with_operations(["Cooler"]);
    let bridge = HysysBridge::with_transport(Box::new(mock));

    let options = ConnectOptions::open("plant.sim")
        .spreadsheets(["SS_A"])
        .unit_operations(["Cooler"]);

    match bridge.connect(&options) {
        Err(BridgeError::Bridge(message)) => {
            // The registry's own diagnostic comes through untranslated
            assert!(message.contains("SS_A"), "message was: {message}");
        }
        Ok(_) => panic!("connect should not return an aggregate"),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_unit_operation_name_fails_the_whole_call() {
    let mock = MockTransport::new().with_operations(["SS_A"]);
    let bridge = HysysBridge::with_transport(Box::new(mock));

    let options = ConnectOptions::open("plant.sim")
        .spreadsheets(["SS_A"])
        .unit_operations(["Cooler"]);

    assert!(matches!(
        bridge.connect(&options),
        Err(BridgeError::Bridge(_))
    ));
}

#[test]
fn attaching_ignores_the_path_entirely() {
    let mock = MockTransport::new();
    let bridge = HysysBridge::with_transport(Box::new(mock.clone()));

    let source = CaseSource::from_flag(1, "ignored.hsc").unwrap();
    let options = ConnectOptions {
        case_source: source,
        visible: false,
        spreadsheets: Vec::new(),
        unit_operations: Vec::new(),
    };

    bridge.connect(&options).unwrap();

    assert!(mock.attached_active());
    assert_eq!(mock.opened_path(), None);
    assert_eq!(mock.visible(), Some(false));
}

#[test]
fn invalid_case_flag_is_rejected_before_any_remote_call() {
    match CaseSource::from_flag(2, "plant.sim") {
        Err(BridgeError::InvalidCaseFlag(2)) => {}
        other => panic!("expected InvalidCaseFlag, got {other:?}"),
    }
}

#[test]
fn case_info_reads_title_and_fluid_package() {
    let mock = MockTransport::new();
    let bridge = HysysBridge::with_transport(Box::new(mock));

    let plant = bridge.connect(&ConnectOptions::open("plant.sim")).unwrap();
    let info = plant.case.info().unwrap();
    assert_eq!(info.title, "TEST CASE");
    assert_eq!(info.fluid_package, "Peng-Robinson");
}

#[test]
fn unknown_cells_read_as_empty() {
    let mock = MockTransport::new().with_operations(["SS_A"]);
    let bridge = HysysBridge::with_transport(Box::new(mock));

    let plant = bridge
        .connect(&ConnectOptions::open("plant.sim").spreadsheets(["SS_A"]))
        .unwrap();

    let value = plant.spreadsheets["SS_A"].cell_value(3, 9).unwrap();
    assert!(matches!(value, CellValue::Null));
}
