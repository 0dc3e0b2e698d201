//! Compilation errors.

use super::table;
use crate::compiler::CouplingCompiler;
use crate::config::{ExchangeConfig, RestartConfig, RunConfig};
use crate::duration::{Duration, DurationUnit};
use crate::errors::CplError;
use crate::section::{FIELDS, FILES};

#[test]
fn undeclared_component() {
    let compiler = CouplingCompiler::new(RunConfig::default());
    let rows = table(&[("A", "u", "B", "v"), ("A", "x", "D", "y")]);

    let err = compiler
        .compile_with_components(&["A", "B", "C"], &rows)
        .unwrap_err();

    match err {
        CplError::UnknownComponent { row, component } => {
            assert_eq!(row, 2);
            assert_eq!(component, "D");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unknown_sender_is_reported_before_receiver() {
    let compiler = CouplingCompiler::new(RunConfig::default());
    let err = compiler
        .compile_with_components(&["B"], &table(&[("X", "u", "Y", "v")]))
        .unwrap_err();

    assert!(matches!(
        err,
        CplError::UnknownComponent { row: 1, ref component } if component == "X"
    ));
}

#[test]
fn calendar_receive_frequency() {
    let config = RunConfig {
        exchange: ExchangeConfig {
            recv_freq: Duration::new(1, DurationUnit::Day),
            ..ExchangeConfig::default()
        },
        ..RunConfig::default()
    };

    let err = CouplingCompiler::new(config)
        .compile(&table(&[("A", "u", "B", "v")]))
        .unwrap_err();
    assert!(matches!(err, CplError::UnsupportedOffsetUnit { ref value } if value == "1d"));
}

#[test]
fn receiver_field_fed_twice() {
    // `v` in B would have to forward to both u_to_v and x_to_v
    let err = CouplingCompiler::default()
        .compile(&table(&[("A", "u", "B", "v"), ("C", "x", "B", "v")]))
        .unwrap_err();

    match err {
        CplError::FieldConflict {
            component,
            registry,
            id,
        } => {
            assert_eq!(component, "B");
            assert_eq!(registry, FIELDS);
            assert_eq!(id, "v");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn field_both_received_and_sent() {
    let err = CouplingCompiler::default()
        .compile(&table(&[("A", "u", "B", "v"), ("B", "v", "C", "w")]))
        .unwrap_err();

    assert!(matches!(
        err,
        CplError::FieldConflict { ref component, ref id, .. } if component == "B" && id == "v"
    ));
}

#[test]
fn restart_file_id_clashing_with_output_file() {
    let config = RunConfig {
        restart: RestartConfig {
            file_id: "u_to_v_next".to_string(),
            ..RestartConfig::default()
        },
        ..RunConfig::default()
    };

    let err = CouplingCompiler::new(config)
        .compile(&table(&[("A", "u", "B", "v")]))
        .unwrap_err();
    assert!(matches!(err, CplError::FieldConflict { ref registry, .. } if registry == FILES));
}

#[test]
fn empty_field_name() {
    let err = CouplingCompiler::default()
        .compile(&table(&[("A", "u", "B", "v"), ("A", "", "B", "w")]))
        .unwrap_err();

    assert!(matches!(
        err,
        CplError::EmptyIdentifier { row: 2, ref column } if column == "src_var"
    ));
}

#[test]
fn component_named_like_transport_section() {
    let err = CouplingCompiler::default()
        .compile(&table(&[("xios", "u", "B", "v")]))
        .unwrap_err();

    match err {
        CplError::ReservedComponent { component } => assert_eq!(component, "xios"),
        other => panic!("unexpected error {other:?}"),
    }

    let err = CouplingCompiler::default()
        .compile_with_components(&["A", "xios"], &table(&[("A", "u", "A", "v")]))
        .unwrap_err();
    assert!(matches!(err, CplError::ReservedComponent { .. }));
}

#[test]
fn receive_offset_overflow() {
    let config = RunConfig {
        exchange: ExchangeConfig {
            recv_freq: Duration::timesteps(i64::MAX),
            ..ExchangeConfig::default()
        },
        ..RunConfig::default()
    };
    let err = CouplingCompiler::new(config)
        .compile(&table(&[("A", "u", "B", "v")]))
        .unwrap_err();

    assert!(matches!(err, CplError::InvalidDuration { .. }));
}
