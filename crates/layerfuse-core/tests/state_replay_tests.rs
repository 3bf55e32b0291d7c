//! Machine-state replay tests

use layerfuse_core::{parse, MachineState, EPSILON};

#[test]
fn test_absolute_motion_replay() {
    let commands = parse("G0 F6000 X10 Y20 Z0.2\nG1 F1500 X15 E1.0").unwrap();
    let state = MachineState::replay(&commands);

    assert!((state.x - 15.0).abs() < EPSILON);
    assert!((state.y - 20.0).abs() < EPSILON);
    assert!((state.z - 0.2).abs() < EPSILON);
    assert!((state.e - 1.0).abs() < EPSILON);
    assert!((state.feed_rate - 1500.0).abs() < EPSILON);
    assert!(state.position_known);
}

#[test]
fn test_relative_motion_replay() {
    let commands = parse("G0 X10 Y10 Z1.0\nG91\nG0 X2 Y-3 Z0.5\nG90\nG0 X1").unwrap();
    let state = MachineState::replay(&commands);

    assert!((state.x - 1.0).abs() < EPSILON);
    assert!((state.y - 7.0).abs() < EPSILON);
    assert!((state.z - 1.5).abs() < EPSILON);
}

#[test]
fn test_relative_e_is_normalized_to_absolute() {
    let commands = parse("M83\nG1 X1 E5\nG1 X2 E5\nG1 X3 E-2").unwrap();
    let state = MachineState::replay(&commands);

    assert!((state.e - 8.0).abs() < EPSILON);
    assert!(state.retracted);
}

#[test]
fn test_g92_sets_registers_without_motion() {
    let commands = parse("G1 X5 Y5 E100\nG92 E0\nG1 X6 E1.5").unwrap();
    let state = MachineState::replay(&commands);

    assert!((state.e - 1.5).abs() < EPSILON);
    assert!((state.x - 6.0).abs() < EPSILON);
    assert!(!state.retracted);
}

#[test]
fn test_retraction_flag_tracks_last_filament_direction() {
    let commands = parse("G1 X1 E2.0\nG1 F2400 E0.0").unwrap();
    let retracted = MachineState::replay(&commands);
    assert!(retracted.retracted);

    let commands = parse("G1 X1 E2.0\nG1 F2400 E0.0\nG1 F2400 E2.0").unwrap();
    let primed = MachineState::replay(&commands);
    assert!(!primed.retracted);
}

#[test]
fn test_position_unknown_until_xy_seen() {
    let commands = parse("M104 S200\nG0 Z0.4\nG1 E2").unwrap();
    let state = MachineState::replay(&commands);
    assert!(!state.position_known);
}

#[test]
fn test_matches_position_ignores_feed_rate() {
    let a = MachineState::replay(&parse("G0 F6000 X1 Y2 Z3\nG1 E4").unwrap());
    let b = MachineState::replay(&parse("G0 F1200 X1 Y2 Z3\nG1 E4").unwrap());
    assert!(a.matches_position(&b, EPSILON));
}

#[test]
fn test_state_survives_json_round_trip() {
    let state = MachineState::replay(&parse("G0 F6000 X1.5 Y2.5 Z0.3\nG1 E4.25").unwrap());
    let json = serde_json::to_string(&state).unwrap();
    let back: MachineState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, back);
}

#[test]
fn test_matches_position_detects_retraction_mismatch() {
    let a = MachineState::replay(&parse("G1 X1 E2").unwrap());
    let mut b = a;
    b.retracted = true;
    assert!(!a.matches_position(&b, EPSILON));
}
