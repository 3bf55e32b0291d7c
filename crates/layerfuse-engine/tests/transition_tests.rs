//! Transition synthesis tests

use layerfuse_core::{MachineState, EPSILON};
use layerfuse_engine::{TransitionCalculator, TransitionError, TransitionSettings};

fn state(x: f64, y: f64, z: f64, e: f64) -> MachineState {
    MachineState {
        x,
        y,
        z,
        e,
        position_known: true,
        ..MachineState::new()
    }
}

fn moves_of(transition: &layerfuse_engine::Transition) -> Vec<String> {
    transition
        .commands
        .iter()
        .filter(|c| !c.raw.starts_with(';'))
        .map(|c| c.raw.clone())
        .collect()
}

#[test]
fn test_transition_command_sequence() {
    let calculator = TransitionCalculator::new(TransitionSettings {
        z_hop: 2.0,
        retraction_distance: 1.0,
        ..TransitionSettings::default()
    });
    let exit = state(5.0, 5.0, 9.8, 120.0);
    let entry = state(0.0, 0.0, 10.0, 0.0);

    let transition = calculator.compute(&exit, &entry).unwrap();
    assert_eq!(
        moves_of(&transition),
        vec![
            "G1 F2100 E119.00000",
            "G0 F600 Z11.800",
            "G0 F7200 X0.000 Y0.000",
            "G0 F600 Z10.000",
            "G1 F2100 E120.00000",
            "G92 E0.00000",
        ]
    );
}

#[test]
fn test_transition_replay_reaches_entry_state() {
    let calculator = TransitionCalculator::new(TransitionSettings::default());
    let exit = state(20.0, 20.0, 9.8, 98.0);
    let entry = state(10.0, 15.0, 10.0, 198.0);

    let transition = calculator.compute(&exit, &entry).unwrap();
    let replayed = MachineState::replay_from(exit, &transition.commands);
    assert!(replayed.matches_position(&entry, EPSILON));
}

#[test]
fn test_retracted_exit_skips_retraction_step() {
    let calculator = TransitionCalculator::new(TransitionSettings {
        retraction_distance: 1.0,
        ..TransitionSettings::default()
    });
    let mut exit = state(5.0, 5.0, 9.8, 120.0);
    exit.retracted = true;
    let entry = state(0.0, 0.0, 10.0, 0.0);

    let transition = calculator.compute(&exit, &entry).unwrap();
    let moves = moves_of(&transition);
    // No initial retraction; prime pushes past the exit E value
    assert_eq!(moves[0], "G0 F600 Z10.200");
    assert!(moves.contains(&"G1 F2100 E121.00000".to_string()));
}

#[test]
fn test_retracted_entry_skips_prime_step() {
    let calculator = TransitionCalculator::new(TransitionSettings {
        retraction_distance: 1.0,
        ..TransitionSettings::default()
    });
    let exit = state(5.0, 5.0, 9.8, 120.0);
    let mut entry = state(0.0, 0.0, 10.0, 0.0);
    entry.retracted = true;

    let transition = calculator.compute(&exit, &entry).unwrap();
    let moves = moves_of(&transition);
    assert!(!moves.iter().any(|m| m == "G1 F2100 E120.00000"));
    assert_eq!(moves.last().unwrap(), "G92 E0.00000");

    let replayed = MachineState::replay_from(exit, &transition.commands);
    assert!(replayed.retracted);
}

#[test]
fn test_relative_exit_modes_restored_to_absolute() {
    let calculator = TransitionCalculator::new(TransitionSettings::default());
    let mut exit = state(5.0, 5.0, 9.8, 120.0);
    exit.absolute_xyz = false;
    exit.absolute_e = false;
    let entry = state(0.0, 0.0, 10.0, 0.0);

    let transition = calculator.compute(&exit, &entry).unwrap();
    let moves = moves_of(&transition);
    assert_eq!(moves[0], "G90");
    assert_eq!(moves[1], "M82");
}

#[test]
fn test_unknown_exit_position_is_rejected() {
    let calculator = TransitionCalculator::new(TransitionSettings::default());
    let mut exit = state(5.0, 5.0, 9.8, 120.0);
    exit.position_known = false;
    let entry = state(0.0, 0.0, 10.0, 0.0);

    match calculator.compute(&exit, &entry) {
        Err(TransitionError::MissingPosition { endpoint }) => assert_eq!(endpoint, "exit"),
        other => panic!("expected MissingPosition, got {:?}", other),
    }
}

#[test]
fn test_state_comments_bracket_the_block() {
    let calculator = TransitionCalculator::new(TransitionSettings::default());
    let exit = state(5.0, 5.0, 9.8, 120.0);
    let entry = state(0.0, 0.0, 10.0, 0.0);

    let transition = calculator.compute(&exit, &entry).unwrap();
    let first = &transition.commands.first().unwrap().raw;
    let last = &transition.commands.last().unwrap().raw;
    assert!(first.contains("TRANSITION CODE START"));
    assert!(last.contains("TRANSITION CODE END"));
    assert!(transition
        .commands
        .iter()
        .any(|c| c.raw.contains("Previous section ended at")));
}
