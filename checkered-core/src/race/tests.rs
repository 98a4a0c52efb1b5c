use glam::DVec3;
use proptest::prelude::*;

use crate::checkpoints::{GateSpec, Ring};
use crate::error::RaceError;
use crate::lap_info::EntityHandle;
use crate::race::{RaceEvent, RaceState};
use crate::settings::RaceSettings;

// Four gates around a 100x100 square, driven counter-clockwise when seen from +Y:
// gate 0 (lap flag) at the origin heading +X, then +Z, then -X, then -Z.
fn square_ring() -> Ring {
    Ring::build([
        GateSpec::new(DVec3::new(50.0, 0.0, 0.0), DVec3::X).lap_flag(),
        GateSpec::new(DVec3::new(100.0, 0.0, 50.0), DVec3::Z),
        GateSpec::new(DVec3::new(50.0, 0.0, 100.0), -DVec3::X),
        GateSpec::new(DVec3::new(0.0, 0.0, 50.0), -DVec3::Z),
    ])
    .expect("square ring is valid")
}

// a point just beyond each gate, in driving order starting after gate 1
fn beyond() -> [DVec3; 4] {
    [
        DVec3::new(100.0, 0.0, 55.0),
        DVec3::new(45.0, 0.0, 100.0),
        DVec3::new(0.0, 0.0, 45.0),
        DVec3::new(55.0, 0.0, 0.0),
    ]
}

fn race(lap_target: u32) -> RaceState {
    RaceState::new(RaceSettings { lap_target }).expect("lap target is positive")
}

#[test]
fn test_lap_counted_on_lap_flag_only() {
    let ring = square_ring();
    let mut state = race(1);
    let car = EntityHandle(7);
    state.register(car, DVec3::new(60.0, 0.0, 0.0)).unwrap();

    let mut laps = Vec::new();
    for (step, position) in beyond().iter().enumerate() {
        state.set_position(car, *position).unwrap();
        let events = state.tick(&ring, 0.5);

        let racer = state.racer(car).unwrap();
        laps.push(racer.lap_info.lap);
        assert_eq!(racer.lap_info.gate, (step + 1) % 4);
        assert!(events.contains(&RaceEvent::GateAdvanced {
            handle: car,
            gate: (step + 1) % 4
        }));
    }

    assert_eq!(laps, vec![0, 0, 0, 1]);
    let racer = state.racer(car).unwrap();
    assert_eq!(racer.finish_time, Some(2.0));
    assert!(state.is_complete());
}

#[test]
fn test_race_complete_carries_finish_order() {
    let ring = square_ring();
    let mut state = race(1);
    let (fast, slow) = (EntityHandle(1), EntityHandle(2));
    state
        .spawn_racers([(fast, DVec3::ZERO), (slow, DVec3::ZERO)])
        .unwrap();

    let mut complete = None;
    for (step, position) in beyond().iter().enumerate() {
        state.set_position(fast, *position).unwrap();
        if step > 0 {
            state.set_position(slow, beyond()[step - 1]).unwrap();
        }
        for event in state.tick(&ring, 1.0) {
            assert!(!matches!(event, RaceEvent::RaceComplete { .. }));
        }
    }
    assert!(!state.is_complete());
    assert_eq!(state.racer(fast).unwrap().race_position, 1);

    state.set_position(slow, beyond()[3]).unwrap();
    for event in state.tick(&ring, 1.0) {
        if let RaceEvent::RaceComplete { finishers } = event {
            complete = Some(finishers);
        }
    }

    let finishers = complete.expect("race should be complete");
    assert_eq!(finishers.len(), 2);
    assert_eq!(finishers[0].handle, fast);
    assert_eq!(finishers[0].finish_time, 4.0);
    assert_eq!(finishers[0].placement, 1);
    assert_eq!(finishers[1].handle, slow);
    assert_eq!(finishers[1].finish_time, 5.0);
    assert_eq!(finishers[1].placement, 2);

    // nobody finishes twice and the signal is not repeated
    for position in beyond() {
        state.set_position(fast, position).unwrap();
        let events = state.tick(&ring, 1.0);
        assert!(events
            .iter()
            .all(|e| !matches!(e, RaceEvent::RaceComplete { .. } | RaceEvent::Finished { .. })));
    }
    assert_eq!(state.racer(fast).unwrap().lap_info.lap, 2);
    assert_eq!(state.finishers().len(), 2);
}

#[test]
fn test_first_lap_finishes_even_with_higher_target() {
    let ring = square_ring();
    let mut state = race(3);
    let car = EntityHandle(3);
    state.register(car, DVec3::new(60.0, 0.0, 0.0)).unwrap();

    let mut finished = Vec::new();
    for position in beyond() {
        state.set_position(car, position).unwrap();
        finished.extend(
            state
                .tick(&ring, 1.0)
                .into_iter()
                .filter(|e| matches!(e, RaceEvent::Finished { .. })),
        );
    }

    let racer = state.racer(car).unwrap();
    assert_eq!(racer.lap_info.lap, 1);
    assert_eq!(racer.finish_time, Some(4.0));
    assert_eq!(
        finished,
        vec![RaceEvent::Finished {
            handle: car,
            finish_time: 4.0,
            placement: 1
        }]
    );

    // a second lap doesn't stamp a new time
    for position in beyond() {
        state.set_position(car, position).unwrap();
        let events = state.tick(&ring, 1.0);
        assert!(events
            .iter()
            .all(|e| !matches!(e, RaceEvent::Finished { .. } | RaceEvent::RaceComplete { .. })));
    }
    let racer = state.racer(car).unwrap();
    assert_eq!(racer.lap_info.lap, 2);
    assert_eq!(racer.finish_time, Some(4.0));
}

#[test]
fn test_late_racer_does_not_repeat_race_complete() {
    let ring = square_ring();
    let mut state = race(1);
    let (first, late) = (EntityHandle(1), EntityHandle(9));
    state.register(first, DVec3::new(60.0, 0.0, 0.0)).unwrap();

    let mut completions = 0;
    for position in beyond() {
        state.set_position(first, position).unwrap();
        completions += state
            .tick(&ring, 1.0)
            .iter()
            .filter(|e| matches!(e, RaceEvent::RaceComplete { .. }))
            .count();
    }
    assert_eq!(completions, 1);
    assert!(state.is_complete());

    state.register(late, DVec3::new(60.0, 0.0, 0.0)).unwrap();
    let mut late_finish = None;
    for position in beyond() {
        state.set_position(late, position).unwrap();
        for event in state.tick(&ring, 1.0) {
            match event {
                RaceEvent::RaceComplete { .. } => completions += 1,
                RaceEvent::Finished { placement, .. } => late_finish = Some(placement),
                _ => {}
            }
        }
    }
    assert_eq!(late_finish, Some(2));
    assert_eq!(completions, 1);
    assert_eq!(state.finishers().len(), 2);
}

#[test]
fn test_unknown_racer_is_an_error() {
    let ring = square_ring();
    let mut state = race(3);
    let ghost = EntityHandle(99);

    assert_eq!(
        state.racer(ghost).unwrap_err(),
        RaceError::RacerNotFound { handle: ghost }
    );
    assert_eq!(
        state.set_position(ghost, DVec3::ZERO).unwrap_err(),
        RaceError::RacerNotFound { handle: ghost }
    );
    assert!(state.respawn_point(&ring, ghost).is_err());
}

#[test]
fn test_duplicate_racer_and_bad_lap_target() {
    let mut state = race(2);
    state.register(EntityHandle(1), DVec3::ZERO).unwrap();
    assert_eq!(
        state.register(EntityHandle(1), DVec3::X).unwrap_err(),
        RaceError::DuplicateRacer {
            handle: EntityHandle(1)
        }
    );
    assert!(matches!(
        RaceState::new(RaceSettings { lap_target: 0 }),
        Err(RaceError::InvalidLapTarget)
    ));
}

#[test]
fn test_respawn_point_is_last_passed_gate() {
    let ring = square_ring();
    let mut state = race(2);
    let car = EntityHandle(3);
    state.register(car, beyond()[0]).unwrap();
    assert_eq!(
        state.respawn_point(&ring, car).unwrap(),
        ring.gate(0).anchor
    );

    state.tick(&ring, 0.1);
    assert_eq!(
        state.respawn_point(&ring, car).unwrap(),
        ring.gate(1).anchor
    );
}

#[test]
fn test_standings_sorted_and_reset_clears() {
    let ring = square_ring();
    let mut state = race(2);
    state
        .spawn_racers([
            (EntityHandle(10), DVec3::new(90.0, 0.0, 0.0)),
            (EntityHandle(11), beyond()[0]),
            (EntityHandle(12), DVec3::new(70.0, 0.0, -20.0)),
        ])
        .unwrap();
    state.tick(&ring, 0.02);

    let standings = state.standings();
    let handles: Vec<_> = standings.iter().map(|s| s.handle).collect();
    // 11 is through gate 1; of the other two, 10 is closer to gate 1's plane
    assert_eq!(
        handles,
        vec![EntityHandle(11), EntityHandle(10), EntityHandle(12)]
    );
    assert_eq!(standings[0].race_position, 1);
    assert_eq!(standings[0].finish_time, None);

    state.reset();
    assert_eq!(state.racer_count(), 0);
    assert_eq!(state.clock(), 0.0);
    assert!(state.standings().is_empty());
}

proptest! {
    #[test]
    fn prop_gate_and_lap_only_move_forward(
        path in prop::collection::vec((-20.0f64..120.0, -20.0f64..120.0), 1..80)
    ) {
        let ring = square_ring();
        let mut state = race(2);
        let car = EntityHandle(0);
        state.register(car, DVec3::ZERO).unwrap();

        let mut gate = 0;
        let mut lap = 0;
        for (x, z) in path {
            state.set_position(car, DVec3::new(x, 0.0, z)).unwrap();
            state.tick(&ring, 0.02);

            let racer = state.racer(car).unwrap();
            let step = (racer.lap_info.gate + ring.count() - gate) % ring.count();
            prop_assert!(step <= 1);
            prop_assert!(racer.lap_info.lap >= lap);
            prop_assert!(racer.lap_info.lap - lap <= 1);
            gate = racer.lap_info.gate;
            lap = racer.lap_info.lap;
        }
    }
}
