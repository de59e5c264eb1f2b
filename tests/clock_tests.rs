use std::time::{Duration, Instant};

use pomobot::kernel::clock::SecondsClock;
use pomobot::outputs::servo::{ServoCommand, SweepPlan};

#[test]
fn sub_second_ticks_accumulate_into_whole_seconds() {
    let mut clock = SecondsClock::new();
    let base = Instant::now();

    assert_eq!(clock.advance(base), 0, "first sample only anchors the clock");
    assert_eq!(clock.advance(base + Duration::from_millis(700)), 0);
    assert_eq!(
        clock.advance(base + Duration::from_millis(1400)),
        1,
        "1.4s accumulated, one whole second consumed"
    );
    assert_eq!(
        clock.advance(base + Duration::from_millis(2100)),
        1,
        "carry must survive: 0.4 + 0.7 = 1.1"
    );
    assert_eq!(clock.advance(base + Duration::from_millis(2200)), 0);
}

#[test]
fn a_stalled_loop_catches_up_in_one_tick() {
    let mut clock = SecondsClock::new();
    let base = Instant::now();

    clock.advance(base);
    assert_eq!(
        clock.advance(base + Duration::from_secs(5)),
        5,
        "a 5-second stall must yield 5 counter steps at once"
    );
}

#[test]
fn spinning_faster_than_the_clock_yields_nothing() {
    let mut clock = SecondsClock::new();
    let base = Instant::now();

    clock.advance(base);
    for i in 1..=9 {
        assert_eq!(clock.advance(base + Duration::from_millis(i * 100)), 0);
    }
    assert_eq!(clock.advance(base + Duration::from_millis(1000)), 1);
}

#[test]
fn work_sweep_paces_one_degree_at_a_time() {
    let plan = SweepPlan::for_command(ServoCommand::WorkSweep { secs: 900 })
        .expect("timed sweep must have a plan");

    assert_eq!(plan.from_deg, 180);
    assert_eq!(plan.to_deg, 0);
    assert_eq!(plan.steps(), 180);
    assert_eq!(plan.step_delay, Duration::from_secs(5));
    assert_eq!(plan.total(), Duration::from_secs(900));
}

#[test]
fn break_sweep_runs_the_arc_backwards() {
    let plan = SweepPlan::for_command(ServoCommand::BreakSweep { secs: 360 })
        .expect("timed sweep must have a plan");

    assert_eq!(plan.from_deg, 0);
    assert_eq!(plan.to_deg, 180);
    assert_eq!(plan.step_delay, Duration::from_secs(2));
    assert_eq!(plan.total(), Duration::from_secs(360));
}

#[test]
fn rest_and_taunt_are_not_timed_sweeps() {
    assert_eq!(SweepPlan::for_command(ServoCommand::Rest), None);
    assert_eq!(SweepPlan::for_command(ServoCommand::Taunt), None);
}
