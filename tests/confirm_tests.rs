use pomobot::config::RobotConfig;
use pomobot::kernel::effect::{SideEffect, TaskAction};
use pomobot::kernel::reactor::Reactor;
use pomobot::kernel::state::PomodoroPhase;
use pomobot::outputs::audio::AudioCue;
use pomobot::outputs::display::Expression;
use pomobot::outputs::servo::ServoCommand;
use pomobot::vision::types::{DetectionSample, START_POMODORO, STOP_POMODORO};

fn start_gesture() -> DetectionSample {
    DetectionSample::of(START_POMODORO, 0.9)
}

fn stop_gesture() -> DetectionSample {
    DetectionSample::of(STOP_POMODORO, 0.9)
}

/// A reactor already in Working with a comfortable countdown.
fn working_reactor() -> Reactor {
    let mut config = RobotConfig::default();
    config.work_secs = 100;
    config.break_secs = 30;
    let mut reactor = Reactor::new(config);
    reactor.tick_step(0, Some(start_gesture()));
    assert_eq!(reactor.state.phase, PomodoroPhase::Working);
    reactor
}

/// A reactor walked all the way into Break (countdown armed at 30).
fn break_reactor() -> Reactor {
    let mut config = RobotConfig::default();
    config.work_secs = 5;
    config.break_secs = 30;
    let mut reactor = Reactor::new(config);
    reactor.tick_step(0, Some(start_gesture()));

    // Run the work countdown out, then sit through the gate.
    for _ in 0..5 {
        reactor.tick_step(1, None);
    }
    assert_eq!(reactor.state.phase, PomodoroPhase::Break);
    for _ in 0..3 {
        reactor.tick_step(1, None);
    }
    assert!(!reactor.state.gate.is_open(), "gate must close after 3s");
    assert_eq!(reactor.state.countdown.remaining_secs(), 30);
    reactor
}

#[test]
fn stop_gesture_opens_the_dialog() {
    let mut reactor = working_reactor();
    let effects = reactor.tick_step(1, Some(stop_gesture()));

    assert!(reactor.state.dialog.is_pending());
    assert!(
        effects.contains(&SideEffect::Face(Expression::Loading)),
        "asking must show the loading face"
    );
    assert_eq!(reactor.state.phase, PomodoroPhase::Working);
}

#[test]
fn answer_inside_the_buffer_is_ignored() {
    let mut reactor = working_reactor();
    reactor.tick_step(1, Some(stop_gesture()));

    // elapsed = 1: still inside the 3-second debounce buffer.
    let effects = reactor.tick_step(1, Some(stop_gesture()));

    assert!(effects.is_empty(), "buffered gesture must change nothing");
    assert!(reactor.state.dialog.is_pending());
    assert_eq!(reactor.state.phase, PomodoroPhase::Working);
}

#[test]
fn answer_inside_the_window_resolves() {
    let mut reactor = working_reactor();
    reactor.tick_step(1, Some(stop_gesture()));
    for _ in 0..3 {
        reactor.tick_step(1, None);
    }

    // elapsed = 4: inside the acceptance window.
    let effects = reactor.tick_step(1, Some(stop_gesture()));

    assert_eq!(reactor.state.phase, PomodoroPhase::Idle);
    assert!(!reactor.state.dialog.is_pending());
    assert!(!reactor.state.countdown.running());
    assert!(effects.contains(&SideEffect::Servo(ServoCommand::Rest)));
    assert!(effects.contains(&SideEffect::Task(TaskAction::Reopen)));
}

#[test]
fn timeout_closes_without_phase_change() {
    let mut reactor = working_reactor();
    reactor.tick_step(1, Some(stop_gesture()));

    for _ in 0..6 {
        reactor.tick_step(1, None);
    }

    assert!(
        !reactor.state.dialog.is_pending(),
        "unanswered dialog must close at 6s"
    );
    assert_eq!(reactor.state.phase, PomodoroPhase::Working);
    assert!(
        reactor.state.countdown.running(),
        "timeout is a no-op, the session keeps running"
    );
}

#[test]
fn break_stop_answer_reopens_the_task() {
    let mut reactor = break_reactor();
    reactor.tick_step(1, Some(stop_gesture()));
    assert!(reactor.state.dialog.is_pending());
    for _ in 0..3 {
        reactor.tick_step(1, None);
    }

    let effects = reactor.tick_step(1, Some(stop_gesture()));

    assert_eq!(reactor.state.phase, PomodoroPhase::Idle);
    assert!(effects.contains(&SideEffect::Task(TaskAction::Reopen)));
    assert!(effects.contains(&SideEffect::Servo(ServoCommand::Rest)));
}

#[test]
fn break_start_answer_finishes_the_task() {
    let mut reactor = break_reactor();
    reactor.tick_step(1, Some(stop_gesture()));
    for _ in 0..3 {
        reactor.tick_step(1, None);
    }

    let effects = reactor.tick_step(1, Some(start_gesture()));

    // Same phase transition as the stop answer; only the task outcome
    // differs.
    assert_eq!(reactor.state.phase, PomodoroPhase::Idle);
    assert!(effects.contains(&SideEffect::Task(TaskAction::Finish)));
    assert!(effects.contains(&SideEffect::Cue(AudioCue::SessionComplete)));
}

#[test]
fn break_reminder_fires_once_per_latch() {
    let mut reactor = break_reactor();

    let mut reminders = 0;
    for _ in 0..5 {
        let effects = reactor.tick_step(1, Some(DetectionSample::of("standing", 0.9)));
        reminders += effects
            .iter()
            .filter(|e| **e == SideEffect::Face(Expression::BreakReminder))
            .count();
    }

    assert_eq!(reminders, 1, "a person on break is nudged exactly once");
    assert_eq!(reactor.state.phase, PomodoroPhase::Break);
}
