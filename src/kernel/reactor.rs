use std::time::Instant;

use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::RobotConfig;
use crate::outputs::audio::AudioCue;
use crate::outputs::display::Expression;
use crate::outputs::servo::ServoCommand;
use crate::vision::handoff::LatestCell;
use crate::vision::types::{DetectionSample, START_POMODORO, STOP_POMODORO};

use super::clock::SecondsClock;
use super::confirm::ConfirmTarget;
use super::effect::{SideEffect, TaskAction};
use super::smoothing::{SmoothedStatus, StatusFilter};
use super::state::{PomodoroPhase, RobotState};

/// Driver cadence. One tick polls the perception cell and advances the
/// second-resolution counters; it must stay well under a second so gestures
/// land in the tick they were classified in.
pub const TICK_MS: u64 = 200;

/// The control kernel: a single-owner state machine stepped by the driver.
///
/// `tick_step` never performs I/O and never awaits. Peripherals only ever
/// see the `SideEffect` list it returns.
pub struct Reactor {
    config: RobotConfig,
    pub state: RobotState,
    filter: StatusFilter,
    clock: SecondsClock,
    session_id: Option<Uuid>,
}

impl Reactor {
    pub fn new(config: RobotConfig) -> Self {
        let state = RobotState::new(
            config.confirm_buffer_secs,
            config.confirm_timeout_secs,
            config.transition_hold_secs,
            config.reminder_cooldown_secs,
        );
        let filter = StatusFilter::new(
            config.history_size,
            config.label_conf_thresh,
            config.working_labels.iter().cloned(),
        );
        Self {
            config,
            state,
            filter,
            clock: SecondsClock::new(),
            session_id: None,
        }
    }

    /// One step of the loop: advance the counters by the elapsed whole
    /// seconds, fold in at most one classification sample, then run the
    /// active phase's rules top to bottom. At most one state-changing action
    /// fires per tick.
    pub fn tick_step(
        &mut self,
        whole_secs: u32,
        sample: Option<DetectionSample>,
    ) -> Vec<SideEffect> {
        self.state.advance_seconds(whole_secs);

        if let Some(sample) = &sample {
            self.filter.observe(sample);
        }
        let status = self.filter.current_status();

        let mut effects = Vec::new();

        // Boundary blackout: while the gate is open the phases do not run.
        // The new phase's countdown is armed the moment the gate expires.
        if self.state.gate.is_open() {
            if self.state.gate.expired() {
                self.state.gate.close();
                self.arrive(&mut effects);
            }
            return effects;
        }

        match self.state.phase {
            PomodoroPhase::Idle => self.idle_rules(sample.as_ref(), &mut effects),
            PomodoroPhase::Working => self.working_rules(sample.as_ref(), status, &mut effects),
            PomodoroPhase::Break => self.break_rules(sample.as_ref(), &mut effects),
        }

        effects
    }

    /// Convenience step for drivers: samples the monotonic clock itself.
    pub fn step_now(&mut self, sample: Option<DetectionSample>) -> Vec<SideEffect> {
        let whole_secs = self.clock.advance(Instant::now());
        self.tick_step(whole_secs, sample)
    }

    /// Lean async driver: fixed cadence, non-blocking reads of the
    /// perception cell, side effects handed to the caller.
    pub async fn run<F>(
        &mut self,
        latest: LatestCell<DetectionSample>,
        cancel: CancellationToken,
        mut execute: F,
    ) where
        F: FnMut(SideEffect),
    {
        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("control loop active, tick {}ms", TICK_MS);

        loop {
            tokio::select! {
                _ = cadence.tick() => {
                    let sample = latest.take();
                    for effect in self.step_now(sample) {
                        execute(effect);
                    }
                }
                _ = cancel.cancelled() => {
                    info!("control loop shutting down");
                    break;
                }
            }
        }
    }

    /// True when `sample` is this tick's fresh detection of `label` above
    /// the strict gesture threshold.
    fn gesture(&self, sample: Option<&DetectionSample>, label: &str) -> bool {
        matches!(
            sample,
            Some(s) if s.label == label && s.confidence > self.config.status_conf_thresh
        )
    }

    fn idle_rules(&mut self, sample: Option<&DetectionSample>, effects: &mut Vec<SideEffect>) {
        if self.state.countdown.running() || !self.gesture(sample, START_POMODORO) {
            return;
        }

        let session = Uuid::new_v4();
        self.session_id = Some(session);
        info!(%session, work_secs = self.config.work_secs, "work session started");

        self.state.phase = PomodoroPhase::Working;
        self.state.countdown.arm(self.config.work_secs);
        effects.push(SideEffect::Face(Expression::Working));
        effects.push(SideEffect::Servo(ServoCommand::WorkSweep {
            secs: self.config.work_secs,
        }));
        effects.push(SideEffect::Cue(AudioCue::WorkStart));
        effects.push(SideEffect::Task(TaskAction::ClaimRecent));
    }

    fn working_rules(
        &mut self,
        sample: Option<&DetectionSample>,
        status: SmoothedStatus,
        effects: &mut Vec<SideEffect>,
    ) {
        // Reminder suppression re-arms after its cooldown.
        if self.state.reminder.cooled_down() {
            self.state.reminder.reset();
        }

        if self.state.dialog.is_pending() {
            if self.state.dialog.in_window() && self.gesture(sample, STOP_POMODORO) {
                self.state.dialog.close();
                self.end_session(effects, Some(TaskAction::Reopen), None);
                return;
            }
            if self.state.dialog.timed_out() {
                debug!("end-session dialog timed out, staying in Working");
                self.state.dialog.close();
            }
        }

        if !self.state.dialog.is_pending() && self.gesture(sample, STOP_POMODORO) {
            info!("asking: end the session?");
            self.state.dialog.open(ConfirmTarget::EndSession);
            effects.push(SideEffect::Face(Expression::Loading));
            return;
        }

        if status == SmoothedStatus::Distracted && !self.state.reminder.is_set() {
            self.state.reminder.set();
            effects.push(SideEffect::Face(Expression::Distracted));
            effects.push(SideEffect::Cue(AudioCue::Distraction));
            return;
        }

        if self.state.countdown.expired() {
            self.begin_transition(PomodoroPhase::Break, effects);
        }
    }

    fn break_rules(&mut self, sample: Option<&DetectionSample>, effects: &mut Vec<SideEffect>) {
        if self.state.dialog.is_pending() {
            if self.state.dialog.in_window() {
                // Either gesture ends the break; they differ only in what
                // happens to the claimed task.
                let outcome = if self.gesture(sample, STOP_POMODORO) {
                    Some((TaskAction::Reopen, None))
                } else if self.gesture(sample, START_POMODORO) {
                    Some((TaskAction::Finish, Some(AudioCue::SessionComplete)))
                } else {
                    None
                };
                if let Some((task, cue)) = outcome {
                    self.state.dialog.close();
                    self.end_session(effects, Some(task), cue);
                    return;
                }
            }
            if self.state.dialog.timed_out() {
                debug!("task-done dialog timed out, staying on Break");
                self.state.dialog.close();
            }
        }

        if let Some(s) = sample {
            if s.found {
                if !self.state.dialog.is_pending() && self.gesture(sample, STOP_POMODORO) {
                    info!("asking: is the task finished?");
                    self.state.dialog.open(ConfirmTarget::TaskDone);
                    effects.push(SideEffect::Face(Expression::Loading));
                    return;
                }

                if !self.state.reminder.is_set() {
                    self.state.reminder.set();
                    effects.push(SideEffect::Face(Expression::BreakReminder));
                    effects.push(SideEffect::Cue(AudioCue::BreakReminder));
                    return;
                }
            }
        }

        if self.state.countdown.expired() {
            self.begin_transition(PomodoroPhase::Working, effects);
        }
    }

    /// Commit a Working/Break boundary: the countdown stops, the phase
    /// flips, and the gate blacks out evaluation for the hold window.
    fn begin_transition(&mut self, next: PomodoroPhase, effects: &mut Vec<SideEffect>) {
        info!(?next, "phase boundary");
        self.state.countdown.stop();
        self.state.phase = next;
        self.state.gate.open();
        effects.push(SideEffect::Face(Expression::Idle));
    }

    /// Gate expiry: arm the freshly entered phase and announce it.
    fn arrive(&mut self, effects: &mut Vec<SideEffect>) {
        match self.state.phase {
            PomodoroPhase::Working => {
                self.state.countdown.arm(self.config.work_secs);
                effects.push(SideEffect::Face(Expression::Working));
                effects.push(SideEffect::Servo(ServoCommand::WorkSweep {
                    secs: self.config.work_secs,
                }));
                effects.push(SideEffect::Cue(AudioCue::WorkStart));
            }
            PomodoroPhase::Break => {
                self.state.countdown.arm(self.config.break_secs);
                effects.push(SideEffect::Face(Expression::Break));
                effects.push(SideEffect::Servo(ServoCommand::BreakSweep {
                    secs: self.config.break_secs,
                }));
                effects.push(SideEffect::Cue(AudioCue::BreakStart));
            }
            PomodoroPhase::Idle => {}
        }
    }

    /// Tear down to Idle from either active phase.
    fn end_session(
        &mut self,
        effects: &mut Vec<SideEffect>,
        task: Option<TaskAction>,
        cue: Option<AudioCue>,
    ) {
        if let Some(session) = self.session_id.take() {
            info!(%session, "session ended");
        }
        self.state.phase = PomodoroPhase::Idle;
        self.state.countdown.stop();
        effects.push(SideEffect::Face(Expression::Idle));
        effects.push(SideEffect::Servo(ServoCommand::Rest));
        if let Some(cue) = cue {
            effects.push(SideEffect::Cue(cue));
        }
        if let Some(task) = task {
            effects.push(SideEffect::Task(task));
        }
    }
}
