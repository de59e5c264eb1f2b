use super::confirm::ConfirmationDialog;
use super::transition::TransitionGate;

/// The top-level phases. Exactly one is active at any time; transitions are
/// the only place the countdown is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PomodoroPhase {
    Idle,
    Working,
    Break,
}

/// Work/break countdown. Decrements once per second while running.
#[derive(Debug, Default)]
pub struct Countdown {
    remaining_secs: u32,
    running: bool,
}

impl Countdown {
    pub fn arm(&mut self, secs: u32) {
        self.remaining_secs = secs;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.remaining_secs = 0;
    }

    pub fn advance_second(&mut self) {
        if self.running && self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }
    }

    /// The armed timer ran out; time for a phase boundary.
    pub fn expired(&self) -> bool {
        self.running && self.remaining_secs == 0
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }
}

/// Suppresses repeat reminders. Once set, it holds until the cooldown has
/// elapsed, after which a fresh distraction episode may trigger again.
#[derive(Debug)]
pub struct ReminderLatch {
    set: bool,
    elapsed: u32,
    cooldown_secs: u32,
}

impl ReminderLatch {
    pub fn new(cooldown_secs: u32) -> Self {
        Self {
            set: false,
            elapsed: 0,
            cooldown_secs,
        }
    }

    pub fn set(&mut self) {
        self.set = true;
        self.elapsed = 0;
    }

    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn advance_second(&mut self) {
        if self.set && self.elapsed < self.cooldown_secs {
            self.elapsed += 1;
        }
    }

    pub fn cooled_down(&self) -> bool {
        self.set && self.elapsed >= self.cooldown_secs
    }

    pub fn reset(&mut self) {
        self.set = false;
        self.elapsed = 0;
    }
}

/// Everything the control loop mutates, owned in one place. The reactor is
/// the only writer; `advance_seconds` is the only way time moves.
#[derive(Debug)]
pub struct RobotState {
    pub phase: PomodoroPhase,
    pub countdown: Countdown,
    pub dialog: ConfirmationDialog,
    pub gate: TransitionGate,
    pub reminder: ReminderLatch,
}

impl RobotState {
    pub fn new(
        confirm_buffer_secs: u32,
        confirm_timeout_secs: u32,
        transition_hold_secs: u32,
        reminder_cooldown_secs: u32,
    ) -> Self {
        Self {
            phase: PomodoroPhase::Idle,
            countdown: Countdown::default(),
            dialog: ConfirmationDialog::new(confirm_buffer_secs, confirm_timeout_secs),
            gate: TransitionGate::new(transition_hold_secs),
            reminder: ReminderLatch::new(reminder_cooldown_secs),
        }
    }

    /// Fan one tick's worth of wall time out to the per-protocol counters.
    /// Each runs on its own gate flag, so the sub-protocols never
    /// contaminate each other's clocks.
    pub fn advance_seconds(&mut self, whole_secs: u32) {
        for _ in 0..whole_secs {
            self.countdown.advance_second();
            self.dialog.advance_second();
            self.reminder.advance_second();
            self.gate.advance_second();
        }
    }
}
