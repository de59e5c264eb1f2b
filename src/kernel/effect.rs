use crate::outputs::audio::AudioCue;
use crate::outputs::display::Expression;
use crate::outputs::servo::ServoCommand;

/// Commands the pure tick step hands back to the driver. All of them are
/// fire-and-forget; the kernel never waits on a peripheral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SideEffect {
    Face(Expression),
    Servo(ServoCommand),
    Cue(AudioCue),
    Task(TaskAction),
}

/// Task-database intents, realized against the companion app by the link
/// layer outside the loop thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Pull the top TODO task and mark it ONGOING for this session.
    ClaimRecent,
    /// Return the claimed task to TODO.
    Reopen,
    /// Mark the claimed task FINISHED.
    Finish,
}
