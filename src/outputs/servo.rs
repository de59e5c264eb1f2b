use std::time::Duration;

use tracing::info;

/// The arm's full travel and where it parks.
pub const SWEEP_DEGREES: u32 = 180;
pub const REST_ANGLE: u32 = 180;

/// Motion requests from the kernel. Fire-and-forget; repeating one is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    /// Sweep from rest to the far stop across the whole work countdown, so
    /// the arm doubles as an analog progress dial.
    WorkSweep { secs: u32 },
    /// Sweep back across the break countdown.
    BreakSweep { secs: u32 },
    /// Park at the rest angle.
    Rest,
    /// Short attention-getting oscillation around center.
    Taunt,
}

/// Pacing for a timed sweep: one degree per step, the delay stretched so
/// the full arc spans the requested duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPlan {
    pub from_deg: u32,
    pub to_deg: u32,
    pub step_delay: Duration,
}

impl SweepPlan {
    pub fn for_command(command: ServoCommand) -> Option<SweepPlan> {
        match command {
            ServoCommand::WorkSweep { secs } => Some(SweepPlan {
                from_deg: REST_ANGLE,
                to_deg: 0,
                step_delay: Duration::from_secs_f64(f64::from(secs) / f64::from(SWEEP_DEGREES)),
            }),
            ServoCommand::BreakSweep { secs } => Some(SweepPlan {
                from_deg: 0,
                to_deg: REST_ANGLE,
                step_delay: Duration::from_secs_f64(f64::from(secs) / f64::from(SWEEP_DEGREES)),
            }),
            ServoCommand::Rest | ServoCommand::Taunt => None,
        }
    }

    pub fn steps(&self) -> u32 {
        self.from_deg.abs_diff(self.to_deg)
    }

    pub fn total(&self) -> Duration {
        self.step_delay * self.steps()
    }
}

pub trait ServoSink: Send {
    fn drive(&mut self, command: ServoCommand);
}

/// Stand-in for the PWM mover on rigs without the horn attached.
pub struct LogServo;

impl ServoSink for LogServo {
    fn drive(&mut self, command: ServoCommand) {
        match SweepPlan::for_command(command) {
            Some(plan) => info!(
                ?command,
                step_ms = plan.step_delay.as_millis() as u64,
                "servo sweep"
            ),
            None => info!(?command, "servo"),
        }
    }
}
