/// What the robot is asking the user to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmTarget {
    /// "Are you sure you want to end the session?"
    EndSession,
    /// "Is the task finished?"
    TaskDone,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    target: ConfirmTarget,
    elapsed: u32,
}

/// The yes/no dialog gate.
///
/// Answers are honored only inside the response window: the opening buffer
/// exists so the gesture that raised the question cannot also be read as its
/// answer. Past the timeout the dialog closes silently and nothing changes;
/// no answer is never treated as consent.
#[derive(Debug)]
pub struct ConfirmationDialog {
    pending: Option<Pending>,
    buffer_secs: u32,
    timeout_secs: u32,
}

impl ConfirmationDialog {
    pub fn new(buffer_secs: u32, timeout_secs: u32) -> Self {
        Self {
            pending: None,
            buffer_secs,
            timeout_secs,
        }
    }

    /// Ask a question. No-op while one is already pending.
    pub fn open(&mut self, target: ConfirmTarget) {
        if self.pending.is_none() {
            self.pending = Some(Pending { target, elapsed: 0 });
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn target(&self) -> Option<ConfirmTarget> {
        self.pending.map(|p| p.target)
    }

    /// One whole second of wall time. The counter saturates at the timeout
    /// bound; nothing downstream reads past it.
    pub fn advance_second(&mut self) {
        if let Some(pending) = &mut self.pending {
            if pending.elapsed < self.timeout_secs {
                pending.elapsed += 1;
            }
        }
    }

    /// True while an answer gesture would be honored.
    pub fn in_window(&self) -> bool {
        matches!(
            self.pending,
            Some(p) if p.elapsed > self.buffer_secs && p.elapsed < self.timeout_secs
        )
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.pending, Some(p) if p.elapsed >= self.timeout_secs)
    }

    pub fn close(&mut self) {
        self.pending = None;
    }
}
