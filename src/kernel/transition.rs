/// Blackout window inserted on every Working/Break boundary.
///
/// While open, the reactor skips phase evaluation entirely, so detection
/// state carried over from the previous phase cannot immediately re-trigger
/// an exit condition in the new one.
#[derive(Debug)]
pub struct TransitionGate {
    elapsed: Option<u32>,
    hold_secs: u32,
}

impl TransitionGate {
    pub fn new(hold_secs: u32) -> Self {
        Self {
            elapsed: None,
            hold_secs,
        }
    }

    pub fn open(&mut self) {
        self.elapsed = Some(0);
    }

    pub fn is_open(&self) -> bool {
        self.elapsed.is_some()
    }

    pub fn advance_second(&mut self) {
        if let Some(elapsed) = &mut self.elapsed {
            if *elapsed < self.hold_secs {
                *elapsed += 1;
            }
        }
    }

    pub fn expired(&self) -> bool {
        matches!(self.elapsed, Some(e) if e >= self.hold_secs)
    }

    pub fn close(&mut self) {
        self.elapsed = None;
    }
}
