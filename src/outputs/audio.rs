use std::path::PathBuf;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Voice cues, keyed to the pre-generated clip set on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCue {
    Greeting,
    Connected,
    WorkStart,
    BreakStart,
    Distraction,
    BreakReminder,
    SessionComplete,
}

impl AudioCue {
    pub fn file_stem(&self) -> &'static str {
        match self {
            AudioCue::Greeting => "system_ready",
            AudioCue::Connected => "bluetooth_connected",
            AudioCue::WorkStart => "working",
            AudioCue::BreakStart => "break_start",
            AudioCue::Distraction => "distraction_detected",
            AudioCue::BreakReminder => "break_reminder",
            AudioCue::SessionComplete => "session_complete",
        }
    }
}

pub trait AudioSink: Send {
    fn play(&mut self, cue: AudioCue);
}

/// Fire-and-forget clip player. A new cue replaces whatever is still
/// playing; the kernel never waits on playback.
pub struct CuePlayer {
    dir: PathBuf,
    current: Option<Child>,
}

impl CuePlayer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            current: None,
        }
    }
}

impl AudioSink for CuePlayer {
    fn play(&mut self, cue: AudioCue) {
        if let Some(mut previous) = self.current.take() {
            let _ = previous.start_kill();
        }
        let path = self.dir.join(format!("{}.mp3", cue.file_stem()));
        match Command::new("mpg123")
            .arg("-q")
            .arg(&path)
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => {
                info!(cue = cue.file_stem(), "cue");
                self.current = Some(child);
            }
            Err(e) => warn!(cue = cue.file_stem(), "cue playback failed: {e}"),
        }
    }
}

/// Sink for rigs with no speaker wired up.
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, cue: AudioCue) {
        debug!(cue = cue.file_stem(), "cue suppressed");
    }
}
