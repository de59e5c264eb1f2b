use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::link::protocol::PeerConfig;
use crate::vision::types::{START_POMODORO, STOP_POMODORO};

/// Activities that count as on-task. The two gesture labels are included so
/// a command pose never votes toward "distracted".
pub const DEFAULT_WORKING_LABELS: [&str; 6] = [
    "sitting",
    "using_laptop",
    "writing",
    "reading",
    START_POMODORO,
    STOP_POMODORO,
];

/// Everything tunable about the robot, resolved once at boot. The timer
/// durations may later be overridden by the companion app's config reply;
/// nothing here changes at runtime.
#[derive(Debug, Clone)]
pub struct RobotConfig {
    pub work_secs: u32,
    pub break_secs: u32,

    /// Strict threshold for explicit gesture commands.
    pub status_conf_thresh: f32,
    /// Looser threshold for samples entering the smoothing window.
    pub label_conf_thresh: f32,
    pub history_size: usize,
    pub working_labels: HashSet<String>,

    /// Answer gestures are ignored while the dialog is at most this old.
    pub confirm_buffer_secs: u32,
    /// The dialog closes unanswered at this age.
    pub confirm_timeout_secs: u32,
    pub reminder_cooldown_secs: u32,
    pub transition_hold_secs: u32,

    /// Only every Nth camera frame is offered to the inference worker.
    pub frame_stride: u32,

    pub classifier_url: String,
    pub camera_url: String,
    pub peer_addr: String,
    pub faces_dir: PathBuf,
    pub audio_dir: PathBuf,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            break_secs: 5 * 60,
            status_conf_thresh: 0.85,
            label_conf_thresh: 0.6,
            history_size: 5,
            working_labels: DEFAULT_WORKING_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confirm_buffer_secs: 2,
            confirm_timeout_secs: 6,
            reminder_cooldown_secs: 3,
            transition_hold_secs: 3,
            frame_stride: 5,
            classifier_url: "http://127.0.0.1:8000/infer".to_string(),
            camera_url: "http://127.0.0.1:81/frame.jpg".to_string(),
            peer_addr: "127.0.0.1:7856".to_string(),
            faces_dir: PathBuf::from("assets/faces"),
            audio_dir: PathBuf::from("assets/audio"),
        }
    }
}

impl RobotConfig {
    /// Defaults plus the environment overrides a bench rig usually needs.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = env::var("POMOBOT_CLASSIFIER_URL") {
            config.classifier_url = v;
        }
        if let Ok(v) = env::var("POMOBOT_CAMERA_URL") {
            config.camera_url = v;
        }
        if let Ok(v) = env::var("POMOBOT_PEER_ADDR") {
            config.peer_addr = v;
        }
        if let Ok(v) = env::var("POMOBOT_FACES_DIR") {
            config.faces_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("POMOBOT_AUDIO_DIR") {
            config.audio_dir = PathBuf::from(v);
        }
        config
    }

    /// Durations handed down by the companion app override the defaults.
    pub fn apply_peer(&mut self, peer: &PeerConfig) {
        self.work_secs = peer.work_time;
        self.break_secs = peer.break_time;
        info!(
            work_secs = self.work_secs,
            break_secs = self.break_secs,
            "peer config applied"
        );
    }
}
