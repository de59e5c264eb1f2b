use serde::Deserialize;

/// Gesture labels the state machine reacts to directly.
pub const START_POMODORO: &str = "start_pomodoro";
pub const STOP_POMODORO: &str = "stop_pomodoro";

/// One reply from the person-detection + activity-classification backend.
/// `found` reports whether anyone was in frame at all; `label` and
/// `confidence` describe the activity of the largest detected person.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectionSample {
    pub found: bool,
    pub label: String,
    pub confidence: f32,
}

impl DetectionSample {
    pub fn of(label: &str, confidence: f32) -> Self {
        Self {
            found: true,
            label: label.to_string(),
            confidence,
        }
    }

    /// The backend's "nobody in frame" reply.
    pub fn nobody() -> Self {
        Self {
            found: false,
            label: "Unknown".to_string(),
            confidence: 0.0,
        }
    }
}
