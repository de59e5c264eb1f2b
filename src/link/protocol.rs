use serde::{Deserialize, Serialize};

/// Task lifecycle states as the companion app spells them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Todo,
    Ongoing,
    Finished,
}

/// A task as owned by the companion app. The robot only ever reflects these
/// and writes status changes back; it has no task storage of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub name: String,
    pub status: TaskStatus,
}

/// Requests the robot sends to the app. One outstanding at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action")]
pub enum PeerRequest {
    #[serde(rename = "GET_CONFIG")]
    GetConfig,
    #[serde(rename = "GET_RECENT_TODO")]
    GetRecentTodo,
    #[serde(rename = "UPDATE_TASK")]
    UpdateTask { task_id: String, status: TaskStatus },
}

/// Timer durations handed down by the app, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub work_time: u32,
    pub break_time: u32,
}

/// Everything that can arrive on the stream: replies correlated by their
/// `response_type` tag, plus unsolicited pushes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "response_type")]
pub enum PeerMessage {
    #[serde(rename = "CONFIG")]
    Config(PeerConfig),
    #[serde(rename = "RECENT_TODO")]
    RecentTodo { task: Option<Task> },
    #[serde(rename = "TASK_UPDATED")]
    TaskUpdated { task_id: String, status: TaskStatus },
    /// Bulk task list push, e.g. right after the app reconnects.
    #[serde(rename = "SYNC_ALL")]
    SyncAll { tasks: Vec<Task> },
    /// Single-task delta push.
    #[serde(rename = "UPDATE_TASK")]
    TaskDelta { task: Task },
}

/// Which reply tag a request expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTag {
    Config,
    RecentTodo,
    TaskUpdated,
}

impl PeerRequest {
    pub fn reply_tag(&self) -> ReplyTag {
        match self {
            PeerRequest::GetConfig => ReplyTag::Config,
            PeerRequest::GetRecentTodo => ReplyTag::RecentTodo,
            PeerRequest::UpdateTask { .. } => ReplyTag::TaskUpdated,
        }
    }
}

impl PeerMessage {
    /// `Some` for correlated replies, `None` for pushes.
    pub fn reply_tag(&self) -> Option<ReplyTag> {
        match self {
            PeerMessage::Config(_) => Some(ReplyTag::Config),
            PeerMessage::RecentTodo { .. } => Some(ReplyTag::RecentTodo),
            PeerMessage::TaskUpdated { .. } => Some(ReplyTag::TaskUpdated),
            PeerMessage::SyncAll { .. } | PeerMessage::TaskDelta { .. } => None,
        }
    }
}
