use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::kernel::effect::TaskAction;

use super::peer::PeerLink;
use super::protocol::{PeerMessage, Task, TaskStatus};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read-only mirror of the companion app's task list, in the order the app
/// sends it (top task first). The robot never owns task storage; it only
/// reflects pushes.
#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    pub fn apply(&mut self, message: &PeerMessage) {
        match message {
            PeerMessage::SyncAll { tasks } => {
                info!(count = tasks.len(), "task list synced");
                self.tasks = tasks.clone();
            }
            PeerMessage::TaskDelta { task } => {
                match self.tasks.iter_mut().find(|t| t.task_id == task.task_id) {
                    Some(existing) => *existing = task.clone(),
                    None => self.tasks.push(task.clone()),
                }
            }
            _ => {}
        }
    }

    /// The topmost task still waiting to be worked on.
    pub fn most_recent_todo(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.status == TaskStatus::Todo)
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.task_id == task_id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Realizes the kernel's task intents against the peer, off the loop
/// thread. Keeps the pushed task mirror and remembers which task the
/// running session claimed, so the closing status write targets the right
/// one.
#[derive(Clone)]
pub struct TaskFlow {
    link: PeerLink,
    board: Arc<Mutex<TaskBoard>>,
    active: Arc<Mutex<Option<String>>>,
}

impl TaskFlow {
    pub fn new(link: PeerLink) -> Self {
        Self {
            link,
            board: Arc::new(Mutex::new(TaskBoard::default())),
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Fold a push event into the mirror.
    pub fn apply(&self, message: &PeerMessage) {
        lock(&self.board).apply(message);
    }

    /// Fire-and-forget: the control loop never waits on the peer.
    pub fn dispatch(&self, action: TaskAction) {
        let flow = self.clone();
        tokio::spawn(async move {
            match action {
                TaskAction::ClaimRecent => flow.claim_recent().await,
                TaskAction::Reopen => flow.close_with(TaskStatus::Todo).await,
                TaskAction::Finish => flow.close_with(TaskStatus::Finished).await,
            }
        });
    }

    pub fn active_task(&self) -> Option<String> {
        lock(&self.active).clone()
    }

    async fn claim_recent(&self) {
        // The mirror answers first; the peer is only asked when nothing has
        // been pushed yet.
        let mirrored = lock(&self.board).most_recent_todo().cloned();
        let task = match mirrored {
            Some(task) => Some(task),
            None => self.link.fetch_recent_todo().await,
        };
        let Some(task) = task else {
            debug!("no TODO task to claim");
            return;
        };

        info!(task = %task.task_id, name = %task.name, "claiming task for this session");
        if self.link.update_task(&task.task_id, TaskStatus::Ongoing).await {
            *lock(&self.active) = Some(task.task_id);
        } else {
            warn!(task = %task.task_id, "claim not acknowledged");
        }
    }

    async fn close_with(&self, status: TaskStatus) {
        let Some(task_id) = lock(&self.active).take() else {
            debug!("no claimed task to update");
            return;
        };
        if !self.link.update_task(&task_id, status).await {
            warn!(task = %task_id, ?status, "task status write not acknowledged");
        }
    }
}
