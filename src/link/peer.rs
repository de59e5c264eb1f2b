use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::protocol::{PeerConfig, PeerMessage, PeerRequest, ReplyTag, Task, TaskStatus};

/// How long a correlated request waits before resolving to "no answer".
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("a request is already in flight")]
    Busy,
    #[error("peer stream closed")]
    Closed,
    #[error("encode: {0}")]
    Encode(#[from] serde_json::Error),
}

struct PendingReply {
    tag: ReplyTag,
    tx: oneshot::Sender<PeerMessage>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Request/response correlation over one shared newline-delimited JSON
/// stream, the way the companion app speaks over its single characteristic.
///
/// One request may be outstanding at a time; its reply is matched by the
/// `response_type` tag. Pushes (`SYNC_ALL`, `UPDATE_TASK`) flow out the
/// event channel. A reply that never comes resolves to "no answer" after
/// the timeout instead of wedging the caller.
#[derive(Clone)]
pub struct PeerLink {
    out_tx: mpsc::Sender<String>,
    pending: Arc<Mutex<Option<PendingReply>>>,
    reply_timeout: Duration,
}

impl PeerLink {
    pub fn spawn<S>(stream: S) -> (Self, mpsc::Receiver<PeerMessage>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        Self::spawn_with_timeout(stream, REPLY_TIMEOUT)
    }

    /// Split the stream into a writer task and a reader task. Returns the
    /// link handle plus the push-event channel.
    pub fn spawn_with_timeout<S>(
        stream: S,
        reply_timeout: Duration,
    ) -> (Self, mpsc::Receiver<PeerMessage>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, mut write_half) = tokio::io::split(stream);
        let (out_tx, mut out_rx) = mpsc::channel::<String>(16);
        let (event_tx, event_rx) = mpsc::channel::<PeerMessage>(32);
        let pending: Arc<Mutex<Option<PendingReply>>> = Arc::new(Mutex::new(None));

        // Writer: all outbound lines funnel through one task so messages
        // never interleave on the stream.
        tokio::spawn(async move {
            while let Some(line) = out_rx.recv().await {
                let framed = format!("{line}\n");
                if let Err(e) = write_half.write_all(framed.as_bytes()).await {
                    warn!("peer write failed: {e}");
                    break;
                }
            }
        });

        // Reader: one line, one JSON message. A malformed line is discarded
        // and never echoed back.
        let pending_reader = Arc::clone(&pending);
        tokio::spawn(async move {
            let mut lines = BufReader::new(read_half).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        let message: PeerMessage = match serde_json::from_str(line) {
                            Ok(message) => message,
                            Err(e) => {
                                warn!("discarding malformed peer line: {e}");
                                continue;
                            }
                        };

                        match message.reply_tag() {
                            Some(tag) => {
                                let waiter = {
                                    let mut guard = lock(&pending_reader);
                                    match guard.take() {
                                        Some(p) if p.tag == tag => Some(p),
                                        other => {
                                            *guard = other;
                                            None
                                        }
                                    }
                                };
                                match waiter {
                                    Some(p) => {
                                        let _ = p.tx.send(message);
                                    }
                                    // Late reply after a timeout, or one we
                                    // never asked for. Drop it.
                                    None => debug!(?tag, "unsolicited reply dropped"),
                                }
                            }
                            None => {
                                if event_tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Ok(None) => {
                        info!("peer stream closed");
                        break;
                    }
                    Err(e) => {
                        warn!("peer read failed: {e}");
                        break;
                    }
                }
            }
            // Wake any waiter so it times out as "no answer" promptly.
            lock(&pending_reader).take();
        });

        (
            Self {
                out_tx,
                pending,
                reply_timeout,
            },
            event_rx,
        )
    }

    /// Send one request and wait for its tagged reply. `Ok(None)` means the
    /// peer did not answer inside the timeout.
    pub async fn request(&self, request: &PeerRequest) -> Result<Option<PeerMessage>, LinkError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut guard = lock(&self.pending);
            if guard.is_some() {
                return Err(LinkError::Busy);
            }
            *guard = Some(PendingReply {
                tag: request.reply_tag(),
                tx,
            });
        }

        let line = serde_json::to_string(request)?;
        if self.out_tx.send(line).await.is_err() {
            lock(&self.pending).take();
            return Err(LinkError::Closed);
        }

        match timeout(self.reply_timeout, rx).await {
            Ok(Ok(message)) => Ok(Some(message)),
            Ok(Err(_)) => {
                lock(&self.pending).take();
                Ok(None)
            }
            Err(_) => {
                lock(&self.pending).take();
                debug!("peer reply timed out");
                Ok(None)
            }
        }
    }

    pub async fn fetch_config(&self) -> Option<PeerConfig> {
        match self.request(&PeerRequest::GetConfig).await {
            Ok(Some(PeerMessage::Config(config))) => Some(config),
            Ok(_) => None,
            Err(e) => {
                warn!("config fetch failed: {e}");
                None
            }
        }
    }

    pub async fn fetch_recent_todo(&self) -> Option<Task> {
        match self.request(&PeerRequest::GetRecentTodo).await {
            Ok(Some(PeerMessage::RecentTodo { task })) => task,
            Ok(_) => None,
            Err(e) => {
                warn!("recent-todo fetch failed: {e}");
                None
            }
        }
    }

    /// True when the app acknowledged the status write.
    pub async fn update_task(&self, task_id: &str, status: TaskStatus) -> bool {
        let request = PeerRequest::UpdateTask {
            task_id: task_id.to_string(),
            status,
        };
        match self.request(&request).await {
            Ok(Some(PeerMessage::TaskUpdated { .. })) => true,
            Ok(_) => false,
            Err(e) => {
                warn!("task update failed: {e}");
                false
            }
        }
    }
}
