use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use pomobot::kernel::effect::TaskAction;
use pomobot::link::peer::{LinkError, PeerLink};
use pomobot::link::protocol::{PeerConfig, PeerMessage, PeerRequest, Task, TaskStatus};
use pomobot::link::tasks::{TaskBoard, TaskFlow};

fn task(id: &str, name: &str, status: TaskStatus) -> Task {
    Task {
        task_id: id.to_string(),
        name: name.to_string(),
        status,
    }
}

/// Emulated companion app: answers requests by action verb.
fn spawn_responder(stream: tokio::io::DuplexStream) {
    tokio::spawn(async move {
        let (read, mut write) = tokio::io::split(stream);
        let mut lines = BufReader::new(read).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let request: serde_json::Value = serde_json::from_str(&line).unwrap();
            let reply = match request["action"].as_str() {
                Some("GET_CONFIG") => {
                    r#"{"response_type":"CONFIG","work_time":900,"break_time":120}"#.to_string()
                }
                Some("GET_RECENT_TODO") => {
                    r#"{"response_type":"RECENT_TODO","task":{"task_id":"t-1","name":"write report","status":"TODO"}}"#
                        .to_string()
                }
                Some("UPDATE_TASK") => format!(
                    r#"{{"response_type":"TASK_UPDATED","task_id":{},"status":{}}}"#,
                    request["task_id"], request["status"]
                ),
                _ => continue,
            };
            write.write_all(reply.as_bytes()).await.unwrap();
            write.write_all(b"\n").await.unwrap();
        }
    });
}

#[tokio::test]
async fn config_reply_resolves_the_request() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (link, _events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(500));
    spawn_responder(theirs);

    let config = link.fetch_config().await;
    assert_eq!(
        config,
        Some(PeerConfig {
            work_time: 900,
            break_time: 120
        })
    );
}

#[tokio::test]
async fn recent_todo_reply_carries_the_task() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (link, _events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(500));
    spawn_responder(theirs);

    let todo = link.fetch_recent_todo().await;
    assert_eq!(todo, Some(task("t-1", "write report", TaskStatus::Todo)));
}

#[tokio::test]
async fn task_update_is_acknowledged() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (link, _events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(500));
    spawn_responder(theirs);

    assert!(link.update_task("t-1", TaskStatus::Finished).await);
}

#[tokio::test]
async fn silent_peer_resolves_to_no_answer() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (link, _events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(200));

    let started = std::time::Instant::now();
    let config = link.fetch_config().await;

    assert_eq!(config, None, "no reply must resolve to no answer");
    assert!(
        started.elapsed() >= Duration::from_millis(200),
        "the timeout must actually be waited out"
    );
    drop(theirs);
}

#[tokio::test]
async fn second_request_while_one_is_in_flight_is_rejected() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (link, _events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(300));

    let first = {
        let link = link.clone();
        tokio::spawn(async move { link.request(&PeerRequest::GetConfig).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = link.request(&PeerRequest::GetConfig).await;
    assert!(matches!(second, Err(LinkError::Busy)));

    let _ = first.await;
    drop(theirs);
}

#[tokio::test]
async fn malformed_lines_are_skipped_and_pushes_still_arrive() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (_link, mut events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(500));

    let (_read, mut write) = tokio::io::split(theirs);
    write.write_all(b"this is not json\n").await.unwrap();
    write
        .write_all(
            concat!(
                r#"{"response_type":"SYNC_ALL","tasks":["#,
                r#"{"task_id":"t-1","name":"write report","status":"TODO"},"#,
                r#"{"task_id":"t-2","name":"review slides","status":"FINISHED"}"#,
                r#"]}"#,
                "\n"
            )
            .as_bytes(),
        )
        .await
        .unwrap();

    let pushed = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("push must arrive despite the garbage line")
        .expect("event channel must stay open");

    match pushed {
        PeerMessage::SyncAll { tasks } => assert_eq!(tasks.len(), 2),
        other => panic!("expected SYNC_ALL, got {other:?}"),
    }
}

#[test]
fn board_mirrors_sync_and_deltas() {
    let mut board = TaskBoard::default();

    board.apply(&PeerMessage::SyncAll {
        tasks: vec![
            task("t-1", "write report", TaskStatus::Finished),
            task("t-2", "review slides", TaskStatus::Todo),
            task("t-3", "file expenses", TaskStatus::Todo),
        ],
    });
    assert_eq!(board.len(), 3);
    assert_eq!(
        board.most_recent_todo().map(|t| t.task_id.as_str()),
        Some("t-2"),
        "the topmost TODO wins"
    );

    board.apply(&PeerMessage::TaskDelta {
        task: task("t-2", "review slides", TaskStatus::Ongoing),
    });
    assert_eq!(
        board.most_recent_todo().map(|t| t.task_id.as_str()),
        Some("t-3"),
        "a claimed task stops being the recent TODO"
    );

    board.apply(&PeerMessage::TaskDelta {
        task: task("t-4", "new arrival", TaskStatus::Todo),
    });
    assert_eq!(board.len(), 4, "unknown deltas append");
    assert_eq!(board.get("t-4").map(|t| t.status), Some(TaskStatus::Todo));
}

#[tokio::test]
async fn claim_prefers_the_mirror_then_closes_over_the_link() {
    let (ours, theirs) = tokio::io::duplex(1024);
    let (link, _events) = PeerLink::spawn_with_timeout(ours, Duration::from_millis(500));
    spawn_responder(theirs);

    let flow = TaskFlow::new(link);
    flow.apply(&PeerMessage::SyncAll {
        tasks: vec![task("t-7", "mirrored todo", TaskStatus::Todo)],
    });

    // Claim resolves from the mirror (no GET_RECENT_TODO round trip) but
    // still writes the ONGOING status through the peer.
    flow.dispatch(TaskAction::ClaimRecent);
    tokio::time::timeout(Duration::from_secs(1), async {
        while flow.active_task().is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("claim must settle");
    assert_eq!(flow.active_task().as_deref(), Some("t-7"));

    // Finishing clears the claim once the peer acknowledges.
    flow.dispatch(TaskAction::Finish);
    tokio::time::timeout(Duration::from_secs(1), async {
        while flow.active_task().is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("finish must settle");
}

#[test]
fn request_wire_format_matches_the_app() {
    let update = PeerRequest::UpdateTask {
        task_id: "t-9".to_string(),
        status: TaskStatus::Ongoing,
    };
    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(value["action"], "UPDATE_TASK");
    assert_eq!(value["task_id"], "t-9");
    assert_eq!(value["status"], "ONGOING");

    let get = serde_json::to_value(&PeerRequest::GetConfig).unwrap();
    assert_eq!(get["action"], "GET_CONFIG");
}
