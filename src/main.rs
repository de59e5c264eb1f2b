use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use pomobot::config::RobotConfig;
use pomobot::kernel::effect::SideEffect;
use pomobot::kernel::reactor::{Reactor, TICK_MS};
use pomobot::link::peer::PeerLink;
use pomobot::link::tasks::TaskFlow;
use pomobot::outputs::audio::{AudioCue, AudioSink, CuePlayer};
use pomobot::outputs::display::{Display, Expression, FaceLibrary, LogPanel};
use pomobot::outputs::servo::{LogServo, ServoCommand, ServoSink};
use pomobot::vision::camera::Camera;
use pomobot::vision::client::ClassifierClient;
use pomobot::vision::handoff::{FrameSlot, LatestCell};
use pomobot::vision::worker;

const PEER_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const BOOT_SCENE_SECS: f32 = 3.5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    tracing::info!("pomobot booting");

    let mut config = RobotConfig::from_env();

    // Peripherals first. A robot that cannot show its face may not limp
    // into the loop; missing assets abort the boot here.
    let library = FaceLibrary::load(&config.faces_dir).context("face preload")?;
    let mut display = Display::new(library, LogPanel);
    let mut servo = LogServo;
    let mut audio = CuePlayer::new(&config.audio_dir);

    // Boot scene.
    servo.drive(ServoCommand::Taunt);
    display.show(Expression::Idle);
    audio.play(AudioCue::Greeting);
    tokio::time::sleep(Duration::from_secs_f32(BOOT_SCENE_SECS)).await;

    // Companion app link. Losing it is a degradation, not a fatality: the
    // timer runs on defaults and task sync stays off.
    display.show(Expression::Loading);
    let (link, mut peer_events) = match tokio::time::timeout(
        PEER_CONNECT_TIMEOUT,
        TcpStream::connect(config.peer_addr.as_str()),
    )
    .await
    {
        Ok(Ok(stream)) => {
            tracing::info!(addr = %config.peer_addr, "peer connected");
            let (link, events) = PeerLink::spawn(stream);
            (Some(link), Some(events))
        }
        Ok(Err(e)) => {
            tracing::warn!("peer connect failed: {e}");
            (None, None)
        }
        Err(_) => {
            tracing::warn!("peer connect timed out");
            (None, None)
        }
    };

    if let Some(link) = &link {
        match link.fetch_config().await {
            Some(peer_config) => config.apply_peer(&peer_config),
            None => tracing::warn!("no config from peer, using defaults"),
        }
        display.show(Expression::Connected);
        audio.play(AudioCue::Connected);
    }

    let cancel = CancellationToken::new();

    // Perception pipeline: the camera probe is fatal, the worker is not.
    // A stalled worker degrades the loop to its last smoothed status.
    let camera = Camera::start(&config.camera_url, cancel.child_token())
        .await
        .context("camera start")?;
    let slot = FrameSlot::new();
    let latest = LatestCell::new();
    let classifier = ClassifierClient::new(config.classifier_url.clone());
    worker::spawn(
        slot.clone(),
        latest.clone(),
        classifier,
        cancel.child_token(),
    );

    let flow = link.map(TaskFlow::new);

    display.show(Expression::Idle);
    let mut reactor = Reactor::new(config.clone());

    let mut cadence = tokio::time::interval(Duration::from_millis(TICK_MS));
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let frame_stride = config.frame_stride.max(1);
    let mut frame_counter: u32 = 0;

    tracing::info!("pomobot active");
    loop {
        tokio::select! {
            _ = cadence.tick() => {
                // Frame pump: newest frame only, every Nth, dropped outright
                // if the worker is still chewing on the previous one.
                if let Some(frame) = camera.poll_frame() {
                    frame_counter = frame_counter.wrapping_add(1);
                    if frame_counter % frame_stride == 0 && !slot.offer(frame) {
                        tracing::trace!("frame dropped, worker busy");
                    }
                }

                if let (Some(flow), Some(events)) = (&flow, peer_events.as_mut()) {
                    while let Ok(message) = events.try_recv() {
                        flow.apply(&message);
                    }
                }

                let sample = latest.take();
                for effect in reactor.step_now(sample) {
                    match effect {
                        SideEffect::Face(expression) => display.show(expression),
                        SideEffect::Servo(command) => servo.drive(command),
                        SideEffect::Cue(cue) => audio.play(cue),
                        SideEffect::Task(action) => match &flow {
                            Some(flow) => flow.dispatch(action),
                            None => tracing::debug!(?action, "no peer link, task action dropped"),
                        },
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    // Workers are detached on purpose: an in-flight inference call must not
    // hold up process exit.
    cancel.cancel();
    Ok(())
}
