//! Bench harness: steps the control kernel through a scripted classifier
//! feed, one simulated second per iteration, so the whole loop can be
//! watched without camera, servo, or companion app attached.
//!
//!     RUST_LOG=info cargo run --bin dry_run

use pomobot::config::RobotConfig;
use pomobot::kernel::reactor::Reactor;
use pomobot::vision::types::{DetectionSample, START_POMODORO, STOP_POMODORO};
use tracing_subscriber::EnvFilter;

fn scripted_sample(second: u32) -> Option<DetectionSample> {
    match second {
        // Start gesture.
        2 => Some(DetectionSample::of(START_POMODORO, 0.93)),
        // Head-down work.
        5..=9 => Some(DetectionSample::of("using_laptop", 0.90)),
        // Wandering attention; should draw exactly one reminder per latch.
        10..=15 => Some(DetectionSample::of("standing", 0.88)),
        // Ask to stop, then confirm once the answer window opens.
        20 => Some(DetectionSample::of(STOP_POMODORO, 0.95)),
        24 => Some(DetectionSample::of(STOP_POMODORO, 0.95)),
        _ => None,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = RobotConfig::default();
    config.work_secs = 60;
    config.break_secs = 10;

    let mut reactor = Reactor::new(config);

    for second in 0..40 {
        let sample = scripted_sample(second);
        for effect in reactor.tick_step(1, sample) {
            println!("[{second:>3}s] {:?} -> {effect:?}", reactor.state.phase);
        }
    }
    println!("final phase: {:?}", reactor.state.phase);
}
