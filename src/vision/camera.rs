use std::time::Duration;

use anyhow::Context;
use image::RgbImage;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::handoff::LatestCell;

const FETCH_INTERVAL: Duration = Duration::from_millis(200);
const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Polls the camera board's HTTP still endpoint and keeps only the most
/// recent decoded frame. The control loop reads frames without blocking;
/// a fetch failure just means the previous frame stays current.
pub struct Camera {
    latest: LatestCell<RgbImage>,
}

impl Camera {
    /// Probe the endpoint once, then keep a background fetch loop running.
    /// A failed probe is fatal: a robot that cannot see must not start.
    pub async fn start(url: &str, cancel: CancellationToken) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_default();

        let first = fetch_frame(&client, url)
            .await
            .with_context(|| format!("cannot open camera at {url}"))?;
        info!(width = first.width(), height = first.height(), "camera up");

        let latest = LatestCell::new();
        latest.publish(first);

        let cell = latest.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            let mut cadence = tokio::time::interval(FETCH_INTERVAL);
            cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cadence.tick() => {
                        match fetch_frame(&client, &url).await {
                            Ok(frame) => cell.publish(frame),
                            Err(e) => warn!("camera fetch failed: {e:#}"),
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        });

        Ok(Self { latest })
    }

    /// Latest frame, if a new one arrived since the last poll.
    pub fn poll_frame(&self) -> Option<RgbImage> {
        self.latest.take()
    }
}

async fn fetch_frame(client: &reqwest::Client, url: &str) -> anyhow::Result<RgbImage> {
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let image = image::load_from_memory(&bytes).context("frame decode")?;
    Ok(image.to_rgb8())
}
