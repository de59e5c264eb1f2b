use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::ClassifierClient;
use super::handoff::{FrameSlot, LatestCell};
use super::types::DetectionSample;

const JPEG_QUALITY: u8 = 85;
const IDLE_POLL: Duration = Duration::from_millis(50);

/// The inference side of the perception pipeline. Takes whatever frame is
/// waiting in the slot, encodes it off-thread, runs the (slow, network
/// bound) classification call and publishes the result for the loop.
///
/// Every failure path logs and continues: a dropped sample degrades the
/// loop to its last smoothed status, it never halts it.
pub fn spawn(
    slot: FrameSlot<RgbImage>,
    latest: LatestCell<DetectionSample>,
    client: ClassifierClient,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("inference worker up");
        loop {
            if cancel.is_cancelled() {
                break;
            }

            let frame = match slot.take() {
                Some(frame) => frame,
                None => {
                    tokio::select! {
                        _ = tokio::time::sleep(IDLE_POLL) => {}
                        _ = cancel.cancelled() => break,
                    }
                    continue;
                }
            };

            let jpeg = match tokio::task::spawn_blocking(move || encode_jpeg(&frame)).await {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => {
                    warn!("frame encode failed: {e}");
                    continue;
                }
                Err(e) => {
                    warn!("encode worker join failed: {e}");
                    continue;
                }
            };

            match client.classify(jpeg).await {
                Ok(sample) => {
                    debug!(
                        found = sample.found,
                        label = %sample.label,
                        confidence = sample.confidence,
                        "sample"
                    );
                    latest.publish(sample);
                }
                Err(e) => warn!("inference call failed: {e}"),
            }
        }
        info!("inference worker down");
    })
}

fn encode_jpeg(frame: &RgbImage) -> image::ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgb8,
    )?;
    Ok(out)
}
