//! Animation driver: one render per frame, seed advanced by the frame index.

use image::{DynamicImage, RgbaImage};
use rayon::prelude::*;
use tracing::debug;

use crate::error::ShakeError;
use crate::frame::{render_frame, RenderParams};

/// Render `frame_count` frames in parallel, returned in frame order.
///
/// Frame `i` uses `params.seed + i` (wrapping). The source is only read, so
/// frames share it without synchronization.
pub fn render_sequence(
    source: &DynamicImage,
    params: &RenderParams,
    frame_count: u32,
) -> Result<Vec<RgbaImage>, ShakeError> {
    let mut frames = Vec::new();
    stream_sequence(source, params, frame_count, |_, frame| {
        frames.push(frame);
        Ok::<_, ShakeError>(())
    })?;
    Ok(frames)
}

/// Render frames in parallel batches and hand each one to `sink` in frame order.
///
/// A batch holds one frame per rayon worker, so at most one batch of frames is
/// alive at a time and the sink can encode while the next batch renders.
pub fn stream_sequence<F, E>(
    source: &DynamicImage,
    params: &RenderParams,
    frame_count: u32,
    mut sink: F,
) -> Result<(), E>
where
    F: FnMut(u32, RgbaImage) -> Result<(), E>,
    E: From<ShakeError>,
{
    if frame_count == 0 {
        return Err(ShakeError::invalid_parameter("frame_count", "must be >= 1").into());
    }
    params.validate()?;

    let batch = u32::try_from(rayon::current_num_threads())
        .unwrap_or(u32::MAX)
        .max(1);
    let mut start = 0_u32;
    while start < frame_count {
        let end = start.saturating_add(batch).min(frame_count);
        let frames = (start..end)
            .into_par_iter()
            .map(|frame_index| {
                let frame_params = params.for_frame(frame_index);
                debug!(frame_index, seed = frame_params.seed, "rendering frame");
                render_frame(source, &frame_params)
            })
            .collect::<Result<Vec<_>, ShakeError>>()?;
        for (frame_index, frame) in (start..end).zip(frames) {
            sink(frame_index, frame)?;
        }
        start = end;
    }
    Ok(())
}

/// File name for frame `index`: `<prefix>_<NNNN>.png`.
pub fn frame_file_name(prefix: &str, index: u32) -> String {
    format!("{}_{:04}.png", prefix, index)
}
