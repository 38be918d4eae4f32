//! Frame output: numbered PNG sequences and content digests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, bail, Context, Result};
use image::{ImageFormat, RgbaImage};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::sequence::frame_file_name;

type IndexedFrame = (u32, RgbaImage);

/// Writes frames to `<dir>/<prefix>_<NNNN>.png` on a background thread.
///
/// Frames are queued through a bounded channel, so PNG compression of one
/// batch overlaps rendering of the next.
pub struct PngSequenceWriter {
    sender: Option<mpsc::SyncSender<IndexedFrame>>,
    worker: Option<JoinHandle<Result<Vec<PathBuf>>>>,
}

impl PngSequenceWriter {
    pub fn spawn(directory: &Path, prefix: &str) -> Result<Self> {
        validate_output_path(directory)?;
        fs::create_dir_all(directory)
            .with_context(|| format!("failed to create output dir {}", directory.display()))?;

        let (sender, receiver) = mpsc::sync_channel::<IndexedFrame>(4);
        let directory = directory.to_path_buf();
        let prefix = prefix.to_owned();

        let worker = thread::Builder::new()
            .name("inkshake-png-writer".to_owned())
            .spawn(move || write_frames(&directory, &prefix, receiver))
            .context("failed to spawn png writer thread")?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn write_frame(&self, index: u32, frame: RgbaImage) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| anyhow!("writer has already been finalized"))?;
        sender
            .send((index, frame))
            .map_err(|_| anyhow!("failed to enqueue frame {index} for writing"))
    }

    /// Flush queued frames and return the written paths in write order.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        drop(self.sender.take());

        let handle = self
            .worker
            .take()
            .ok_or_else(|| anyhow!("png writer thread missing"))?;
        match handle.join() {
            Ok(result) => result,
            Err(_) => Err(anyhow!("png writer thread panicked")),
        }
    }
}

fn write_frames(
    directory: &Path,
    prefix: &str,
    receiver: mpsc::Receiver<IndexedFrame>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    while let Ok((index, frame)) = receiver.recv() {
        let path = directory.join(frame_file_name(prefix, index));
        frame
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("failed to write frame {}", path.display()))?;
        trace!(index, path = %path.display(), "wrote frame");
        written.push(path);
    }
    debug!(count = written.len(), "png writer drained");
    Ok(written)
}

fn validate_output_path(directory: &Path) -> Result<()> {
    let path_str = directory.to_string_lossy();
    if path_str.len() > 1024 {
        bail!("output path is suspiciously long");
    }
    if path_str.chars().any(|c| c.is_control()) {
        bail!("output path contains invalid control characters");
    }
    Ok(())
}

/// Lowercase hex SHA-256 of a frame's width, height and RGBA bytes.
pub fn frame_digest(frame: &RgbaImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(frame.width().to_le_bytes());
    hasher.update(frame.height().to_le_bytes());
    hasher.update(frame.as_raw());
    format!("{:x}", hasher.finalize())
}
