use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::error::ShakeError;
use crate::frame::RenderParams;
use crate::resample::RenderMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub source: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub animation: Animation,
    #[serde(default)]
    pub shake: ShakeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            prefix: default_prefix(),
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            bail!("output prefix cannot be empty");
        }
        if prefix.contains(['/', '\\']) {
            bail!("output prefix '{}' must not contain path separators", prefix);
        }
        Ok(())
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("frames")
}

fn default_prefix() -> String {
    "frame".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Animation {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub duration: Duration,
}

impl Default for Animation {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            duration: Duration::default(),
        }
    }
}

fn default_fps() -> u32 {
    12
}

impl Animation {
    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            bail!("fps must be > 0");
        }

        match self.duration {
            Duration::Seconds(seconds) => {
                if !seconds.is_finite() || seconds <= 0.0 {
                    bail!("duration in seconds must be finite and > 0");
                }
                if f64::from(seconds) * f64::from(self.fps) > f64::from(u32::MAX) {
                    bail!("duration of {seconds}s at {} fps has too many frames", self.fps);
                }
            }
            Duration::Frames { frames } => {
                if frames == 0 {
                    bail!("duration frames must be > 0");
                }
            }
        }

        Ok(())
    }

    pub fn total_frames(&self) -> u32 {
        match self.duration {
            Duration::Seconds(seconds) => {
                let frames = (seconds * self.fps as f32).ceil();
                frames.max(1.0) as u32
            }
            Duration::Frames { frames } => frames.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum Duration {
    Seconds(f32),
    Frames { frames: u32 },
}

impl Default for Duration {
    fn default() -> Self {
        Self::Seconds(1.0)
    }
}

/// Shake parameters as written in the manifest.
///
/// `threshold` is read wide so out-of-range values surface as a parameter
/// error instead of a YAML type error.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShakeConfig {
    #[serde(default = "default_strength")]
    pub strength: f32,
    #[serde(default = "default_cell_count")]
    pub cell_count: u32,
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_antialias")]
    pub antialias: bool,
    #[serde(default)]
    pub mode: RenderMode,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            strength: default_strength(),
            cell_count: default_cell_count(),
            threshold: default_threshold(),
            seed: 0,
            antialias: default_antialias(),
            mode: RenderMode::default(),
        }
    }
}

fn default_strength() -> f32 {
    RenderParams::default().strength
}

fn default_cell_count() -> u32 {
    RenderParams::default().cell_count
}

fn default_threshold() -> i64 {
    i64::from(RenderParams::default().threshold)
}

fn default_antialias() -> bool {
    true
}

impl ShakeConfig {
    pub fn to_render_params(&self) -> Result<RenderParams, ShakeError> {
        let threshold = u8::try_from(self.threshold).map_err(|_| {
            ShakeError::invalid_parameter(
                "threshold",
                format!("must be within 0..=255, got {}", self.threshold),
            )
        })?;
        let params = RenderParams {
            strength: self.strength,
            cell_count: self.cell_count,
            threshold,
            seed: self.seed,
            antialias: self.antialias,
            mode: self.mode,
        };
        params.validate()?;
        Ok(params)
    }
}
