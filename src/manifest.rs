use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use crate::error_codes::CodedError;
use crate::frame::RenderParams;
use crate::schema::Manifest;

/// Manifest with paths resolved against its directory and params checked.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub manifest: Manifest,
    pub params: RenderParams,
}

impl LoadedManifest {
    pub fn source_path(&self) -> &Path {
        &self.manifest.source
    }

    pub fn output_dir(&self) -> &Path {
        &self.manifest.output.directory
    }

    pub fn total_frames(&self) -> u32 {
        self.manifest.animation.total_frames()
    }
}

pub fn load_and_validate_manifest(path: &Path) -> Result<LoadedManifest> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    let mut manifest: Manifest = serde_yaml::from_str(&contents).map_err(|error| {
        let location = error
            .location()
            .map(|location| format!("line {}, column {}", location.line(), location.column()))
            .unwrap_or_else(|| "unknown location".to_owned());
        let coded = CodedError::new(
            "MANIFEST_PARSE_ERROR",
            format!(
                "failed to parse yaml in {} at {}: {}",
                path.display(),
                location,
                error
            ),
        );
        match error.location() {
            Some(location) => anyhow!(coded.with_details(json!({
                "line": location.line(),
                "column": location.column(),
            }))),
            None => anyhow!(coded),
        }
    })?;

    let params = validate_manifest(&mut manifest, path)?;
    Ok(LoadedManifest { manifest, params })
}

fn validate_manifest(manifest: &mut Manifest, manifest_path: &Path) -> Result<RenderParams> {
    manifest.animation.validate()?;
    manifest.output.validate()?;
    let params = manifest
        .shake
        .to_render_params()
        .context("invalid shake parameters")?;

    let manifest_dir = manifest_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    manifest.source = resolve_and_validate_source(&manifest_dir, &manifest.source)?;
    manifest.output.directory = resolve_relative(&manifest_dir, &manifest.output.directory);
    manifest.output.prefix = manifest.output.prefix.trim().to_owned();

    Ok(params)
}

fn resolve_relative(manifest_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        manifest_dir.join(path)
    }
}

fn resolve_and_validate_source(manifest_dir: &Path, source_path: &Path) -> Result<PathBuf> {
    let resolved = resolve_relative(manifest_dir, source_path);

    if !resolved.exists() {
        return Err(source_error(&resolved, "source image does not exist"));
    }

    if !resolved.is_file() {
        return Err(source_error(&resolved, "source image is not a file"));
    }

    Ok(resolved)
}

fn source_error(path: &Path, reason: &str) -> anyhow::Error {
    anyhow!(CodedError::new(
        "SOURCE_NOT_FOUND",
        format!("{reason}: {}", path.display()),
    )
    .with_details(json!({ "path": path.display().to_string() })))
}
