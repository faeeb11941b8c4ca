use std::path::PathBuf;

use crate::foundation::error::CtaResult;
use crate::scene::config::{ExportFormat, ResolutionTier};

/// What the pipeline asks the host for before rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    /// File name the host may offer as default.
    pub suggested_name: String,
    /// Container that will be written.
    pub format: ExportFormat,
}

impl SaveRequest {
    /// Request for `format` at `resolution`, named after the current wall-clock time.
    pub fn new(format: ExportFormat, resolution: ResolutionTier) -> Self {
        let unix_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            suggested_name: suggested_file_name(resolution, format, unix_ms),
            format,
        }
    }
}

/// `cta-<tier>-<unix_ms>.<ext>`
pub fn suggested_file_name(resolution: ResolutionTier, format: ExportFormat, unix_ms: u128) -> String {
    format!("cta-{}-{unix_ms}.{}", resolution.label(), format.extension())
}

/// Host answer to a [`SaveRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveChoice {
    /// Write the export here.
    Path(PathBuf),
    /// The user dismissed the save interaction; nothing is rendered.
    Cancelled,
}

/// Host-side save interaction.
pub trait SaveDestination {
    /// Pick where the export goes, or cancel it.
    fn choose(&mut self, request: &SaveRequest) -> CtaResult<SaveChoice>;
}

impl<F> SaveDestination for F
where
    F: FnMut(&SaveRequest) -> CtaResult<SaveChoice>,
{
    fn choose(&mut self, request: &SaveRequest) -> CtaResult<SaveChoice> {
        self(request)
    }
}

/// Always writes to one path.
#[derive(Clone, Debug)]
pub struct FixedDestination {
    path: PathBuf,
}

impl FixedDestination {
    /// Destination at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SaveDestination for FixedDestination {
    fn choose(&mut self, _request: &SaveRequest) -> CtaResult<SaveChoice> {
        Ok(SaveChoice::Path(self.path.clone()))
    }
}

/// Writes the suggested file name into a directory.
#[derive(Clone, Debug)]
pub struct DirectoryDestination {
    dir: PathBuf,
}

impl DirectoryDestination {
    /// Destination directory `dir`; created by the sink when missing.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SaveDestination for DirectoryDestination {
    fn choose(&mut self, request: &SaveRequest) -> CtaResult<SaveChoice> {
        Ok(SaveChoice::Path(self.dir.join(&request.suggested_name)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/destination.rs"]
mod tests;
