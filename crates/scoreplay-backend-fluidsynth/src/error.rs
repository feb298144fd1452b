//! Error types for the render backend.

use std::path::PathBuf;
use std::time::Duration;

use scoreplay_spec::BackendError;
use thiserror::Error;

use crate::pipeline::RenderStage;
use crate::tools::Tool;

/// Result type for render backend operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The request does not expose the MIDI-export capability.
    #[error("'{name}' cannot be rendered as MIDI")]
    NotRenderable { name: String },

    /// No sound font has been configured.
    #[error("Soundfont is not specified; configure a sound font and MIDI bank before rendering")]
    NotConfigured,

    /// An external tool could not be located.
    #[error("{tool} executable not found. Ensure it is installed and in PATH, or set {env_var}")]
    ToolNotFound { tool: Tool, env_var: &'static str },

    /// Failed to spawn an external tool.
    #[error("Failed to spawn {tool}: {source}")]
    SpawnFailed {
        tool: Tool,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran past the configured timeout.
    #[error("{tool} timed out after {timeout:?}")]
    Timeout { tool: Tool, timeout: Duration },

    /// Writing the request as MIDI failed.
    #[error("Failed to export MIDI: {0}")]
    MidiExportFailed(#[source] std::io::Error),

    /// The synthesizer exited with non-zero status.
    #[error("fluidsynth failed to render MIDI as OGG, result: {exit_code}: {stderr}")]
    SynthesisFailed { exit_code: i32, stderr: String },

    /// The transcoder exited with non-zero status.
    #[error("ffmpeg failed to render OGG as MP3, result: {exit_code}: {stderr}")]
    TranscodeFailed { exit_code: i32, stderr: String },

    /// A tool reported success but its output file is missing.
    #[error("Expected output file not found: {path}")]
    OutputNotFound { path: PathBuf },

    /// The display sink rejected the rendered element.
    #[error("Failed to display audio: {0}")]
    Display(#[source] std::io::Error),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Returns true for failures caused by a malformed request rather than
    /// by configuration or the environment.
    pub fn is_hard(&self) -> bool {
        matches!(self, RenderError::NotRenderable { .. })
    }

    /// Exit status reported by a failing external tool, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RenderError::SynthesisFailed { exit_code, .. }
            | RenderError::TranscodeFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

impl BackendError for RenderError {
    fn code(&self) -> &'static str {
        match self {
            RenderError::NotRenderable { .. } => "RENDER_001",
            RenderError::NotConfigured => "RENDER_002",
            RenderError::ToolNotFound { .. } => "RENDER_003",
            RenderError::SpawnFailed { .. } => "RENDER_004",
            RenderError::Timeout { .. } => "RENDER_005",
            RenderError::MidiExportFailed(_) => "RENDER_006",
            RenderError::SynthesisFailed { .. } => "RENDER_007",
            RenderError::TranscodeFailed { .. } => "RENDER_008",
            RenderError::OutputNotFound { .. } => "RENDER_009",
            RenderError::Display(_) => "RENDER_010",
            RenderError::Io(_) => "RENDER_011",
        }
    }

    fn category(&self) -> &'static str {
        "render"
    }
}

/// A render error together with the last stage the pipeline completed.
#[derive(Debug, Error)]
#[error("{error} (stopped after {stage})")]
pub struct RenderFailure {
    /// Last stage reached before the failure.
    pub stage: RenderStage,
    /// Stages passed through, ending in [`RenderStage::Failed`].
    pub stages: Vec<RenderStage>,
    /// What went wrong.
    #[source]
    pub error: RenderError,
}

impl RenderFailure {
    /// Wraps `error` as having happened after `stage`.
    pub fn new(stage: RenderStage, error: RenderError) -> Self {
        Self {
            stage,
            stages: vec![stage, RenderStage::Failed],
            error,
        }
    }

    /// Replaces the stage trail. A trail not ending in `Failed` gets it
    /// appended.
    pub fn with_stages(mut self, mut stages: Vec<RenderStage>) -> Self {
        if stages.last() != Some(&RenderStage::Failed) {
            stages.push(RenderStage::Failed);
        }
        self.stages = stages;
        self
    }

    /// See [`RenderError::is_hard`].
    pub fn is_hard(&self) -> bool {
        self.error.is_hard()
    }
}

impl BackendError for RenderFailure {
    fn code(&self) -> &'static str {
        self.error.code()
    }

    fn message(&self) -> String {
        self.error.to_string()
    }

    fn category(&self) -> &'static str {
        self.error.category()
    }
}
