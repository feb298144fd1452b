//! JSON output types for machine-readable CLI output.
//!
//! These types back the `--json` flag on `render` and `config`.

use serde::{Deserialize, Serialize};

use scoreplay_backend_fluidsynth::{RenderFailure, RenderedAudio};
use scoreplay_spec::{BackendError, ConfigDiagnostic, RenderConfiguration};

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
/// Backend errors pass through their own `RENDER_XXX` codes.
pub mod error_codes {
    /// Input file could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Settings file could not be read or written
    pub const SETTINGS: &str = "CLI_002";
    /// JSON serialization error
    pub const JSON_SERIALIZE: &str = "CLI_003";
    /// Output file could not be written
    pub const FILE_WRITE: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "RENDER_007")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Suggestion for fixing the error (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            suggestion: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Converts a render failure.
    pub fn from_render(failure: &RenderFailure) -> Self {
        Self::new(failure.code(), failure.message())
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "CFG_001")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
}

impl JsonWarning {
    /// Creates a new warning with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&ConfigDiagnostic> for JsonWarning {
    fn from(diagnostic: &ConfigDiagnostic) -> Self {
        Self::new(diagnostic.code(), diagnostic.to_string())
    }
}

/// Render result details.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderResult {
    /// MIME type of the displayed audio
    pub mime_type: String,
    /// Size of the final audio file in bytes
    pub bytes: usize,
    /// Number of external processes spawned
    pub invocations: usize,
    /// Final pipeline stage
    pub stage: String,
    /// Where the HTML was written (stdout when absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// The `<audio>` element, when not written to a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl RenderResult {
    /// Summarizes a successful render.
    pub fn from_audio(audio: &RenderedAudio) -> Self {
        Self {
            mime_type: audio.format().mime_type().to_string(),
            bytes: audio.byte_len,
            invocations: audio.invocations,
            stage: audio.stage().to_string(),
            output: None,
            html: None,
        }
    }
}

/// JSON output for the `render` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Whether the render succeeded
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Configuration diagnostics
    pub warnings: Vec<JsonWarning>,
    /// Result details (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<RenderResult>,
    /// Stage reached before a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_after: Option<String>,
}

impl RenderOutput {
    /// Creates a successful render output.
    pub fn success(result: RenderResult, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings,
            result: Some(result),
            failed_after: None,
        }
    }

    /// Creates a failed render output.
    pub fn failure(errors: Vec<JsonError>, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
            result: None,
            failed_after: None,
        }
    }

    /// Records the stage a failure stopped at.
    pub fn with_failed_after(mut self, stage: impl Into<String>) -> Self {
        self.failed_after = Some(stage.into());
        self
    }
}

/// JSON output for the `config` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOutput {
    /// Whether every supplied field was accepted
    pub success: bool,
    /// Settings file location
    pub path: String,
    /// Configuration after the command ran
    pub configuration: RenderConfiguration,
    /// Diagnostics for rejected fields
    pub warnings: Vec<JsonWarning>,
}

/// Serializes `value` as pretty JSON, falling back to a minimal error object.
pub fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"errors":[{{"code":"{}","message":"{}"}}]}}"#,
            error_codes::JSON_SERIALIZE,
            e.to_string().replace('"', "'")
        )
    })
}
