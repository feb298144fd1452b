//! Persisted CLI settings.
//!
//! Settings live in a JSON file, by default
//! `<config dir>/scoreplay/config.json`. A missing file means defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use scoreplay_backend_fluidsynth::{
    Pipeline, PipelineConfig, SynthesizerSettings, ToolPaths, DEFAULT_SAMPLE_RATE,
};
use scoreplay_spec::{AudioFormat, RenderConfiguration};

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

/// Everything the CLI remembers between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Sound font and MIDI bank.
    #[serde(flatten)]
    pub render: RenderConfiguration,
    /// Explicit fluidsynth executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluidsynth_path: Option<PathBuf>,
    /// Explicit ffmpeg executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,
    /// Synthesizer sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Per-process timeout; unset waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Output audio format.
    #[serde(default)]
    pub format: AudioFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render: RenderConfiguration::default(),
            fluidsynth_path: None,
            ffmpeg_path: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            timeout_secs: None,
            format: AudioFormat::default(),
        }
    }
}

impl Settings {
    /// Default settings file location (XDG-compatible).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("scoreplay").join("config.json"))
    }

    /// Resolves the settings file: the explicit path, or the default one.
    pub fn resolve_path(explicit: Option<&str>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path().context("could not determine a configuration directory"),
        }
    }

    /// Loads settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Writes settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory: {}", parent.display())
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))
    }

    /// Tool locations from these settings.
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            synthesizer: self.fluidsynth_path.clone(),
            transcoder: self.ffmpeg_path.clone(),
        }
    }

    /// Per-process timeout, if one is set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds a pipeline carrying these settings.
    pub fn pipeline(&self, format: AudioFormat, preview_intermediate: bool) -> Pipeline {
        let config = PipelineConfig::default()
            .format(format)
            .synthesizer(SynthesizerSettings::default().sample_rate(self.sample_rate))
            .preview_intermediate(preview_intermediate);
        let mut pipeline = Pipeline::with_tools(config, self.tool_paths(), self.timeout());
        pipeline.set_configuration(self.render.clone());
        pipeline
    }
}
