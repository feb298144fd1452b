//! External tool discovery.
//!
//! Each tool is searched for in:
//!
//! 1. The path configured in [`ToolPaths`]
//! 2. Its environment variable (`SCOREPLAY_FLUIDSYNTH`, `SCOREPLAY_FFMPEG`)
//! 3. System PATH
//! 4. Common installation locations (platform-specific)

use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{RenderError, RenderResult};

/// The external programs the pipeline drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    /// MIDI to OGG synthesizer (FluidSynth).
    Synthesizer,
    /// OGG to MP3 transcoder (ffmpeg).
    Transcoder,
}

impl Tool {
    /// Executable base name.
    pub fn program(&self) -> &'static str {
        match self {
            Tool::Synthesizer => "fluidsynth",
            Tool::Transcoder => "ffmpeg",
        }
    }

    /// Environment variable that overrides discovery.
    pub fn env_var(&self) -> &'static str {
        match self {
            Tool::Synthesizer => "SCOREPLAY_FLUIDSYNTH",
            Tool::Transcoder => "SCOREPLAY_FFMPEG",
        }
    }

    /// Flag that makes the tool print its version and exit.
    pub fn version_flag(&self) -> &'static str {
        match self {
            Tool::Synthesizer => "--version",
            Tool::Transcoder => "-version",
        }
    }

    fn common_paths(&self) -> Vec<&'static str> {
        match self {
            Tool::Synthesizer => {
                if cfg!(windows) {
                    vec!["C:\\Program Files\\FluidSynth\\bin\\fluidsynth.exe"]
                } else if cfg!(target_os = "macos") {
                    vec![
                        "/opt/homebrew/bin/fluidsynth",
                        "/usr/local/bin/fluidsynth",
                        "/opt/local/bin/fluidsynth",
                    ]
                } else {
                    vec!["/usr/bin/fluidsynth", "/usr/local/bin/fluidsynth"]
                }
            }
            Tool::Transcoder => {
                if cfg!(windows) {
                    vec!["C:\\ffmpeg\\bin\\ffmpeg.exe"]
                } else if cfg!(target_os = "macos") {
                    vec![
                        "/opt/homebrew/bin/ffmpeg",
                        "/usr/local/bin/ffmpeg",
                        "/opt/local/bin/ffmpeg",
                    ]
                } else {
                    vec![
                        "/usr/bin/ffmpeg",
                        "/usr/local/bin/ffmpeg",
                        "/snap/bin/ffmpeg",
                    ]
                }
            }
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Configured locations of the external tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPaths {
    /// Synthesizer override.
    pub synthesizer: Option<PathBuf>,
    /// Transcoder override.
    pub transcoder: Option<PathBuf>,
}

impl ToolPaths {
    /// Creates paths with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the synthesizer path.
    pub fn synthesizer(mut self, path: impl Into<PathBuf>) -> Self {
        self.synthesizer = Some(path.into());
        self
    }

    /// Sets the transcoder path.
    pub fn transcoder(mut self, path: impl Into<PathBuf>) -> Self {
        self.transcoder = Some(path.into());
        self
    }

    fn configured(&self, tool: Tool) -> Option<&PathBuf> {
        match tool {
            Tool::Synthesizer => self.synthesizer.as_ref(),
            Tool::Transcoder => self.transcoder.as_ref(),
        }
    }

    /// Finds the executable for `tool`.
    pub fn find(&self, tool: Tool) -> RenderResult<PathBuf> {
        // Check config override first
        if let Some(path) = self.configured(tool) {
            if path.exists() {
                return Ok(path.clone());
            }
            tracing::debug!("configured {} path {} does not exist", tool, path.display());
        }

        if let Ok(path) = std::env::var(tool.env_var()) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        if let Ok(path) = which::which(tool.program()) {
            return Ok(path);
        }

        for path_str in tool.common_paths() {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(RenderError::ToolNotFound {
            tool,
            env_var: tool.env_var(),
        })
    }
}

/// Result of asking a tool for its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    /// Tool ran; carries its location and reported version.
    Found { path: PathBuf, version: String },
    /// Tool could not be located.
    NotFound,
    /// Tool was located but the version query failed.
    Error(String),
}

/// Locates `tool` and queries its version.
pub fn probe(paths: &ToolPaths, tool: Tool) -> ToolStatus {
    let path = match paths.find(tool) {
        Ok(path) => path,
        Err(_) => return ToolStatus::NotFound,
    };

    match Command::new(&path).arg(tool.version_flag()).output() {
        Ok(output) => {
            if output.status.success() {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let version =
                    parse_version(tool, &stdout).unwrap_or_else(|| "unknown".to_string());
                ToolStatus::Found { path, version }
            } else {
                ToolStatus::Error(format!("{} exited with status: {}", tool, output.status))
            }
        }
        Err(e) => ToolStatus::Error(e.to_string()),
    }
}

/// Extracts the version number from a tool's version banner.
pub fn parse_version(tool: Tool, output: &str) -> Option<String> {
    let line = output.lines().next()?;
    let rest = match tool {
        // "FluidSynth runtime version 2.3.4"
        Tool::Synthesizer => line.split("version").nth(1)?,
        // "ffmpeg version 6.1.1-3ubuntu5 Copyright ..."
        Tool::Transcoder => line.strip_prefix("ffmpeg version")?,
    };
    rest.split_whitespace().next().map(|v| v.to_string())
}
