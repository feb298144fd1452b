//! Render configuration and its update rules.
//!
//! A configuration holds the sound font handed to the synthesizer and the
//! MIDI bank selector. Updates validate each field on its own: a bad sound
//! font path does not block a good bank, and the reverse. A rejected value
//! leaves the previous one in place and produces a [`ConfigDiagnostic`]
//! instead of an error.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bank::MidiBank;

/// Synthesizer configuration read by every render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfiguration {
    /// Sound font file. `None` until a valid path has been set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound_font: Option<PathBuf>,
    /// MIDI bank selector.
    #[serde(default)]
    pub midi_bank: MidiBank,
}

/// A non-fatal problem found while updating a [`RenderConfiguration`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDiagnostic {
    /// The sound font path does not name an existing file.
    SoundFontMissing {
        /// The rejected path as given.
        path: PathBuf,
        /// Working directory the path was resolved against.
        cwd: Option<PathBuf>,
    },
    /// The bank label is not one of `gs`, `gm`, `xg`, `mma`.
    InvalidMidiBank {
        /// The rejected label.
        label: String,
    },
}

impl ConfigDiagnostic {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigDiagnostic::SoundFontMissing { .. } => "CFG_001",
            ConfigDiagnostic::InvalidMidiBank { .. } => "CFG_002",
        }
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigDiagnostic::SoundFontMissing { path, cwd } => {
                let cwd = cwd
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                write!(
                    f,
                    "The specified SoundFont {} (relative to {}) is either inaccessible or does not exist.",
                    path.display(),
                    cwd
                )
            }
            ConfigDiagnostic::InvalidMidiBank { label } => write!(
                f,
                "The MIDI Bank must be one of ({}), got '{}'",
                MidiBank::allowed_labels(),
                label
            ),
        }
    }
}

/// Outcome of a configuration update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    /// Whether the sound font field changed hands.
    pub sound_font_updated: bool,
    /// Whether the bank field was accepted.
    pub midi_bank_updated: bool,
    /// Diagnostics for each rejected field.
    pub diagnostics: Vec<ConfigDiagnostic>,
}

impl ConfigUpdate {
    /// Returns true if every supplied field was accepted.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    fn merge(&mut self, other: ConfigUpdate) {
        self.sound_font_updated |= other.sound_font_updated;
        self.midi_bank_updated |= other.midi_bank_updated;
        self.diagnostics.extend(other.diagnostics);
    }
}

impl RenderConfiguration {
    /// Creates an empty configuration: no sound font, bank `gs`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the configured sound font, treating an empty path as unset.
    pub fn sound_font(&self) -> Option<&Path> {
        self.sound_font
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Returns true once a sound font has been accepted.
    pub fn is_configured(&self) -> bool {
        self.sound_font().is_some()
    }

    /// Updates both fields, each independently.
    pub fn update(&mut self, sound_font: impl AsRef<Path>, midi_bank: &str) -> ConfigUpdate {
        let mut update = self.set_sound_font(sound_font);
        update.merge(self.set_midi_bank(midi_bank));
        update
    }

    /// Stores `path` if it names an existing file; otherwise keeps the
    /// previous sound font.
    pub fn set_sound_font(&mut self, path: impl AsRef<Path>) -> ConfigUpdate {
        let path = path.as_ref();
        if path.is_file() {
            self.sound_font = Some(path.to_path_buf());
            return ConfigUpdate {
                sound_font_updated: true,
                ..Default::default()
            };
        }

        let diagnostic = ConfigDiagnostic::SoundFontMissing {
            path: path.to_path_buf(),
            cwd: std::env::current_dir().ok(),
        };
        tracing::warn!(code = diagnostic.code(), "{}", diagnostic);
        ConfigUpdate {
            diagnostics: vec![diagnostic],
            ..Default::default()
        }
    }

    /// Stores the bank named by `label` if it is in the fixed enumeration;
    /// otherwise keeps the previous bank.
    pub fn set_midi_bank(&mut self, label: &str) -> ConfigUpdate {
        match label.parse::<MidiBank>() {
            Ok(bank) => {
                self.midi_bank = bank;
                ConfigUpdate {
                    midi_bank_updated: true,
                    ..Default::default()
                }
            }
            Err(_) => {
                let diagnostic = ConfigDiagnostic::InvalidMidiBank {
                    label: label.to_string(),
                };
                tracing::warn!(code = diagnostic.code(), "{}", diagnostic);
                ConfigUpdate {
                    diagnostics: vec![diagnostic],
                    ..Default::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sound_font_fixture() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new()
            .prefix("scoreplay_font_")
            .suffix(".sf2")
            .tempfile()
            .unwrap();
        std::fs::write(file.path(), b"RIFF").unwrap();
        file
    }

    #[test]
    fn test_default_configuration() {
        let config = RenderConfiguration::new();
        assert_eq!(config.sound_font(), None);
        assert_eq!(config.midi_bank, MidiBank::Gs);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_valid_update_sets_both_fields() {
        let font = sound_font_fixture();
        let mut config = RenderConfiguration::new();

        let update = config.update(font.path(), "xg");

        assert!(update.is_clean());
        assert!(update.sound_font_updated);
        assert!(update.midi_bank_updated);
        assert_eq!(config.sound_font(), Some(font.path()));
        assert_eq!(config.midi_bank, MidiBank::Xg);
    }

    #[test]
    fn test_invalid_bank_keeps_previous_bank() {
        let font = sound_font_fixture();
        let mut config = RenderConfiguration::new();

        let update = config.update(font.path(), "invalid-bank");

        assert_eq!(config.midi_bank, MidiBank::Gs);
        assert!(update.sound_font_updated);
        assert!(!update.midi_bank_updated);
        assert_eq!(
            update.diagnostics,
            vec![ConfigDiagnostic::InvalidMidiBank {
                label: "invalid-bank".to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_path_keeps_previous_font_but_accepts_bank() {
        let font = sound_font_fixture();
        let mut config = RenderConfiguration::new();
        config.update(font.path(), "gm");

        let update = config.update("/definitely/not/here.sf2", "mma");

        assert_eq!(config.sound_font(), Some(font.path()));
        assert_eq!(config.midi_bank, MidiBank::Mma);
        assert!(!update.sound_font_updated);
        assert!(update.midi_bank_updated);
        assert_eq!(update.diagnostics.len(), 1);
        assert_eq!(update.diagnostics[0].code(), "CFG_001");
    }

    #[test]
    fn test_both_invalid_produces_two_diagnostics() {
        let mut config = RenderConfiguration::new();
        let update = config.update("missing.sf2", "GS");

        assert_eq!(config, RenderConfiguration::default());
        let codes: Vec<_> = update.diagnostics.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec!["CFG_001", "CFG_002"]);
    }

    #[test]
    fn test_directory_is_not_a_sound_font() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RenderConfiguration::new();
        let update = config.set_sound_font(dir.path());
        assert!(!update.sound_font_updated);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_empty_path_counts_as_unset() {
        let config = RenderConfiguration {
            sound_font: Some(PathBuf::new()),
            midi_bank: MidiBank::Gs,
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_diagnostic_messages() {
        let missing = ConfigDiagnostic::SoundFontMissing {
            path: PathBuf::from("font.sf2"),
            cwd: Some(PathBuf::from("/work")),
        };
        assert!(missing
            .to_string()
            .contains("font.sf2 (relative to /work) is either inaccessible or does not exist"));

        let bank = ConfigDiagnostic::InvalidMidiBank {
            label: "nope".to_string(),
        };
        assert!(bank.to_string().contains("gs, gm, xg, mma"));
    }
}
