//! scoreplay Canonical Types
//!
//! This crate provides the types shared by the scoreplay render pipeline and
//! its hosts: the synthesizer configuration, the MIDI-export capability,
//! audio formats, and display sinks. It never spawns processes.
//!
//! # Example
//!
//! ```
//! use scoreplay_spec::{MidiBank, RenderConfiguration};
//!
//! let mut config = RenderConfiguration::new();
//! let update = config.update("missing.sf2", "invalid-bank");
//!
//! // Both fields were rejected; the previous values stay in effect.
//! assert_eq!(update.diagnostics.len(), 2);
//! assert_eq!(config.midi_bank, MidiBank::Gs);
//! assert!(!config.is_configured());
//! ```
//!
//! # Modules
//!
//! - [`bank`]: The MIDI bank enumeration
//! - [`config`]: Render configuration and its update rules
//! - [`request`]: The MIDI-export capability and request types
//! - [`audio`]: Audio formats and `<audio>` tags
//! - [`display`]: Sinks for rendered HTML
//! - [`error`]: Error types and the backend error trait

pub mod audio;
pub mod bank;
pub mod config;
pub mod display;
pub mod error;
pub mod request;

// Re-export commonly used types at the crate root
pub use audio::{AudioFormat, AudioTag};
pub use bank::MidiBank;
pub use config::{ConfigDiagnostic, ConfigUpdate, RenderConfiguration};
pub use display::{CollectingSink, DisplaySink, WriterSink};
pub use error::{BackendError, SpecError};
pub use request::{
    is_midi, load_expression, Expression, MidiExport, MidiExportable, MidiFile, OpaqueFile,
    MIDI_HEADER,
};
