//! Render requests and the MIDI-export capability.
//!
//! A render request is anything that can write itself out as a Standard MIDI
//! File. Types that know this statically implement [`MidiExportable`]; hosts
//! that load arbitrary objects at runtime go through [`Expression`], whose
//! capability probe may come back empty.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::SpecError;

/// Magic bytes at the start of every Standard MIDI File.
pub const MIDI_HEADER: &[u8; 4] = b"MThd";

/// Result of writing a request out as MIDI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiExport {
    /// Where the MIDI file was written.
    pub path: PathBuf,
    /// Time spent formatting the expression.
    pub format_time: Duration,
    /// Time spent writing the file.
    pub render_time: Duration,
}

/// Capability of producing a MIDI file.
pub trait MidiExportable {
    /// Writes this request as a Standard MIDI File at `path`.
    fn export_midi(&self, path: &Path) -> io::Result<MidiExport>;
}

/// An object that may or may not be renderable as MIDI.
pub trait Expression {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns the MIDI-export capability, if this expression has one.
    fn as_midi_exportable(&self) -> Option<&dyn MidiExportable>;
}

/// Returns true if `bytes` start with a Standard MIDI File header.
pub fn is_midi(bytes: &[u8]) -> bool {
    bytes.starts_with(MIDI_HEADER)
}

/// A Standard MIDI File held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    name: String,
    bytes: Vec<u8>,
}

impl MidiFile {
    /// Wraps MIDI bytes, rejecting anything without an `MThd` header.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SpecError> {
        let name = name.into();
        if !is_midi(&bytes) {
            return Err(SpecError::NotMidi { name });
        }
        Ok(Self { name, bytes })
    }

    /// Reads a MIDI file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl MidiExportable for MidiFile {
    fn export_midi(&self, path: &Path) -> io::Result<MidiExport> {
        let start = Instant::now();
        std::fs::write(path, &self.bytes)?;
        Ok(MidiExport {
            path: path.to_path_buf(),
            format_time: Duration::ZERO,
            render_time: start.elapsed(),
        })
    }
}

impl Expression for MidiFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_midi_exportable(&self) -> Option<&dyn MidiExportable> {
        Some(self)
    }
}

/// A loaded file that failed the MIDI probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueFile {
    name: String,
}

impl OpaqueFile {
    /// Creates an opaque placeholder for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Expression for OpaqueFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_midi_exportable(&self) -> Option<&dyn MidiExportable> {
        None
    }
}

/// Loads `path` as an expression, probing its header.
///
/// Files that are not MIDI still load; they just report no capability.
pub fn load_expression(path: impl AsRef<Path>) -> Result<Box<dyn Expression>, SpecError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path.display().to_string();
    if is_midi(&bytes) {
        Ok(Box::new(MidiFile { name, bytes }))
    } else {
        Ok(Box::new(OpaqueFile::new(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Header chunk plus one track holding a single middle C.
    const ONE_NOTE: &[u8] = &[
        0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x01, 0xE0, 0x4D,
        0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x90, 0x3C, 0x64, 0x83, 0x60, 0x80, 0x3C,
        0x00, 0x00, 0xFF, 0x2F, 0x00,
    ];

    #[test]
    fn test_from_bytes_requires_header() {
        assert!(MidiFile::from_bytes("ok", ONE_NOTE.to_vec()).is_ok());
        let err = MidiFile::from_bytes("bad", b"RIFF....".to_vec()).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_open_reads_and_checks_header() {
        let dir = tempfile::tempdir().unwrap();
        let midi_path = dir.path().join("song.mid");
        let text_path = dir.path().join("song.ly");
        std::fs::write(&midi_path, ONE_NOTE).unwrap();
        std::fs::write(&text_path, "{ c'4 }").unwrap();

        let midi = MidiFile::open(&midi_path).unwrap();
        assert_eq!(midi.bytes(), ONE_NOTE);
        assert!(midi.name().ends_with("song.mid"));

        assert!(matches!(
            MidiFile::open(&text_path),
            Err(SpecError::NotMidi { .. })
        ));
        assert!(matches!(
            MidiFile::open(dir.path().join("absent.mid")),
            Err(SpecError::Io(_))
        ));
    }

    #[test]
    fn test_export_writes_bytes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let midi = MidiFile::from_bytes("note", ONE_NOTE.to_vec()).unwrap();
        let out = dir.path().join("out.mid");

        let export = midi.export_midi(&out).unwrap();

        assert_eq!(export.path, out);
        assert_eq!(std::fs::read(&out).unwrap(), ONE_NOTE);
    }

    #[test]
    fn test_load_expression_probes_capability() {
        let dir = tempfile::tempdir().unwrap();
        let midi_path = dir.path().join("a.mid");
        let text_path = dir.path().join("a.txt");
        std::fs::write(&midi_path, ONE_NOTE).unwrap();
        std::fs::write(&text_path, "c'4 d'4 e'4").unwrap();

        let midi = load_expression(&midi_path).unwrap();
        assert!(midi.as_midi_exportable().is_some());

        let text = load_expression(&text_path).unwrap();
        assert!(text.as_midi_exportable().is_none());
        assert!(text.name().ends_with("a.txt"));
    }

    #[test]
    fn test_load_expression_missing_file_is_io_error() {
        let err = load_expression("/no/such/file.mid").err().unwrap();
        assert!(matches!(err, SpecError::Io(_)));
    }
}
