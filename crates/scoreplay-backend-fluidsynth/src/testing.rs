//! Test doubles for driving the pipeline without FluidSynth or ffmpeg.

use std::sync::{Arc, Mutex};

use scoreplay_spec::MidiFile;

use crate::error::RenderResult;
use crate::process::{Invocation, ProcessOutput, ProcessRunner};
use crate::tools::Tool;

/// A Standard MIDI File holding a single quarter-note middle C.
pub const ONE_NOTE_MIDI: &[u8] = &[
    0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x01, 0x01, 0xE0, 0x4D, 0x54,
    0x72, 0x6B, 0x00, 0x00, 0x00, 0x0E, 0x00, 0x90, 0x3C, 0x64, 0x83, 0x60, 0x80, 0x3C, 0x00, 0x00,
    0xFF, 0x2F, 0x00,
];

/// [`ONE_NOTE_MIDI`] as a render request.
pub fn one_note_midi() -> MidiFile {
    match MidiFile::from_bytes("one-note", ONE_NOTE_MIDI.to_vec()) {
        Ok(midi) => midi,
        Err(_) => unreachable!("fixture carries a MIDI header"),
    }
}

#[derive(Debug)]
struct Script {
    synthesizer_exit: i32,
    transcoder_exit: i32,
    write_outputs: bool,
    calls: Vec<Invocation>,
}

/// Records invocations and fakes each tool's exit code and output file.
///
/// Clones share their record, so a test can keep one handle while the
/// pipeline owns another.
#[derive(Debug, Clone)]
pub struct ScriptedRunner {
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRunner {
    /// Bytes written as the synthesizer's OGG output.
    pub const OGG_BYTES: &'static [u8] = b"OggS\x00\x02fake-vorbis";
    /// Bytes written as the transcoder's MP3 output.
    pub const MP3_BYTES: &'static [u8] = b"ID3\x04\x00fake-mpeg";

    /// Both tools succeed and write their outputs.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                synthesizer_exit: 0,
                transcoder_exit: 0,
                write_outputs: true,
                calls: Vec::new(),
            })),
        }
    }

    /// Makes the synthesizer exit with `code`.
    pub fn synthesizer_exit(self, code: i32) -> Self {
        self.lock().synthesizer_exit = code;
        self
    }

    /// Makes the transcoder exit with `code`.
    pub fn transcoder_exit(self, code: i32) -> Self {
        self.lock().transcoder_exit = code;
        self
    }

    /// Tools succeed but write nothing.
    pub fn skip_outputs(self) -> Self {
        self.lock().write_outputs = false;
        self
    }

    /// Every invocation seen so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().calls.clone()
    }

    /// Number of invocations of `tool`.
    pub fn count(&self, tool: Tool) -> usize {
        self.lock().calls.iter().filter(|c| c.tool == tool).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread poisons the lock; the record is still usable.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> RenderResult<ProcessOutput> {
        let mut script = self.lock();
        script.calls.push(invocation.clone());

        let (exit_code, bytes) = match invocation.tool {
            Tool::Synthesizer => (script.synthesizer_exit, Self::OGG_BYTES),
            Tool::Transcoder => (script.transcoder_exit, Self::MP3_BYTES),
        };

        if exit_code != 0 {
            return Ok(ProcessOutput::new(exit_code, format!("{} failed", invocation.tool)));
        }
        if script.write_outputs {
            std::fs::write(&invocation.output, bytes)?;
        }
        Ok(ProcessOutput::new(0, ""))
    }
}
