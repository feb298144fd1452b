//! scoreplay FluidSynth Backend
//!
//! This crate renders MIDI-exportable requests to audio by driving two
//! external programs as subprocesses.
//!
//! # Overview
//!
//! A render runs three stages in strict sequence:
//!
//! 1. **Export** - the request writes `out.mid` into a fresh temp directory
//! 2. **Synthesize** - FluidSynth renders `out.mid` with the configured sound
//!    font and MIDI bank into `out.ogg`
//! 3. **Transcode** - ffmpeg converts `out.ogg` into `out.mp3`
//!
//! The final file is base64-encoded into an `<audio>` element and handed to
//! a [`DisplaySink`](scoreplay_spec::DisplaySink). A non-zero exit from
//! either tool ends the render; nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! use scoreplay_backend_fluidsynth::{Pipeline, PipelineConfig};
//! use scoreplay_spec::{MidiFile, WriterSink};
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default());
//! let update = pipeline.configure("fonts/FluidR3_GM.sf2", "gs");
//! for diagnostic in &update.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//!
//! let midi = MidiFile::open("score.mid")?;
//! let audio = pipeline.render(&midi, &mut WriterSink::new(std::io::stdout()))?;
//! println!("{} bytes of {}", audio.byte_len, audio.format());
//! ```
//!
//! # Tool Requirements
//!
//! FluidSynth (built with libsndfile for OGG output) and ffmpeg must be
//! installed. See [`tools`] for the search order.
//!
//! # Crate Structure
//!
//! - [`pipeline`] - Render stages and state tracking
//! - [`session`] - Host-facing load/play entry points
//! - [`command`] - Synthesizer and transcoder command lines
//! - [`process`] - Subprocess execution
//! - [`tools`] - External tool discovery
//! - `testing` - Scripted process runner for tests (`testing` feature)
//! - [`error`] - Error types

pub mod command;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tools;

// Re-export main types at crate root
pub use command::{SynthesizerSettings, DEFAULT_SAMPLE_RATE};
pub use error::{RenderError, RenderFailure, RenderResult};
pub use pipeline::{Pipeline, PipelineConfig, RenderStage, RenderedAudio};
pub use process::{Invocation, ProcessOutput, ProcessRunner, SystemRunner};
pub use session::{Session, SharedSession};
pub use tools::{Tool, ToolPaths, ToolStatus};
