//! Host-facing entry points.
//!
//! A [`Session`] pairs one pipeline with its configuration and exposes the
//! two calls a notebook-style host registers: load a sound font, and play an
//! expression.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use scoreplay_spec::{ConfigUpdate, DisplaySink, Expression, MidiExportable, RenderConfiguration};

use crate::error::RenderFailure;
use crate::pipeline::{Pipeline, PipelineConfig, RenderedAudio};

/// One pipeline and its render configuration.
#[derive(Debug, Default)]
pub struct Session {
    pipeline: Pipeline,
}

impl Session {
    /// Creates a session that runs system tools.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline::new(config),
        }
    }

    /// Wraps an existing pipeline.
    pub fn with_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Stores the sound font and MIDI bank; rejected fields keep their
    /// previous values and come back as diagnostics.
    pub fn load_sound_font(&mut self, sound_font: impl AsRef<Path>, midi_bank: &str) -> ConfigUpdate {
        self.pipeline.configure(sound_font, midi_bank)
    }

    /// Renders `request` and displays it through `sink`.
    pub fn play<R: MidiExportable + ?Sized>(
        &self,
        request: &R,
        sink: &mut dyn DisplaySink,
    ) -> Result<RenderedAudio, RenderFailure> {
        self.pipeline.render(request, sink)
    }

    /// Renders an expression whose capability is probed at runtime.
    pub fn play_expression(
        &self,
        expression: &dyn Expression,
        sink: &mut dyn DisplaySink,
    ) -> Result<RenderedAudio, RenderFailure> {
        self.pipeline.render_expression(expression, sink)
    }

    /// Current render configuration.
    pub fn configuration(&self) -> &RenderConfiguration {
        self.pipeline.configuration()
    }

    /// The underlying pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

/// A session shared between threads.
///
/// Renders and configuration updates are serialized by one mutex, so a
/// render always sees a configuration that was fully applied.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    /// Wraps `session`.
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// See [`Session::load_sound_font`].
    pub fn load_sound_font(&self, sound_font: impl AsRef<Path>, midi_bank: &str) -> ConfigUpdate {
        self.lock().load_sound_font(sound_font, midi_bank)
    }

    /// See [`Session::play`].
    pub fn play<R: MidiExportable + ?Sized>(
        &self,
        request: &R,
        sink: &mut dyn DisplaySink,
    ) -> Result<RenderedAudio, RenderFailure> {
        self.lock().play(request, sink)
    }

    /// See [`Session::play_expression`].
    pub fn play_expression(
        &self,
        expression: &dyn Expression,
        sink: &mut dyn DisplaySink,
    ) -> Result<RenderedAudio, RenderFailure> {
        self.lock().play_expression(expression, sink)
    }

    /// Snapshot of the current configuration.
    pub fn configuration(&self) -> RenderConfiguration {
        self.lock().configuration().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{one_note_midi, ScriptedRunner};
    use crate::pipeline::RenderStage;
    use scoreplay_spec::{AudioFormat, CollectingSink, MidiBank, OpaqueFile};

    fn scripted_session(runner: ScriptedRunner) -> Session {
        Session::with_pipeline(Pipeline::with_runner(PipelineConfig::default(), runner))
    }

    #[test]
    fn test_load_then_play() {
        let runner = ScriptedRunner::new();
        let font = tempfile::Builder::new().suffix(".sf2").tempfile().unwrap();
        let mut session = scripted_session(runner.clone());

        assert!(session.load_sound_font(font.path(), "gm").is_clean());
        let audio = session
            .play(&one_note_midi(), &mut CollectingSink::new())
            .unwrap();

        assert_eq!(audio.invocations, 2);
        assert_eq!(session.configuration().midi_bank, MidiBank::Gm);
    }

    #[test]
    fn test_invalid_bank_keeps_default() {
        let mut session = scripted_session(ScriptedRunner::new());
        let font = tempfile::Builder::new().suffix(".sf2").tempfile().unwrap();

        let update = session.load_sound_font(font.path(), "invalid-bank");

        assert_eq!(update.diagnostics.len(), 1);
        assert_eq!(session.configuration().midi_bank, MidiBank::Gs);
        assert!(session.configuration().is_configured());
    }

    #[test]
    fn test_shared_session_across_threads() {
        let runner = ScriptedRunner::new();
        let shared = SharedSession::new(scripted_session(runner.clone()));
        let font = tempfile::Builder::new().suffix(".sf2").tempfile().unwrap();
        shared.load_sound_font(font.path(), "mma");

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    shared
                        .play(&one_note_midi(), &mut CollectingSink::new())
                        .map(|audio| audio.invocations)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 2);
        }
        assert_eq!(runner.invocations().len(), 6);
        assert_eq!(shared.configuration().midi_bank, MidiBank::Mma);
    }

    #[test]
    fn test_new_session_starts_unconfigured() {
        let session = Session::new(PipelineConfig::default().format(AudioFormat::Ogg));

        assert!(!session.configuration().is_configured());
        assert_eq!(session.configuration().midi_bank, MidiBank::Gs);
        assert_eq!(session.pipeline().config().format, AudioFormat::Ogg);

        // No sound font: fails before any tool is looked up.
        let failure = session
            .play(&one_note_midi(), &mut CollectingSink::new())
            .unwrap_err();
        assert_eq!(failure.stage, RenderStage::Idle);
    }

    #[test]
    fn test_play_expression_probes_capability() {
        let runner = ScriptedRunner::new();
        let mut session = scripted_session(runner.clone());
        let font = tempfile::Builder::new().suffix(".sf2").tempfile().unwrap();
        session.load_sound_font(font.path(), "gs");

        let audio = session
            .play_expression(&one_note_midi(), &mut CollectingSink::new())
            .unwrap();
        assert_eq!(audio.stage(), RenderStage::Displayed);

        let failure = session
            .play_expression(&OpaqueFile::new("score.ly"), &mut CollectingSink::new())
            .unwrap_err();
        assert!(failure.is_hard());
        assert_eq!(runner.invocations().len(), 2);
    }

    #[test]
    fn test_shared_session_play_expression() {
        let runner = ScriptedRunner::new();
        let shared = SharedSession::new(scripted_session(runner.clone()));
        let font = tempfile::Builder::new().suffix(".sf2").tempfile().unwrap();
        shared.load_sound_font(font.path(), "xg");

        let mut sink = CollectingSink::new();
        shared.play_expression(&one_note_midi(), &mut sink).unwrap();
        let failure = shared
            .play_expression(&OpaqueFile::new("notes.txt"), &mut CollectingSink::new())
            .unwrap_err();

        assert_eq!(sink.fragments().len(), 1);
        assert!(failure.is_hard());
        assert_eq!(runner.count(crate::tools::Tool::Synthesizer), 1);
    }
}
