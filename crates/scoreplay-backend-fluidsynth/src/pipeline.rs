//! The render pipeline.
//!
//! A render moves through `Idle -> MidiExported -> Synthesized ->
//! Transcoded -> Displayed`. Each stage gates the next; the first failure
//! ends the call and nothing is retried. The working directory is created
//! fresh for every call and deleted when the call returns.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use scoreplay_spec::{
    AudioFormat, AudioTag, ConfigUpdate, DisplaySink, Expression, MidiExportable,
    RenderConfiguration,
};

use crate::command::{synthesizer_invocation, transcoder_invocation, SynthesizerSettings};
use crate::error::{RenderError, RenderFailure, RenderResult};
use crate::process::{Invocation, ProcessRunner, SystemRunner};
use crate::tools::{Tool, ToolPaths};

/// Progress of a single render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    /// Nothing done yet.
    Idle,
    /// The request was written as MIDI.
    MidiExported,
    /// The synthesizer produced OGG.
    Synthesized,
    /// The transcoder produced MP3.
    Transcoded,
    /// The final audio reached the display sink.
    Displayed,
    /// The call ended early.
    Failed,
}

impl RenderStage {
    /// Returns the stage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStage::Idle => "idle",
            RenderStage::MidiExported => "midi_exported",
            RenderStage::Synthesized => "synthesized",
            RenderStage::Transcoded => "transcoded",
            RenderStage::Displayed => "displayed",
            RenderStage::Failed => "failed",
        }
    }
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for the pipeline that are not part of the render configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Synthesizer options.
    pub synthesizer: SynthesizerSettings,
    /// Format of the displayed artifact. `Ogg` skips the transcoder.
    pub format: AudioFormat,
    /// Also display the OGG rendering before transcoding.
    pub preview_intermediate: bool,
}

impl PipelineConfig {
    /// Sets the output format.
    pub fn format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the synthesizer options.
    pub fn synthesizer(mut self, settings: SynthesizerSettings) -> Self {
        self.synthesizer = settings;
        self
    }

    /// Enables or disables the intermediate OGG display.
    pub fn preview_intermediate(mut self, enabled: bool) -> Self {
        self.preview_intermediate = enabled;
        self
    }
}

/// A successful render.
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    /// The tag handed to the display sink.
    pub tag: AudioTag,
    /// Size of the final audio file in bytes.
    pub byte_len: usize,
    /// Number of external processes spawned.
    pub invocations: usize,
    /// Stages passed through, in order.
    pub stages: Vec<RenderStage>,
}

impl RenderedAudio {
    /// Format of the displayed audio.
    pub fn format(&self) -> AudioFormat {
        self.tag.format
    }

    /// The final stage reached.
    pub fn stage(&self) -> RenderStage {
        self.stages.last().copied().unwrap_or(RenderStage::Idle)
    }
}

/// Renders MIDI-exportable requests to audio.
pub struct Pipeline {
    configuration: RenderConfiguration,
    config: PipelineConfig,
    runner: Box<dyn ProcessRunner>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("configuration", &self.configuration)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl Pipeline {
    /// Creates a pipeline that runs real processes found on the system.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_runner(config, SystemRunner::new(ToolPaths::default()))
    }

    /// Creates a pipeline with system processes, explicit tool locations,
    /// and an optional per-process timeout.
    pub fn with_tools(config: PipelineConfig, paths: ToolPaths, timeout: Option<Duration>) -> Self {
        let mut runner = SystemRunner::new(paths);
        if let Some(timeout) = timeout {
            runner = runner.with_timeout(timeout);
        }
        Self::with_runner(config, runner)
    }

    /// Creates a pipeline that executes through `runner`.
    pub fn with_runner(config: PipelineConfig, runner: impl ProcessRunner + 'static) -> Self {
        Self {
            configuration: RenderConfiguration::default(),
            config,
            runner: Box::new(runner),
        }
    }

    /// Current render configuration.
    pub fn configuration(&self) -> &RenderConfiguration {
        &self.configuration
    }

    /// Replaces the render configuration wholesale.
    pub fn set_configuration(&mut self, configuration: RenderConfiguration) {
        self.configuration = configuration;
    }

    /// Updates the sound font and bank, each field independently.
    pub fn configure(&mut self, sound_font: impl AsRef<Path>, midi_bank: &str) -> ConfigUpdate {
        self.configuration.update(sound_font, midi_bank)
    }

    /// Pipeline options.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Renders an expression whose MIDI capability is only known at runtime.
    ///
    /// An expression without the capability fails with
    /// [`RenderError::NotRenderable`] before anything touches the disk.
    pub fn render_expression(
        &self,
        expression: &dyn Expression,
        sink: &mut dyn DisplaySink,
    ) -> Result<RenderedAudio, RenderFailure> {
        let Some(request) = expression.as_midi_exportable() else {
            return Err(RenderFailure::new(
                RenderStage::Idle,
                RenderError::NotRenderable {
                    name: expression.name().to_string(),
                },
            ));
        };
        self.render(request, sink)
    }

    /// Renders `request` and sends the resulting `<audio>` element to `sink`.
    pub fn render<R: MidiExportable + ?Sized>(
        &self,
        request: &R,
        sink: &mut dyn DisplaySink,
    ) -> Result<RenderedAudio, RenderFailure> {
        let mut run = RenderRun::default();
        match self.run_stages(request, sink, &mut run) {
            Ok(tag) => {
                let byte_len = run.byte_len;
                Ok(RenderedAudio {
                    tag,
                    byte_len,
                    invocations: run.invocations,
                    stages: run.stages,
                })
            }
            Err(error) => {
                let stage = run.current();
                tracing::debug!(%stage, "render failed: {}", error);
                run.advance(RenderStage::Failed);
                Err(RenderFailure::new(stage, error).with_stages(run.stages))
            }
        }
    }

    fn run_stages<R: MidiExportable + ?Sized>(
        &self,
        request: &R,
        sink: &mut dyn DisplaySink,
        run: &mut RenderRun,
    ) -> RenderResult<AudioTag> {
        let sound_font = self
            .configuration
            .sound_font()
            .ok_or(RenderError::NotConfigured)?;
        let bank = self.configuration.midi_bank;

        let work_dir = tempfile::Builder::new()
            .prefix("scoreplay_render_")
            .tempdir()?;
        let midi_path = work_dir.path().join("out.mid");
        let ogg_path = work_dir.path().join(AudioFormat::Ogg.file_name());
        let mp3_path = work_dir.path().join(AudioFormat::Mp3.file_name());

        // Stage A: notation to MIDI
        let export = request
            .export_midi(&midi_path)
            .map_err(RenderError::MidiExportFailed)?;
        tracing::debug!(
            path = %export.path.display(),
            format_ms = export.format_time.as_millis() as u64,
            render_ms = export.render_time.as_millis() as u64,
            "exported MIDI"
        );
        run.advance(RenderStage::MidiExported);

        // Stage B: MIDI to OGG
        let synth = synthesizer_invocation(
            &self.config.synthesizer,
            sound_font,
            bank,
            &export.path,
            &ogg_path,
        );
        self.execute(&synth, run)?;
        run.advance(RenderStage::Synthesized);

        if self.config.format == AudioFormat::Ogg {
            return self.display(AudioFormat::Ogg, &ogg_path, sink, run);
        }

        if self.config.preview_intermediate {
            let bytes = std::fs::read(&ogg_path)?;
            let preview = AudioTag::from_bytes(AudioFormat::Ogg, &bytes);
            sink.display_html(&preview.to_html())
                .map_err(RenderError::Display)?;
        }

        // Stage C: OGG to MP3
        let transcode = transcoder_invocation(&ogg_path, &mp3_path);
        self.execute(&transcode, run)?;
        run.advance(RenderStage::Transcoded);

        self.display(AudioFormat::Mp3, &mp3_path, sink, run)
    }

    fn execute(&self, invocation: &Invocation, run: &mut RenderRun) -> RenderResult<()> {
        tracing::info!("{}", invocation.command_line());
        run.invocations += 1;
        let output = self.runner.run(invocation)?;

        if !output.success() {
            return Err(match invocation.tool {
                Tool::Synthesizer => RenderError::SynthesisFailed {
                    exit_code: output.exit_code,
                    stderr: output.stderr,
                },
                Tool::Transcoder => RenderError::TranscodeFailed {
                    exit_code: output.exit_code,
                    stderr: output.stderr,
                },
            });
        }

        if !invocation.output.is_file() {
            return Err(RenderError::OutputNotFound {
                path: invocation.output.clone(),
            });
        }

        Ok(())
    }

    fn display(
        &self,
        format: AudioFormat,
        path: &Path,
        sink: &mut dyn DisplaySink,
        run: &mut RenderRun,
    ) -> RenderResult<AudioTag> {
        let bytes = std::fs::read(path)?;
        let tag = AudioTag::from_bytes(format, &bytes);
        sink.display_html(&tag.to_html())
            .map_err(RenderError::Display)?;
        run.byte_len = bytes.len();
        run.advance(RenderStage::Displayed);
        Ok(tag)
    }
}

/// Bookkeeping for one render call.
#[derive(Debug)]
struct RenderRun {
    stages: Vec<RenderStage>,
    invocations: usize,
    byte_len: usize,
}

impl Default for RenderRun {
    fn default() -> Self {
        Self {
            stages: vec![RenderStage::Idle],
            invocations: 0,
            byte_len: 0,
        }
    }
}

impl RenderRun {
    fn advance(&mut self, stage: RenderStage) {
        tracing::debug!(%stage, "render stage");
        self.stages.push(stage);
    }

    fn current(&self) -> RenderStage {
        self.stages.last().copied().unwrap_or(RenderStage::Idle)
    }
}
