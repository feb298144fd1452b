//! Command lines for the synthesizer and the transcoder.

use std::path::Path;

use scoreplay_spec::MidiBank;

use crate::process::Invocation;
use crate::tools::Tool;

/// Default synthesizer sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Options passed to FluidSynth on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizerSettings {
    /// Audio driver; `file` renders straight to disk.
    pub audio_driver: String,
    /// Output file type understood by libsndfile.
    pub file_type: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Default for SynthesizerSettings {
    fn default() -> Self {
        Self {
            audio_driver: "file".to_string(),
            file_type: "oga".to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl SynthesizerSettings {
    /// Sets the sample rate.
    pub fn sample_rate(mut self, rate: u32) -> Self {
        self.sample_rate = rate;
        self
    }
}

/// Builds the FluidSynth call that renders `midi` into `ogg`.
///
/// `fluidsynth -a file -T oga -nli -r <rate> -o synth.midi-bank-select=<bank> -F <ogg> <sf2> <mid>`
pub fn synthesizer_invocation(
    settings: &SynthesizerSettings,
    sound_font: &Path,
    bank: MidiBank,
    midi: &Path,
    ogg: &Path,
) -> Invocation {
    Invocation::new(Tool::Synthesizer, ogg)
        .arg("-a")
        .arg(&settings.audio_driver)
        .arg("-T")
        .arg(&settings.file_type)
        .arg("-nli")
        .arg("-r")
        .arg(settings.sample_rate.to_string())
        .arg("-o")
        .arg(format!("synth.midi-bank-select={}", bank))
        .arg("-F")
        .arg(ogg)
        .arg(sound_font)
        .arg(midi)
}

/// Builds the ffmpeg call that transcodes `ogg` into `mp3`.
pub fn transcoder_invocation(ogg: &Path, mp3: &Path) -> Invocation {
    Invocation::new(Tool::Transcoder, mp3)
        .arg("-nostdin")
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(ogg)
        .arg(mp3)
}
