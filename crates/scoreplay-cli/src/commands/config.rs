//! Config command implementation
//!
//! Shows and updates the persisted sound font and MIDI bank.

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scoreplay_spec::{AudioFormat, ConfigUpdate};

use super::json_output::{
    error_codes, to_json_string, ConfigOutput, JsonError, JsonWarning, RenderOutput,
};
use super::render::print_diagnostics;
use crate::settings::Settings;

/// Fields accepted by `config set`.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Sound font file
    pub sound_font: Option<PathBuf>,
    /// MIDI bank label
    pub bank: Option<String>,
    /// fluidsynth executable
    pub fluidsynth: Option<PathBuf>,
    /// ffmpeg executable
    pub ffmpeg: Option<PathBuf>,
    /// Synthesizer sample rate
    pub sample_rate: Option<u32>,
    /// Per-process timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Output audio format
    pub format: Option<AudioFormat>,
}

/// Applies `options` to `settings`.
///
/// Sound font and bank are validated independently; a rejected value keeps
/// the stored one and comes back as a diagnostic. The remaining fields are
/// stored as given.
pub fn apply(settings: &mut Settings, options: &SetOptions) -> ConfigUpdate {
    let mut update = ConfigUpdate::default();

    if let Some(sound_font) = &options.sound_font {
        let result = settings.render.set_sound_font(sound_font);
        update.sound_font_updated = result.sound_font_updated;
        update.diagnostics.extend(result.diagnostics);
    }
    if let Some(bank) = &options.bank {
        let result = settings.render.set_midi_bank(bank);
        update.midi_bank_updated = result.midi_bank_updated;
        update.diagnostics.extend(result.diagnostics);
    }
    if let Some(path) = &options.fluidsynth {
        settings.fluidsynth_path = Some(path.clone());
    }
    if let Some(path) = &options.ffmpeg {
        settings.ffmpeg_path = Some(path.clone());
    }
    if let Some(rate) = options.sample_rate {
        settings.sample_rate = rate;
    }
    if options.timeout_secs.is_some() {
        settings.timeout_secs = options.timeout_secs;
    }
    if let Some(format) = options.format {
        settings.format = format;
    }

    update
}

/// Run `config set`
///
/// # Returns
/// Exit code: 0 if every field was accepted, 1 if any was rejected. Accepted
/// fields are saved either way.
pub fn run_set(config: Option<&str>, options: &SetOptions, json: bool) -> Result<ExitCode> {
    let path = Settings::resolve_path(config)?;
    let mut settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => return settings_failure(&path, e, json),
    };

    let update = apply(&mut settings, options);
    if let Err(e) = settings.save(&path) {
        return settings_failure(&path, e, json);
    }

    if json {
        print_json(&path, &settings, &update);
    } else {
        print_diagnostics(&update.diagnostics);
        print_settings(&path, &settings);
    }

    Ok(if update.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

/// Run `config show`
pub fn run_show(config: Option<&str>, json: bool) -> Result<ExitCode> {
    let path = Settings::resolve_path(config)?;
    let settings = match Settings::load(&path) {
        Ok(settings) => settings,
        Err(e) => return settings_failure(&path, e, json),
    };

    if json {
        print_json(&path, &settings, &ConfigUpdate::default());
    } else {
        print_settings(&path, &settings);
    }
    Ok(ExitCode::SUCCESS)
}

/// Reports an unreadable or unwritable settings file. Only JSON mode turns
/// it into an exit code; otherwise the error propagates to `main`.
fn settings_failure(path: &Path, error: anyhow::Error, json: bool) -> Result<ExitCode> {
    if !json {
        return Err(error);
    }
    let error = JsonError::new(error_codes::SETTINGS, format!("{:#}", error))
        .with_file(path.display().to_string());
    println!("{}", to_json_string(&RenderOutput::failure(vec![error], vec![])));
    Ok(ExitCode::from(1))
}

fn print_json(path: &Path, settings: &Settings, update: &ConfigUpdate) {
    let output = ConfigOutput {
        success: update.is_clean(),
        path: path.display().to_string(),
        configuration: settings.render.clone(),
        warnings: update.diagnostics.iter().map(JsonWarning::from).collect(),
    };
    println!("{}", to_json_string(&output));
}

fn print_settings(path: &Path, settings: &Settings) {
    println!("{} {}", "Settings:".bold(), path.display());
    match settings.render.sound_font() {
        Some(font) => println!("  sound font   {}", font.display()),
        None => println!("  sound font   {}", "(not set)".yellow()),
    }
    println!("  midi bank    {}", settings.render.midi_bank);
    println!("  format       {}", settings.format);
    println!("  sample rate  {}", settings.sample_rate);
    match settings.timeout_secs {
        Some(secs) => println!("  timeout      {}s", secs),
        None => println!("  timeout      {}", "none".dimmed()),
    }
    if let Some(path) = &settings.fluidsynth_path {
        println!("  fluidsynth   {}", path.display());
    }
    if let Some(path) = &settings.ffmpeg_path {
        println!("  ffmpeg       {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scoreplay_spec::MidiBank;

    #[test]
    fn test_apply_sets_valid_fields() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("a.sf2");
        std::fs::write(&font, b"sfbk").unwrap();
        let mut settings = Settings::default();

        let update = apply(
            &mut settings,
            &SetOptions {
                sound_font: Some(font.clone()),
                bank: Some("xg".to_string()),
                sample_rate: Some(48_000),
                format: Some(AudioFormat::Ogg),
                ..Default::default()
            },
        );

        assert!(update.is_clean());
        assert_eq!(settings.render.sound_font(), Some(font.as_path()));
        assert_eq!(settings.render.midi_bank, MidiBank::Xg);
        assert_eq!(settings.sample_rate, 48_000);
        assert_eq!(settings.format, AudioFormat::Ogg);
    }

    #[test]
    fn test_apply_retains_on_rejection() {
        let mut settings = Settings::default();

        let update = apply(
            &mut settings,
            &SetOptions {
                sound_font: Some(PathBuf::from("/nope.sf2")),
                bank: Some("invalid-bank".to_string()),
                timeout_secs: Some(10),
                ..Default::default()
            },
        );

        assert_eq!(update.diagnostics.len(), 2);
        assert_eq!(settings.render.sound_font, None);
        assert_eq!(settings.render.midi_bank, MidiBank::Gs);
        assert_eq!(settings.timeout_secs, Some(10));
    }

    #[test]
    fn test_run_set_persists_accepted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let path_str = path.to_str().unwrap();

        let code = run_set(
            Some(path_str),
            &SetOptions {
                bank: Some("gm".to_string()),
                sound_font: Some(PathBuf::from("/missing.sf2")),
                ..Default::default()
            },
            true,
        )
        .unwrap();

        assert_eq!(code, ExitCode::from(1));
        let saved = Settings::load(&path).unwrap();
        assert_eq!(saved.render.midi_bank, MidiBank::Gm);
        assert_eq!(saved.render.sound_font, None);
    }

    #[test]
    fn test_malformed_settings_in_json_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let path_str = path.to_str().unwrap();

        assert_eq!(run_show(Some(path_str), true).unwrap(), ExitCode::from(1));
        assert_eq!(
            run_set(Some(path_str), &SetOptions::default(), true).unwrap(),
            ExitCode::from(1)
        );
        assert!(run_show(Some(path_str), false).is_err());
        // The broken file is left alone.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1, 2");
    }
}
