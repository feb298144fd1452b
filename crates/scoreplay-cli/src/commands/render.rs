//! Render command implementation
//!
//! Renders a MIDI file to audio and emits the `<audio>` element.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

use scoreplay_backend_fluidsynth::{Pipeline, RenderError};
use scoreplay_spec::{load_expression, AudioFormat, BackendError, CollectingSink, ConfigDiagnostic};

use super::json_output::{
    error_codes, to_json_string, JsonError, JsonWarning, RenderOutput, RenderResult,
};
use crate::settings::Settings;

/// Exit code for a request that cannot be rendered at all.
pub const EXIT_HARD_FAILURE: u8 = 2;

/// Options for the render command.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Input file (Standard MIDI File)
    pub input: PathBuf,
    /// Where to write the HTML element (stdout when absent)
    pub out: Option<PathBuf>,
    /// Output format override
    pub format: Option<AudioFormat>,
    /// Also emit the OGG element before transcoding
    pub preview_ogg: bool,
    /// One-off sound font override
    pub sound_font: Option<PathBuf>,
    /// One-off MIDI bank override
    pub bank: Option<String>,
    /// Per-process timeout override
    pub timeout_secs: Option<u64>,
    /// Machine-readable output
    pub json: bool,
    /// Settings file override
    pub config: Option<String>,
}

/// Run the render command
///
/// # Returns
/// Exit code: 0 on success, 1 on a render or usage failure, 2 when the input
/// cannot be rendered as MIDI
pub fn run(options: &RenderOptions) -> Result<ExitCode> {
    let settings_path = Settings::resolve_path(options.config.as_deref())?;
    let settings = match Settings::load(&settings_path) {
        Ok(settings) => settings,
        Err(e) if options.json => {
            let error = JsonError::new(error_codes::SETTINGS, format!("{:#}", e))
                .with_file(settings_path.display().to_string());
            println!("{}", to_json_string(&RenderOutput::failure(vec![error], vec![])));
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    };

    let mut pipeline = build_pipeline(settings, options);
    execute(&mut pipeline, options)
}

/// Builds the pipeline from stored settings plus this invocation's format,
/// preview and timeout flags.
pub fn build_pipeline(mut settings: Settings, options: &RenderOptions) -> Pipeline {
    if options.timeout_secs.is_some() {
        settings.timeout_secs = options.timeout_secs;
    }
    let format = options.format.unwrap_or(settings.format);
    settings.pipeline(format, options.preview_ogg)
}

/// Renders with an already-built pipeline.
pub fn execute(pipeline: &mut Pipeline, options: &RenderOptions) -> Result<ExitCode> {
    let diagnostics = apply_overrides(pipeline, options);
    let warnings: Vec<JsonWarning> = diagnostics.iter().map(JsonWarning::from).collect();
    if !options.json {
        print_diagnostics(&diagnostics);
    }

    let input_display = options.input.display().to_string();
    let expression = match load_expression(&options.input) {
        Ok(expression) => expression,
        Err(e) => {
            let message = format!("Failed to read input file: {}", e);
            if options.json {
                let error = JsonError::new(error_codes::FILE_READ, message).with_file(input_display);
                println!("{}", to_json_string(&RenderOutput::failure(vec![error], warnings)));
            } else {
                eprintln!("{} {}", "x".red(), message);
            }
            return Ok(ExitCode::from(1));
        }
    };

    let mut sink = CollectingSink::new();
    let audio = match pipeline.render_expression(expression.as_ref(), &mut sink) {
        Ok(audio) => audio,
        Err(failure) => {
            let suggestion = suggestion_for(&failure.error);
            if options.json {
                let mut error = JsonError::from_render(&failure).with_file(input_display);
                if let Some(suggestion) = suggestion {
                    error = error.with_suggestion(suggestion);
                }
                let output = RenderOutput::failure(vec![error], warnings)
                    .with_failed_after(failure.stage.to_string());
                println!("{}", to_json_string(&output));
            } else {
                eprintln!(
                    "{} [{}] {}",
                    "x".red(),
                    failure.code(),
                    failure.message()
                );
                if let Some(suggestion) = suggestion {
                    eprintln!("   {}", suggestion.dimmed());
                }
            }
            let code = if failure.is_hard() {
                EXIT_HARD_FAILURE
            } else {
                1
            };
            return Ok(ExitCode::from(code));
        }
    };

    let html = sink.into_fragments().join("\n");
    let mut result = RenderResult::from_audio(&audio);

    match &options.out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, format!("{}\n", html)) {
                let message = format!("Failed to write output file: {}", e);
                if options.json {
                    let error = JsonError::new(error_codes::FILE_WRITE, message)
                        .with_file(path.display().to_string());
                    println!("{}", to_json_string(&RenderOutput::failure(vec![error], warnings)));
                } else {
                    eprintln!("{} {} ({})", "x".red(), message, path.display());
                }
                return Ok(ExitCode::from(1));
            }
            result.output = Some(path.display().to_string());
        }
        None if options.json => result.html = Some(html),
        None => println!("{}", html),
    }

    if options.json {
        println!("{}", to_json_string(&RenderOutput::success(result, warnings)));
    } else {
        eprintln!(
            "{} Rendered {} ({} bytes {}, {} process{})",
            "ok".green(),
            input_display,
            audio.byte_len,
            audio.format().mime_type(),
            audio.invocations,
            if audio.invocations == 1 { "" } else { "es" }
        );
        if let Some(out) = &result.output {
            eprintln!("   wrote {}", out);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Hint shown next to a render failure the user can fix from the CLI.
pub fn suggestion_for(error: &RenderError) -> Option<&'static str> {
    match error {
        RenderError::NotConfigured => {
            Some("Run `scoreplay config set --sound-font <file.sf2>` or pass --sound-font")
        }
        RenderError::ToolNotFound { .. } => Some("Run `scoreplay doctor` to check tool discovery"),
        _ => None,
    }
}

/// Applies per-invocation sound font and bank overrides. Rejected values
/// leave the stored ones in place.
fn apply_overrides(pipeline: &mut Pipeline, options: &RenderOptions) -> Vec<ConfigDiagnostic> {
    let mut configuration = pipeline.configuration().clone();
    let mut diagnostics = Vec::new();

    if let Some(sound_font) = &options.sound_font {
        diagnostics.extend(configuration.set_sound_font(sound_font).diagnostics);
    }
    if let Some(bank) = &options.bank {
        diagnostics.extend(configuration.set_midi_bank(bank).diagnostics);
    }

    pipeline.set_configuration(configuration);
    diagnostics
}

pub(crate) fn print_diagnostics(diagnostics: &[ConfigDiagnostic]) {
    for diagnostic in diagnostics {
        eprintln!(
            "{} [{}] {}",
            "!".yellow(),
            diagnostic.code(),
            diagnostic
        );
    }
}
