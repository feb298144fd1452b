//! Doctor command implementation
//!
//! Checks the external tools and the stored configuration.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use scoreplay_backend_fluidsynth::tools::probe;
use scoreplay_backend_fluidsynth::{Tool, ToolStatus};

use crate::settings::Settings;

/// Run the doctor command
///
/// Checks:
/// - fluidsynth and ffmpeg can be located and report a version
/// - a sound font is configured and exists
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(config: Option<&str>) -> Result<ExitCode> {
    println!("{}", "Scoreplay Doctor".cyan().bold());
    println!("{}", "================".cyan());
    println!();

    let path = Settings::resolve_path(config)?;
    let settings = Settings::load(&path)?;
    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} scoreplay-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Dependencies:".bold());
    let paths = settings.tool_paths();
    for tool in [Tool::Synthesizer, Tool::Transcoder] {
        all_ok &= report_tool(tool, &probe(&paths, tool));
    }
    println!();

    println!("{}", "Configuration:".bold());
    println!("  {} settings file {}", "->".green(), path.display());
    all_ok &= report_sound_font(&settings);
    println!("  {} midi bank {}", "ok".green(), settings.render.midi_bank);
    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

fn report_tool(tool: Tool, status: &ToolStatus) -> bool {
    match status {
        ToolStatus::Found { path, version } => {
            println!(
                "  {} {} {} ({})",
                "ok".green(),
                tool,
                version,
                path.display()
            );
            true
        }
        ToolStatus::NotFound => {
            println!("  {} {} not found", "!!".red(), tool);
            println!(
                "     {}",
                format!(
                    "Install it, put it on PATH, or set {}.",
                    tool.env_var()
                )
                .dimmed()
            );
            false
        }
        ToolStatus::Error(e) => {
            println!("  {} {} check failed: {}", "!!".red(), tool, e);
            false
        }
    }
}

fn report_sound_font(settings: &Settings) -> bool {
    match settings.render.sound_font() {
        Some(font) if font.is_file() => {
            println!("  {} sound font {}", "ok".green(), font.display());
            true
        }
        Some(font) => {
            println!(
                "  {} sound font {} does not exist",
                "!!".red(),
                font.display()
            );
            false
        }
        None => {
            println!("  {} no sound font configured", "!!".yellow());
            println!(
                "     {}",
                "Run `scoreplay config set --sound-font <file.sf2>`.".dimmed()
            );
            false
        }
    }
}
