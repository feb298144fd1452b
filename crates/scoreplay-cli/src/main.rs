//! Scoreplay CLI - render MIDI files to embeddable audio
//!
//! Synthesizes MIDI with FluidSynth, transcodes with ffmpeg and prints an
//! HTML `<audio>` element carrying the result as a data URI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use scoreplay_cli::commands::{self, config::SetOptions, render::RenderOptions};
use scoreplay_cli::logging;
use scoreplay_spec::AudioFormat;

/// Scoreplay - MIDI to embeddable audio
#[derive(Parser)]
#[command(name = "scoreplay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Settings file (default: <config dir>/scoreplay/config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a MIDI file and print the <audio> element
    Render {
        /// Path to the MIDI file
        input: PathBuf,

        /// Write the HTML element here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output audio format (mp3, ogg)
        #[arg(short, long)]
        format: Option<AudioFormat>,

        /// Also emit the intermediate OGG before transcoding
        #[arg(long)]
        preview_ogg: bool,

        /// Sound font for this render only
        #[arg(long)]
        sound_font: Option<PathBuf>,

        /// MIDI bank for this render only (gs, gm, xg, mma)
        #[arg(long)]
        bank: Option<String>,

        /// Kill an external tool after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Check fluidsynth, ffmpeg and the configured sound font
    Doctor,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Update stored settings; rejected values keep their previous setting
    Set {
        /// Sound font file (.sf2)
        #[arg(long)]
        sound_font: Option<PathBuf>,

        /// MIDI bank (gs, gm, xg, mma)
        #[arg(long)]
        bank: Option<String>,

        /// Path to the fluidsynth executable
        #[arg(long)]
        fluidsynth: Option<PathBuf>,

        /// Path to the ffmpeg executable
        #[arg(long)]
        ffmpeg: Option<PathBuf>,

        /// Synthesizer sample rate in Hz
        #[arg(long)]
        sample_rate: Option<u32>,

        /// Per-process timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Default output audio format (mp3, ogg)
        #[arg(long)]
        format: Option<AudioFormat>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Print stored settings
    Show {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Render {
            input,
            out,
            format,
            preview_ogg,
            sound_font,
            bank,
            timeout,
            json,
        } => commands::render::run(&RenderOptions {
            input,
            out,
            format,
            preview_ogg,
            sound_font,
            bank,
            timeout_secs: timeout,
            json,
            config: cli.config.clone(),
        }),
        Commands::Config { command } => match command {
            ConfigCommands::Set {
                sound_font,
                bank,
                fluidsynth,
                ffmpeg,
                sample_rate,
                timeout,
                format,
                json,
            } => commands::config::run_set(
                config,
                &SetOptions {
                    sound_font,
                    bank,
                    fluidsynth,
                    ffmpeg,
                    sample_rate,
                    timeout_secs: timeout,
                    format,
                },
                json,
            ),
            ConfigCommands::Show { json } => commands::config::run_show(config, json),
        },
        Commands::Doctor => commands::doctor::run(config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "scoreplay",
            "render",
            "song.mid",
            "--format",
            "ogg",
            "--bank",
            "xg",
            "--preview-ogg",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Render {
                input,
                format,
                bank,
                preview_ogg,
                json,
                ..
            } => {
                assert_eq!(input, PathBuf::from("song.mid"));
                assert_eq!(format, Some(AudioFormat::Ogg));
                assert_eq!(bank.as_deref(), Some("xg"));
                assert!(preview_ogg);
                assert!(!json);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let result = Cli::try_parse_from(["scoreplay", "render", "a.mid", "--format", "wav"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_config_set() {
        let cli = Cli::try_parse_from([
            "scoreplay",
            "--config",
            "/tmp/sp.json",
            "config",
            "set",
            "--sound-font",
            "font.sf2",
            "--bank",
            "gm",
            "--timeout",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.config.as_deref(), Some("/tmp/sp.json"));
        match cli.command {
            Commands::Config {
                command:
                    ConfigCommands::Set {
                        sound_font,
                        bank,
                        timeout,
                        ..
                    },
            } => {
                assert_eq!(sound_font, Some(PathBuf::from("font.sf2")));
                assert_eq!(bank.as_deref(), Some("gm"));
                assert_eq!(timeout, Some(30));
            }
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_cli_parses_config_set_format() {
        let cli =
            Cli::try_parse_from(["scoreplay", "config", "set", "--format", "ogg"]).unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Set { format, .. },
            } => assert_eq!(format, Some(AudioFormat::Ogg)),
            _ => panic!("Expected Config Set command"),
        }
    }

    #[test]
    fn test_cli_parses_doctor() {
        let cli = Cli::try_parse_from(["scoreplay", "doctor"]).unwrap();
        assert!(matches!(cli.command, Commands::Doctor));
    }
}
