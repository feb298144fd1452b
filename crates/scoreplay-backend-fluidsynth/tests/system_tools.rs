//! Drives the pipeline through real subprocesses using stand-in shell
//! scripts for fluidsynth and ffmpeg.
//!
//! Kept to a single test so no other test thread forks while the scripts are
//! being written.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use scoreplay_backend_fluidsynth::testing::one_note_midi;
use scoreplay_backend_fluidsynth::{Pipeline, PipelineConfig, RenderError, RenderStage, ToolPaths};
use scoreplay_spec::CollectingSink;

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

#[test]
fn test_pipeline_with_stand_in_tools() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("calls.log");
    let synth = dir.path().join("fluidsynth");
    let transcoder = dir.path().join("ffmpeg");
    let failing_synth = dir.path().join("fluidsynth-broken");
    let font = dir.path().join("font.sf2");
    std::fs::write(&font, b"sfbk").unwrap();

    write_script(
        &synth,
        &format!(
            r#"echo fluidsynth "$@" >> "{log}"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-F" ]; then out="$2"; shift; fi
  shift
done
printf 'OggS-stand-in' > "$out""#,
            log = log.display()
        ),
    );
    write_script(
        &transcoder,
        &format!(
            r#"echo ffmpeg "$@" >> "{log}"
for last; do :; done
printf 'ID3-stand-in' > "$last""#,
            log = log.display()
        ),
    );
    write_script(&failing_synth, "echo 'fluidsynth: error: no sound font' 1>&2\nexit 4");

    // Success through both tools.
    let paths = ToolPaths::new().synthesizer(&synth).transcoder(&transcoder);
    let mut pipeline = Pipeline::with_tools(
        PipelineConfig::default(),
        paths,
        Some(Duration::from_secs(30)),
    );
    assert!(pipeline.configure(&font, "xg").is_clean());

    let mut sink = CollectingSink::new();
    let audio = pipeline.render(&one_note_midi(), &mut sink).unwrap();

    assert_eq!(audio.stage(), RenderStage::Displayed);
    assert_eq!(audio.tag.decode().unwrap(), b"ID3-stand-in");
    let calls = std::fs::read_to_string(&log).unwrap();
    let lines: Vec<_> = calls.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("fluidsynth "));
    assert!(lines[0].contains("synth.midi-bank-select=xg"));
    assert!(lines[1].starts_with("ffmpeg "));

    // A failing synthesizer reports its status and stderr; ffmpeg never runs.
    std::fs::remove_file(&log).unwrap();
    let paths = ToolPaths::new()
        .synthesizer(&failing_synth)
        .transcoder(&transcoder);
    let mut pipeline = Pipeline::with_tools(PipelineConfig::default(), paths, None);
    pipeline.configure(&font, "gs");

    let failure = pipeline
        .render(&one_note_midi(), &mut CollectingSink::new())
        .unwrap_err();

    match failure.error {
        RenderError::SynthesisFailed { exit_code, stderr } => {
            assert_eq!(exit_code, 4);
            assert!(stderr.contains("no sound font"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!log.exists());
}
