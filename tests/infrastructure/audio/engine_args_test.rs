use std::ffi::OsString;
use std::path::Path;

use verbatim::application::ports::EngineOptions;
use verbatim::infrastructure::audio::{ALIGN_MODEL, DIARIZE_MODEL, TimestampedEngine, WhisperXEngine};

fn strings(args: Vec<OsString>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

#[test]
fn given_cuda_device_when_building_whisperx_args_then_half_precision_and_alignment_are_requested() {
    let engine = WhisperXEngine::new("large-v2", "cuda");
    let args = strings(engine.build_args(
        Path::new("/uploads/a/test.wav"),
        Path::new("/scratch/run-1"),
        Some("en"),
        &EngineOptions::default(),
    ));

    assert_eq!(args[0], "/uploads/a/test.wav");
    assert_eq!(value_after(&args, "--model"), Some("large-v2"));
    assert_eq!(value_after(&args, "--device"), Some("cuda"));
    assert_eq!(value_after(&args, "--output_format"), Some("json"));
    assert_eq!(value_after(&args, "--output_dir"), Some("/scratch/run-1"));
    assert_eq!(value_after(&args, "--align_model"), Some(ALIGN_MODEL));
    assert_eq!(value_after(&args, "--compute_type"), Some("float16"));
    assert_eq!(value_after(&args, "--language"), Some("en"));
    assert!(!args.iter().any(|a| a == "--diarize_model"));
}

#[test]
fn given_cpu_device_and_diarization_when_building_whisperx_args_then_int8_and_diarize_model() {
    let engine = WhisperXEngine::new("base", "cpu");
    let options = EngineOptions {
        diarize: true,
        ..EngineOptions::default()
    };
    let args = strings(engine.build_args(
        Path::new("a.mp3"),
        Path::new("out"),
        None,
        &options,
    ));

    assert_eq!(engine.compute_type(), "int8");
    assert_eq!(value_after(&args, "--compute_type"), Some("int8"));
    assert_eq!(value_after(&args, "--diarize_model"), Some(DIARIZE_MODEL));
    assert!(!args.iter().any(|a| a == "--language"));
}

#[test]
fn given_default_options_when_building_timestamped_args_then_vad_stays_on() {
    let engine = TimestampedEngine::new("small", "cpu");
    let args = strings(engine.build_args(
        Path::new("a.flac"),
        Path::new("out"),
        Some("fr"),
        &EngineOptions::default(),
    ));

    assert_eq!(value_after(&args, "--model"), Some("small"));
    assert_eq!(value_after(&args, "--language"), Some("fr"));
    assert!(!args.iter().any(|a| a == "--no_vad"));
    assert!(!args.iter().any(|a| a == "--align_model"));
}

#[test]
fn given_vad_disabled_when_building_timestamped_args_then_no_vad_flag_is_added() {
    let engine = TimestampedEngine::new("small", "cpu");
    let options = EngineOptions {
        vad_filter: false,
        ..EngineOptions::default()
    };
    let args = strings(engine.build_args(Path::new("a.flac"), Path::new("out"), None, &options));

    assert!(args.iter().any(|a| a == "--no_vad"));
}
