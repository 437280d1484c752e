use verbatim::application::ports::EngineSelector;
use verbatim::infrastructure::audio::EngineRegistry;
use verbatim::presentation::config::{EngineCommandSettings, EngineSettings, WorkerSettings};

#[test]
fn given_production_engine_names_when_selecting_then_engine_carries_model_and_device() {
    let registry = EngineRegistry::new("cpu");

    let whisperx = registry.select("whisperx", "large-v2").unwrap();
    assert_eq!(whisperx.name(), "whisperx");
    assert_eq!(whisperx.model(), "large-v2");
    assert_eq!(whisperx.device(), "cpu");

    let timestamped = registry.select("timestamped", "base").unwrap();
    assert_eq!(timestamped.name(), "timestamped");
    assert_eq!(timestamped.model(), "base");
}

#[test]
fn given_mock_name_when_selecting_then_mock_engine_is_returned() {
    let engine = EngineRegistry::new("cuda").select("mock", "tiny").unwrap();
    assert_eq!(engine.name(), "mock");
    assert_eq!(engine.model(), "tiny");
}

#[test]
fn given_unknown_name_when_selecting_then_error_names_engine() {
    let err = EngineRegistry::new("cpu")
        .select("deepgram", "base")
        .err()
        .unwrap();

    assert_eq!(err.to_string(), "unsupported engine: deepgram");
}

#[test]
fn given_settings_when_building_registry_then_configured_device_is_used() {
    let worker = WorkerSettings {
        name: "w".to_string(),
        device: "cpu".to_string(),
        scratch_dir: std::env::temp_dir().to_string_lossy().into_owned(),
        mock_engines: false,
    };
    let engines = EngineSettings {
        whisperx: EngineCommandSettings {
            program: "python".to_string(),
            args: vec!["-m".to_string(), "whisperx".to_string()],
        },
        timestamped: EngineCommandSettings {
            program: "whisper-timestamped".to_string(),
            args: Vec::new(),
        },
        diarize: false,
        vad_filter: true,
        timeout_secs: 60,
    };

    let engine = EngineRegistry::from_settings(&worker, &engines)
        .select("whisperx", "medium")
        .unwrap();

    assert_eq!(engine.device(), "cpu");
    assert_eq!(engine.model(), "medium");
}
