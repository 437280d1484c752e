use verbatim::domain::{TranscriptionResult, TranscriptionSegment, UNKNOWN_LANGUAGE, Word};

fn segment(id: i64, start: f64, end: f64, text: &str) -> TranscriptionSegment {
    TranscriptionSegment::new(id, start, end, text, Vec::new())
}

#[test]
fn given_unordered_segments_when_assembling_then_sorted_by_start() {
    let result = TranscriptionResult::assemble(
        Some("a b c"),
        vec![segment(2, 4.0, 5.0, "c"), segment(0, 0.0, 1.0, "a"), segment(1, 2.0, 3.0, "b")],
        Some("en"),
        "whisperx",
    );

    let starts: Vec<f64> = result.segments.iter().map(|s| s.start).collect();
    assert_eq!(starts, vec![0.0, 2.0, 4.0]);
    assert!(result.is_ordered());
}

#[test]
fn given_equal_start_times_when_assembling_then_engine_order_is_kept() {
    let result = TranscriptionResult::assemble(
        None,
        vec![segment(7, 1.0, 2.0, "first"), segment(3, 1.0, 1.5, "second")],
        None,
        "timestamped",
    );

    let ids: Vec<i64> = result.segments.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![7, 3]);
}

#[test]
fn given_blank_text_when_assembling_then_text_is_joined_from_segments() {
    let result = TranscriptionResult::assemble(
        Some("   "),
        vec![segment(1, 1.0, 2.0, " world "), segment(0, 0.0, 1.0, "hello")],
        Some("en"),
        "whisperx",
    );

    assert_eq!(result.text, "hello world");
}

#[test]
fn given_missing_language_when_assembling_then_language_is_unknown() {
    let result = TranscriptionResult::assemble(Some("hi"), Vec::new(), None, "whisperx");
    assert_eq!(result.language, UNKNOWN_LANGUAGE);

    let blank = TranscriptionResult::assemble(Some("hi"), Vec::new(), Some(""), "whisperx");
    assert_eq!(blank.language, UNKNOWN_LANGUAGE);
}

#[test]
fn given_no_segments_when_assembling_then_text_is_empty() {
    let result = TranscriptionResult::assemble(None, Vec::new(), Some("fr"), "timestamped");
    assert_eq!(result.text, "");
    assert!(result.segments.is_empty());
    assert_eq!(result.language, "fr");
}

#[test]
fn given_end_before_start_when_creating_segment_then_end_is_clamped() {
    let seg = segment(0, 3.0, 2.0, "x");
    assert_eq!(seg.start, 3.0);
    assert_eq!(seg.end, 3.0);
}

#[test]
fn given_segment_without_words_when_serialized_then_words_is_empty_list() {
    let json = serde_json::to_value(segment(0, 0.0, 1.0, "hi")).unwrap();
    assert_eq!(json["words"], serde_json::json!([]));

    let parsed: TranscriptionSegment =
        serde_json::from_str(r#"{"id": 0, "start": 0.0, "end": 1.0, "text": "hi"}"#).unwrap();
    assert!(parsed.words.is_empty());
}

#[test]
fn given_result_with_words_when_serialized_then_shape_is_stable() {
    let result = TranscriptionResult::assemble(
        None,
        vec![TranscriptionSegment::new(
            0,
            0.0,
            1.0,
            "hi",
            vec![Word::new("hi", 0.0, 1.0)],
        )],
        Some("en"),
        "mock",
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["text"], "hi");
    assert_eq!(json["language"], "en");
    assert_eq!(json["engine"], "mock");
    assert_eq!(json["segments"][0]["words"][0]["word"], "hi");
}
