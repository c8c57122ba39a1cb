use dubline::history::{HistoryStore, MemoryHistoryStore};
use dubline::languages::VoiceSelection;
use dubline::media::MediaPayload;
use dubline::pipeline::{
    CollectingProgress, CollectingReporter, Pipeline, PipelineRequest, PipelineState, Stage,
};
use dubline::stages::{MockSpeechToText, MockTextToSpeech, MockTranslator};
use std::sync::Arc;

fn hello_request() -> PipelineRequest {
    PipelineRequest::new(
        MediaPayload::new("hello.mp4", "video/mp4", vec![7u8; 64]),
        "es",
        VoiceSelection::default(),
    )
}

fn pcm_24() -> Vec<u8> {
    (0u8..24).collect()
}

#[tokio::test]
async fn hello_video_becomes_spanish_wav() {
    let progress = Arc::new(CollectingProgress::new());
    let store = Arc::new(MemoryHistoryStore::new());
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new().with_text("Hello world")),
        Arc::new(MockTranslator::new().with_text("Hola mundo")),
        Arc::new(MockTextToSpeech::new().with_pcm(&pcm_24())),
    )
    .with_progress(progress.clone())
    .with_history(store.clone());

    let run = pipeline
        .run(&hello_request().with_user("user-1"))
        .await
        .expect("pipeline should complete");

    assert_eq!(run.result.transcription, "Hello world");
    assert_eq!(run.result.translated_text, "Hola mundo");

    let bytes = run.result.audio.as_bytes();
    assert_eq!(bytes.len(), 68);
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 60);
    assert_eq!(&bytes[8..12], b"WAVE");
    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(&bytes[44..], pcm_24().as_slice());

    assert_eq!(
        progress.completed(),
        vec![Stage::Transcribe, Stage::Translate, Stage::Synthesize]
    );

    assert!(run.persistence.is_scheduled());
    run.persistence.settle().await;

    let records = store.list("user-1").await.expect("list history");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].video_name, "hello.mp4");
    assert_eq!(records[0].translated_text, "Hola mundo");
    assert_eq!(records[0].target_language, "es");
}

#[tokio::test]
async fn translation_failure_stops_before_synthesis() {
    let progress = Arc::new(CollectingProgress::new());
    let tts = Arc::new(MockTextToSpeech::new());
    let store = Arc::new(MemoryHistoryStore::new());
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new().with_text("Hello world")),
        Arc::new(MockTranslator::new().with_failure()),
        tts.clone(),
    )
    .with_progress(progress.clone())
    .with_history(store.clone());

    let failure = pipeline
        .run(&hello_request().with_user("user-1"))
        .await
        .expect_err("translation should fail");

    assert_eq!(failure.stage, Stage::Translate);
    assert!(matches!(
        failure.state(),
        PipelineState::Failed {
            stage: Stage::Translate,
            ..
        }
    ));
    assert_eq!(progress.completed(), vec![Stage::Transcribe]);
    assert!(tts.requests().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn transcription_failure_reports_transcribe_stage() {
    let translator = Arc::new(MockTranslator::new());
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new().with_no_output("no media returned")),
        translator.clone(),
        Arc::new(MockTextToSpeech::new()),
    );

    let failure = pipeline
        .run(&hello_request())
        .await
        .expect_err("transcription should fail");

    assert_eq!(failure.stage, Stage::Transcribe);
    assert!(failure.to_string().starts_with("transcribe failed"));
    assert!(translator.requests().is_empty());
}

#[tokio::test]
async fn history_failure_does_not_fail_the_run() {
    let reporter = Arc::new(CollectingReporter::new());
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new().with_text("Hello world")),
        Arc::new(MockTranslator::new().with_text("Hola mundo")),
        Arc::new(MockTextToSpeech::new().with_pcm(&pcm_24())),
    )
    .with_history(Arc::new(MemoryHistoryStore::new().denying()))
    .with_error_reporter(reporter.clone());

    let run = pipeline
        .run(&hello_request().with_user("user-1"))
        .await
        .expect("history errors must not fail the run");
    assert_eq!(run.result.translated_text, "Hola mundo");

    run.persistence.settle().await;

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, "history");
    assert!(reports[0].1.contains("users/user-1/history"));
}

#[tokio::test]
async fn anonymous_run_skips_history() {
    let store = Arc::new(MemoryHistoryStore::new());
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new()),
        Arc::new(MockTranslator::new()),
        Arc::new(MockTextToSpeech::new()),
    )
    .with_history(store.clone());

    let run = pipeline.run(&hello_request()).await.expect("run");

    assert!(!run.persistence.is_scheduled());
    run.persistence.settle().await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn empty_transcript_is_still_translated() {
    let translator = Arc::new(MockTranslator::new().with_text("(silencio)"));
    let tts = Arc::new(MockTextToSpeech::new());
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new().with_text("")),
        translator.clone(),
        tts.clone(),
    );

    let run = pipeline.run(&hello_request()).await.expect("run");

    assert_eq!(run.result.transcription, "");
    assert_eq!(
        translator.requests(),
        vec![(String::new(), "es".to_string())]
    );
    assert_eq!(tts.requests()[0].0, "(silencio)");
}

#[tokio::test]
async fn result_audio_is_a_wav_data_uri() {
    let pipeline = Pipeline::new(
        Arc::new(MockSpeechToText::new()),
        Arc::new(MockTranslator::new()),
        Arc::new(MockTextToSpeech::new().with_pcm(&pcm_24())),
    );

    let run = pipeline.run(&hello_request()).await.expect("run");

    assert!(
        run.result
            .audio_data_uri()
            .starts_with("data:audio/wav;base64,")
    );
}
