use std::path::Path;
use std::time::Duration;

use super::fakes::{FakePlayer, FakeSynthesizer, PlayerEvent};
use crate::config::{ReadAloudConfig, TtsVoice};
use crate::error::ReadAloudError;
use crate::notification::MemoryProgressObserver;
use crate::pipeline::{PlaybackPipeline, RunOutcome};
use crate::progress::{DefaultProgressReporter, ProgressReporter, ProgressTracker, RunStage};

fn test_config(dir: &Path, chunk_size: usize) -> ReadAloudConfig {
    ReadAloudConfig {
        openai_api_key: "sk-test".to_string(),
        chunk_size,
        poll_interval: Duration::from_millis(1),
        temp_dir: Some(dir.to_path_buf()),
        ..ReadAloudConfig::default()
    }
}

fn leftover_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

#[tokio::test]
async fn test_two_segments_complete_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(3));

    let outcome = pipeline.run("  abcdefgh\n", TtsVoice::Onyx).await.unwrap();

    assert_eq!(outcome, RunOutcome::Completed { segments: 2 });
    assert_eq!(pipeline.synthesizer().texts(), vec!["abcd", "efgh"]);
    assert!(pipeline
        .synthesizer()
        .requests
        .borrow()
        .iter()
        .all(|(_, voice)| *voice == TtsVoice::Onyx));
    assert_eq!(leftover_files(dir.path()), 0);

    let player = pipeline.player();
    assert_eq!(player.count(|e| matches!(e, PlayerEvent::Play)), 2);
    assert_eq!(player.count(|e| matches!(e, PlayerEvent::Unload)), 2);
    assert!(player
        .events()
        .iter()
        .all(|e| !matches!(e, PlayerEvent::Load { existed: false, .. })));
    assert!(!pipeline.controller().is_active());
    assert!(!pipeline.controller().had_error());
}

#[tokio::test]
async fn test_long_text_uses_service_sized_requests() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4000);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(1));

    let text = "x".repeat(9000);
    pipeline.run(&text, TtsVoice::Nova).await.unwrap();

    let lengths: Vec<usize> = pipeline.synthesizer().texts().iter().map(|t| t.len()).collect();
    assert_eq!(lengths, vec![4000, 4000, 1000]);
}

#[tokio::test]
async fn test_empty_input_is_rejected_before_synthesis() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(1));

    for text in ["", "   ", "\n\t \n"] {
        let result = pipeline.run(text, TtsVoice::Nova).await;
        assert!(matches!(result, Err(ReadAloudError::NoInput)));
    }

    assert!(pipeline.synthesizer().requests.borrow().is_empty());
    assert!(pipeline.player().events().is_empty());
    assert!(!pipeline.controller().had_error());
}

#[tokio::test]
async fn test_stop_during_synthesis_skips_playback() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(2));
    pipeline.synthesizer().stop_during(2, pipeline.handle());

    let outcome = pipeline.run("aaaabbbbcccc", TtsVoice::Echo).await.unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled { played: 1, total: 3 });
    assert_eq!(pipeline.synthesizer().texts(), vec!["aaaa", "bbbb"]);
    // Второй сегмент синтезирован, но не воспроизводился
    assert_eq!(pipeline.player().count(|e| matches!(e, PlayerEvent::Play)), 1);
    assert_eq!(leftover_files(dir.path()), 0);
    assert!(!pipeline.controller().had_error());
}

#[tokio::test]
async fn test_stop_during_playback_halts_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(50));
    let handle = pipeline.handle();
    pipeline.player().on_poll(1, 2, move || {
        handle.stop();
    });

    let outcome = pipeline.run("aaaabbbb", TtsVoice::Fable).await.unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled { played: 0, total: 2 });
    assert_eq!(pipeline.synthesizer().texts(), vec!["aaaa"]);

    let player = pipeline.player();
    assert!(player.polls() < 50);
    let events = player.events();
    let stop = events.iter().position(|e| *e == PlayerEvent::Stop).unwrap();
    let unload = events.iter().position(|e| *e == PlayerEvent::Unload).unwrap();
    assert!(stop < unload);
    assert_eq!(player.count(|e| matches!(e, PlayerEvent::Play)), 1);
    assert_eq!(leftover_files(dir.path()), 0);
}

#[tokio::test]
async fn test_synthesis_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::failing_on(2), FakePlayer::new(1));

    let result = pipeline.run("aaaabbbbcccc", TtsVoice::Alloy).await;

    assert!(matches!(result, Err(ReadAloudError::Api { status: 429, .. })));
    assert_eq!(pipeline.synthesizer().texts(), vec!["aaaa", "bbbb"]);
    assert_eq!(pipeline.player().count(|e| matches!(e, PlayerEvent::Play)), 1);
    assert_eq!(leftover_files(dir.path()), 0);
    assert!(pipeline.controller().had_error());
    assert!(!pipeline.controller().is_active());
}

#[tokio::test]
async fn test_playback_failure_still_deletes_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::broken());

    let result = pipeline.run("aaaabbbb", TtsVoice::Alloy).await;

    assert!(matches!(result, Err(ReadAloudError::Playback(_))));
    assert_eq!(pipeline.synthesizer().texts(), vec!["aaaa"]);
    assert_eq!(pipeline.player().events(), vec![PlayerEvent::Stop, PlayerEvent::Unload]);
    assert_eq!(leftover_files(dir.path()), 0);
    assert!(pipeline.controller().had_error());
}

#[tokio::test]
async fn test_volume_change_applies_without_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), 100);
    config.volume = 0.8;
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(6));

    let handle = pipeline.handle();
    pipeline.player().on_poll(1, 2, move || {
        handle.set_volume(0.5);
    });
    let handle = pipeline.handle();
    pipeline.player().on_poll(1, 4, move || {
        handle.set_volume(1.5);
    });

    let outcome = pipeline.run("short text", TtsVoice::Shimmer).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed { segments: 1 });

    let volumes: Vec<f32> = pipeline
        .player()
        .events()
        .iter()
        .filter_map(|e| match e {
            PlayerEvent::Volume(level) => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(volumes, vec![0.8, 0.5, 1.0]);
    assert_eq!(pipeline.player().count(|e| matches!(e, PlayerEvent::Play)), 1);
    assert_eq!(pipeline.handle().volume(), 1.0);
}

#[tokio::test]
async fn test_pipeline_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);

    let observer = MemoryProgressObserver::new();
    let mut reporter = DefaultProgressReporter::new();
    reporter.add_observer(Box::new(observer.clone()));
    let tracker = ProgressTracker::with_reporter(Box::new(reporter));

    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(1))
        .with_tracker(tracker);
    pipeline.run("aaaabb", TtsVoice::Nova).await.unwrap();

    let history = observer.history();
    let first = history.first().unwrap();
    assert_eq!(first.stage, RunStage::Started);
    assert_eq!(first.total, 2);
    assert!(history
        .iter()
        .any(|p| p.stage == RunStage::Playing && p.segment == 2));
    let last = history.last().unwrap();
    assert_eq!(last.stage, RunStage::Completed);
    assert_eq!(last.total_progress, 100.0);
}

#[tokio::test]
async fn test_pipeline_can_run_again_after_stop() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(1));
    pipeline.synthesizer().stop_during(1, pipeline.handle());

    let first = pipeline.run("aaaabbbb", TtsVoice::Nova).await.unwrap();
    assert_eq!(first, RunOutcome::Cancelled { played: 0, total: 2 });

    let second = pipeline.run("cccc", TtsVoice::Nova).await.unwrap();
    assert_eq!(second, RunOutcome::Completed { segments: 1 });
    assert_eq!(pipeline.synthesizer().texts(), vec!["aaaa", "cccc"]);
}

#[tokio::test]
async fn test_begun_run_releases_active_flag() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(1));

    pipeline.begin("aaaa").unwrap();
    assert!(pipeline.controller().is_active());
    assert!(matches!(pipeline.begin("bbbb"), Err(ReadAloudError::AlreadyRunning)));

    let outcome = pipeline.run_started("aaaa", TtsVoice::Nova).await.unwrap();
    assert_eq!(outcome, RunOutcome::Completed { segments: 1 });
    assert!(!pipeline.controller().is_active());

    let again = pipeline.run("bbbb", TtsVoice::Nova).await.unwrap();
    assert_eq!(again, RunOutcome::Completed { segments: 1 });
    assert!(!pipeline.controller().had_error());
}

#[tokio::test]
async fn test_artifact_write_failure_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("missing"), 4);
    let mut pipeline = PlaybackPipeline::new(&config, FakeSynthesizer::default(), FakePlayer::new(1));

    let result = pipeline.run("aaaabbbb", TtsVoice::Echo).await;

    assert!(matches!(result, Err(ReadAloudError::Io(_))));
    assert_eq!(pipeline.synthesizer().texts(), vec!["aaaa"]);
    assert!(pipeline.player().events().is_empty());
    assert!(pipeline.controller().had_error());
    assert!(!pipeline.controller().is_active());
}
