use intervox::audio::{AudioFrame, ChannelBackend};
use intervox::capture::{RecordingConfig, RecordingSession};
use intervox::error::CaptureError;
use std::time::Duration;

fn frame(samples: Vec<i16>) -> AudioFrame {
    AudioFrame {
        samples,
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 0,
    }
}

#[tokio::test]
async fn backend_without_audio_track_is_rejected() {
    let (backend, _tx) = ChannelBackend::without_audio(8);
    let result = RecordingSession::start(Box::new(backend), RecordingConfig::default()).await;

    match result {
        Err(CaptureError::DeviceUnavailable(msg)) => {
            assert!(msg.contains("no audio track"));
        }
        other => panic!("expected DeviceUnavailable, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn stop_yields_wav_with_riff_header() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    tx.send(frame(vec![100; 1600])).await.unwrap();
    tx.send(frame(vec![-100; 1600])).await.unwrap();
    drop(tx);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let recording = session.stop().await.unwrap();
    assert_eq!(&recording.bytes[..4], b"RIFF");
    assert_eq!(recording.mime_type, "audio/wav");
    assert_eq!(recording.sample_rate, 16000);
    assert!((recording.duration_secs - 0.2).abs() < 0.01);

    session.release().await;
}

#[tokio::test]
async fn stop_finalizes_while_the_backend_stays_open() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    tx.send(frame(vec![100; 1600])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The sender stays alive and idle; stop must still return the blob
    let recording = tokio::time::timeout(Duration::from_secs(2), session.stop())
        .await
        .expect("stop() must not hang on an idle open backend")
        .unwrap();
    assert_eq!(&recording.bytes[..4], b"RIFF");

    drop(tx);
    session.release().await;
}

#[tokio::test]
async fn stop_with_no_captured_audio_is_an_error() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    drop(tx);
    tokio::time::sleep(Duration::from_millis(50)).await;

    match session.stop().await {
        Err(CaptureError::Recording(_)) => {}
        other => panic!("expected Recording error, got {:?}", other.map(|_| ())),
    }

    session.release().await;
}

#[tokio::test]
async fn second_stop_is_an_error() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    tx.send(frame(vec![50; 1600])).await.unwrap();
    drop(tx);
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.stop().await.unwrap();
    assert!(session.stop().await.is_err());

    session.release().await;
}

#[tokio::test]
async fn paused_frames_are_dropped() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    session.pause();
    assert!(session.is_paused());
    tx.send(frame(vec![100; 1600])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.elapsed_secs().await, 0.0);

    session.resume();
    assert!(!session.is_paused());
    tx.send(frame(vec![100; 1600])).await.unwrap();
    drop(tx);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(session.elapsed_secs().await > 0.0);

    session.release().await;
}

#[tokio::test]
async fn pause_and_resume_are_idempotent() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    session.pause();
    session.pause();
    assert!(session.is_paused());
    session.resume();
    session.resume();
    assert!(!session.is_paused());

    drop(tx);
    session.release().await;
}

#[tokio::test]
async fn release_is_idempotent_and_zeroes_the_meter() {
    let (backend, tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    tx.send(frame(vec![i16::MAX / 2; 2048])).await.unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    let meter = session.meter();
    session.release().await;
    session.release().await;

    assert!(!session.is_active());
    assert_eq!(meter.level(), 0.0);
}

#[tokio::test]
async fn pause_after_release_is_a_noop() {
    let (backend, _tx) = ChannelBackend::new(8);
    let session = RecordingSession::start(Box::new(backend), RecordingConfig::default())
        .await
        .unwrap();

    session.release().await;
    session.pause();
    assert!(!session.is_paused());
}
