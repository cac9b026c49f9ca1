use intervox::audio::{encode_wav, AudioFile, AudioSource, CaptureBackendFactory};
use intervox::capture::{RecordingConfig, RecordingSession};
use std::time::Duration;

fn write_test_wav(dir: &tempfile::TempDir, samples: &[i16]) -> std::path::PathBuf {
    let path = dir.path().join("answer.wav");
    let bytes = encode_wav(samples, 16000, 1).unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn wav_round_trips_through_encode_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<i16> = (0..16000).map(|i| ((i % 200) * 100) as i16).collect();
    let path = write_test_wav(&dir, &samples);

    let audio = AudioFile::open(&path).unwrap();
    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples, samples);
    assert!((audio.duration_seconds - 1.0).abs() < 0.001);
}

#[tokio::test]
async fn file_backend_feeds_a_full_recording() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<i16> = vec![2000; 8000]; // 0.5s at 16kHz mono
    let path = write_test_wav(&dir, &samples);

    let backend = CaptureBackendFactory::create(AudioSource::File(path)).unwrap();
    let session = RecordingSession::start(backend, RecordingConfig::default())
        .await
        .unwrap();

    // Give the file stream time to drain
    tokio::time::sleep(Duration::from_millis(200)).await;

    let recording = session.stop().await.unwrap();
    assert_eq!(&recording.bytes[..4], b"RIFF");
    assert!((recording.duration_secs - 0.5).abs() < 0.01);

    let meter = session.meter();
    session.release().await;
    assert_eq!(meter.level(), 0.0);
}

#[test]
fn microphone_source_requires_an_embedder_backend() {
    assert!(CaptureBackendFactory::create(AudioSource::Microphone).is_err());
}
