use intervox::capture::Recording;
use intervox::error::TranscribeError;
use intervox::transcribe::{AttemptParams, SpeechToText, Transcriber, ValidationLimits};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock transport that replays scripted responses and counts calls
struct ScriptedTransport {
    responses: Vec<Result<String, TranscribeError>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<String, TranscribeError>>) -> Arc<Self> {
        Arc::new(Self {
            responses,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SpeechToText for ScriptedTransport {
    async fn transcribe(
        &self,
        _recording: &Recording,
        _params: &AttemptParams,
    ) -> Result<String, TranscribeError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(index) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(TranscribeError::Service { status, message })) => {
                Err(TranscribeError::Service {
                    status: *status,
                    message: message.clone(),
                })
            }
            Some(Err(_)) | None => Err(TranscribeError::Transport("exhausted".to_string())),
        }
    }
}

fn recording(size: usize) -> Recording {
    Recording {
        bytes: vec![0u8; size],
        mime_type: "audio/wav".to_string(),
        duration_secs: 2.0,
        sample_rate: 16000,
        channels: 1,
    }
}

#[tokio::test]
async fn too_small_recording_fails_without_network_call() {
    let transport = ScriptedTransport::new(vec![Ok("hello world".to_string())]);
    let transcriber = Transcriber::new(transport.clone());

    let result = transcriber.transcribe(&recording(100)).await;
    assert!(matches!(result, Err(TranscribeError::AudioTooShort(_))));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn oversized_recording_fails_without_network_call() {
    let transport = ScriptedTransport::new(vec![Ok("hello world".to_string())]);
    let transcriber = Transcriber::new(transport.clone()).with_limits(ValidationLimits {
        min_bytes: 1024,
        min_duration_secs: 0.5,
        max_bytes: 4096,
    });

    let result = transcriber.transcribe(&recording(8192)).await;
    assert!(matches!(result, Err(TranscribeError::AudioTooLarge { .. })));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn first_usable_attempt_wins() {
    let transport = ScriptedTransport::new(vec![
        Ok("".to_string()),
        Ok("I have five years of backend experience.".to_string()),
    ]);
    let transcriber = Transcriber::new(transport.clone());

    let text = transcriber.transcribe(&recording(4096)).await.unwrap();
    assert_eq!(text, "I have five years of backend experience.");
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn artifact_only_responses_exhaust_to_empty_transcription() {
    let transport = ScriptedTransport::new(vec![
        Ok("[Music]".to_string()),
        Ok("Transcription by ESO.".to_string()),
        Ok("".to_string()),
    ]);
    let transcriber = Transcriber::new(transport.clone());

    let result = transcriber.transcribe(&recording(4096)).await;
    assert!(matches!(result, Err(TranscribeError::EmptyTranscription)));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn service_failure_on_every_attempt_surfaces_the_error() {
    let failure = || {
        Err(TranscribeError::Service {
            status: 500,
            message: "overloaded".to_string(),
        })
    };
    let transport = ScriptedTransport::new(vec![failure(), failure(), failure()]);
    let transcriber = Transcriber::new(transport.clone());

    let result = transcriber.transcribe(&recording(4096)).await;
    assert!(matches!(
        result,
        Err(TranscribeError::Service { status: 500, .. })
    ));
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn accepted_transcript_is_cleaned() {
    let transport = ScriptedTransport::new(vec![Ok(
        "Transcription by ESO. Translation by — I worked on   distributed systems.".to_string(),
    )]);
    let transcriber = Transcriber::new(transport.clone());

    let text = transcriber.transcribe(&recording(4096)).await.unwrap();
    assert_eq!(text, "I worked on distributed systems.");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn duration_estimate_applies_when_recording_has_none() {
    let transport = ScriptedTransport::new(vec![Ok("hello there".to_string())]);
    let transcriber = Transcriber::new(transport.clone()).with_limits(ValidationLimits {
        min_bytes: 0,
        min_duration_secs: 0.5,
        max_bytes: 25 * 1024 * 1024,
    });

    // 256 bytes / 1024 ≈ 0.25s estimated, below the minimum
    let submitted = Recording {
        bytes: vec![0u8; 256],
        mime_type: "audio/webm".to_string(),
        duration_secs: 0.0,
        sample_rate: 0,
        channels: 0,
    };

    let result = transcriber.transcribe(&submitted).await;
    assert!(matches!(result, Err(TranscribeError::AudioTooShort(_))));
    assert_eq!(transport.calls(), 0);
}
