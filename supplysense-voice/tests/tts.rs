use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use supplysense_voice::{
    AudioPlayer, BriefingPlayer, Delivery, ElevenLabsClient, LocalSpeech, TtsService, VoiceError,
};

fn client(server: &MockServer) -> ElevenLabsClient {
    ElevenLabsClient::builder(SecretString::new("xi-test".to_string()))
        .base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn synthesize_returns_mp3_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/JBFqnCBsd6RMkjVDRZzb"))
        .and(query_param("output_format", "mp3_44100_128"))
        .and(header("xi-api-key", "xi-test"))
        .and(body_json(json!({
            "text": "Executive briefing.",
            "model_id": "eleven_turbo_v2_5",
            "voice_settings": {"stability": 0.7, "similarity_boost": 0.75, "speed": 1.0}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(vec![0x49, 0x44, 0x33]),
        )
        .expect(1)
        .mount(&server)
        .await;

    let audio = TtsService::new(Some(client(&server)))
        .synthesize("Executive briefing.")
        .await
        .unwrap();

    assert_eq!(audio.as_ref(), &[0x49, 0x44, 0x33]);
}

#[tokio::test]
async fn provider_failure_is_a_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = TtsService::new(Some(client(&server)))
        .synthesize("hello")
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 502);
    assert_eq!(err.to_string(), "TTS generation failed");
    assert!(matches!(err, VoiceError::Provider { status: Some(401), .. }));
}

#[tokio::test]
async fn missing_key_is_not_configured() {
    let err = TtsService::default().synthesize("hello").await.unwrap_err();

    assert_eq!(err.status_code(), 501);
    assert_eq!(err.to_string(), "TTS not configured");
}

#[tokio::test]
async fn empty_text_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = TtsService::new(Some(client(&server)))
        .synthesize("  ")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "text is required");
    assert_eq!(err.status_code(), 500);
}

#[cfg(unix)]
#[tokio::test]
async fn unconfigured_tts_falls_back_to_local_speech() {
    let player = BriefingPlayer::new(TtsService::default(), LocalSpeech::from_command_line("true"));

    let delivery = player.deliver("All products are healthy.").await.unwrap();

    assert_eq!(delivery, Delivery::Spoken);
}

#[cfg(unix)]
#[tokio::test]
async fn failing_local_speech_is_reported() {
    let player =
        BriefingPlayer::new(TtsService::default(), LocalSpeech::from_command_line("false"));

    let err = player.deliver("hello").await.unwrap_err();

    assert!(matches!(err, VoiceError::LocalCommandExit { .. }));
}

#[cfg(unix)]
async fn mp3_server(body: &'static [u8]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(body.to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[cfg(unix)]
#[tokio::test]
async fn synthesized_audio_is_handed_to_the_player() {
    const MP3: &[u8] = b"ID3 briefing";
    let expected = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(expected.path(), MP3).unwrap();
    let server = mp3_server(MP3).await;

    // `cmp` exits non-zero unless the staged file matches byte for byte.
    let player = BriefingPlayer::new(
        TtsService::new(Some(client(&server))),
        LocalSpeech::from_command_line("false"),
    )
    .with_audio_player(AudioPlayer::from_command_line(&format!(
        "cmp -s {}",
        expected.path().display()
    )));

    let delivery = player.deliver("Executive briefing.").await.unwrap();

    assert_eq!(delivery, Delivery::Audio(MP3.to_vec().into()));
}

#[cfg(unix)]
#[tokio::test]
async fn unplayable_audio_falls_back_to_local_speech() {
    let server = mp3_server(b"ID3").await;
    let player = BriefingPlayer::new(
        TtsService::new(Some(client(&server))),
        LocalSpeech::from_command_line("true"),
    )
    .with_audio_player(AudioPlayer::from_command_line("false"));

    let delivery = player.deliver("Executive briefing.").await.unwrap();

    assert_eq!(delivery, Delivery::Spoken);
}

#[cfg(unix)]
#[tokio::test]
async fn missing_player_falls_back_to_local_speech() {
    let server = mp3_server(b"ID3").await;
    let player = BriefingPlayer::new(
        TtsService::new(Some(client(&server))),
        LocalSpeech::from_command_line("true"),
    )
    .with_audio_player(AudioPlayer::from_command_line("supplysense-no-such-player"));

    let delivery = player.deliver("Executive briefing.").await.unwrap();

    assert_eq!(delivery, Delivery::Spoken);
}

#[cfg(unix)]
#[tokio::test]
async fn provider_error_falls_back_to_local_speech() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;
    let player = BriefingPlayer::new(
        TtsService::new(Some(client(&server))),
        LocalSpeech::from_command_line("true"),
    )
    .with_audio_player(AudioPlayer::from_command_line("false"));

    let delivery = player.deliver("Executive briefing.").await.unwrap();

    assert_eq!(delivery, Delivery::Spoken);
}
