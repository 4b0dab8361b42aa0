use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::Instrument;

use crate::error::VoiceError;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";
pub const DEFAULT_MODEL_ID: &str = "eleven_turbo_v2_5";
pub const OUTPUT_FORMAT: &str = "mp3_44100_128";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub speed: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.7,
            similarity_boost: 0.75,
            speed: 1.0,
        }
    }
}

/// ElevenLabs text-to-speech client returning MP3 audio.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
    voice_id: String,
    model_id: String,
    settings: VoiceSettings,
}

pub struct ElevenLabsBuilder {
    base_url: String,
    api_key: SecretString,
    voice_id: String,
    model_id: String,
    settings: VoiceSettings,
    timeout: Duration,
}

impl ElevenLabsBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ElevenLabsClient, VoiceError> {
        let http = Client::builder().timeout(self.timeout).build()?;
        Ok(ElevenLabsClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
            voice_id: self.voice_id,
            model_id: self.model_id,
            settings: self.settings,
        })
    }
}

impl ElevenLabsClient {
    pub fn builder(api_key: SecretString) -> ElevenLabsBuilder {
        ElevenLabsBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            settings: VoiceSettings::default(),
            timeout: Duration::from_secs(60),
        }
    }

    pub async fn synthesize(&self, text: &str) -> Result<Bytes, VoiceError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: self.settings,
        };
        let span = tracing::info_span!(
            "tts_synthesize",
            voice_id = %self.voice_id,
            chars = text.len(),
        );

        async {
            let response = self
                .http
                .post(&url)
                .query(&[("output_format", OUTPUT_FORMAT)])
                .header("xi-api-key", self.api_key.expose_secret())
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "tts provider returned an error");
                return Err(VoiceError::Provider {
                    status: Some(status.as_u16()),
                    detail,
                });
            }

            Ok(response.bytes().await?)
        }
        .instrument(span)
        .await
    }
}

/// Text-to-speech that may be unconfigured.
#[derive(Clone, Default)]
pub struct TtsService {
    client: Option<ElevenLabsClient>,
}

impl TtsService {
    pub fn new(client: Option<ElevenLabsClient>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn synthesize(&self, text: &str) -> Result<Bytes, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::MissingText);
        }
        let client = self.client.as_ref().ok_or(VoiceError::NotConfigured)?;
        client.synthesize(text).await
    }
}
