use bytes::Bytes;

use crate::error::VoiceError;
use crate::local::{AudioPlayer, LocalSpeech};
use crate::tts::TtsService;

#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    /// MP3 audio from the TTS provider, played through the audio player.
    Audio(Bytes),
    /// Spoken aloud by the local speech command.
    Spoken,
}

/// Delivers a briefing through TTS and the audio player, falling back to
/// local speech when TTS is unconfigured or fails, or when the audio cannot
/// be played. Neither path retries.
#[derive(Clone, Default)]
pub struct BriefingPlayer {
    tts: TtsService,
    audio: AudioPlayer,
    local: LocalSpeech,
}

impl BriefingPlayer {
    pub fn new(tts: TtsService, local: LocalSpeech) -> Self {
        Self {
            tts,
            audio: AudioPlayer::default(),
            local,
        }
    }

    pub fn with_audio_player(mut self, audio: AudioPlayer) -> Self {
        self.audio = audio;
        self
    }

    pub async fn deliver(&self, text: &str) -> Result<Delivery, VoiceError> {
        let audio = match self.tts.synthesize(text).await {
            Ok(audio) => audio,
            Err(VoiceError::MissingText) => return Err(VoiceError::MissingText),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    command = self.local.program(),
                    "falling back to local speech"
                );
                return self.speak(text).await;
            }
        };

        match self.audio.play(&audio).await {
            Ok(()) => Ok(Delivery::Audio(audio)),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    player = self.audio.program(),
                    command = self.local.program(),
                    "briefing audio could not be played; falling back to local speech"
                );
                self.speak(text).await
            }
        }
    }

    async fn speak(&self, text: &str) -> Result<Delivery, VoiceError> {
        self.local.speak(text).await?;
        Ok(Delivery::Spoken)
    }
}
