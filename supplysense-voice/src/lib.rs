//! Executive briefings: the text, ElevenLabs speech synthesis and a local
//! speech fallback.

pub mod briefing;
pub mod error;
pub mod local;
pub mod player;
pub mod tts;

pub use briefing::briefing_text;
pub use error::VoiceError;
pub use local::{AudioPlayer, LocalSpeech, DEFAULT_AUDIO_PLAYER, DEFAULT_SPEECH_COMMAND};
pub use player::{BriefingPlayer, Delivery};
pub use tts::{ElevenLabsClient, TtsService, VoiceSettings};
