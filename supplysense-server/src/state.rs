use std::sync::Arc;
use std::time::Duration;

use supplysense_core::ToolCallingLlm;
use supplysense_insights::InsightAnalyzer;
use supplysense_llm::OpenAiCompatibleClient;
use supplysense_network::{AgentRoster, Coordinator, REVEAL_INTERVAL};
use supplysense_store::SqliteStore;
use supplysense_voice::{AudioPlayer, ElevenLabsClient, LocalSpeech, TtsService};

use crate::config::Config;

/// Everything a request handler needs, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
    pub analyzer: InsightAnalyzer,
    pub coordinator: Coordinator,
    pub tts: TtsService,
    pub speech: LocalSpeech,
    pub audio_player: AudioPlayer,
    /// Delay between replayed timeline events.
    pub reveal_interval: Duration,
}

impl AppState {
    pub fn new(
        store: SqliteStore,
        llm: Arc<dyn ToolCallingLlm>,
        roster: AgentRoster,
        tts: TtsService,
        model: &str,
    ) -> Self {
        let analyzer = InsightAnalyzer::new(llm.clone(), store.clone()).with_model(model);
        let coordinator = Coordinator::new(llm, store.clone(), Arc::new(roster)).with_model(model);
        Self {
            store,
            analyzer,
            coordinator,
            tts,
            speech: LocalSpeech::default(),
            audio_player: AudioPlayer::default(),
            reveal_interval: REVEAL_INTERVAL,
        }
    }

    pub fn with_speech(mut self, speech: LocalSpeech) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_audio_player(mut self, player: AudioPlayer) -> Self {
        self.audio_player = player;
        self
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    /// Opens the database and builds the provider clients from `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteStore::builder(&config.database_url)
            .max_connections(5)
            .build()
            .await?;

        let mut llm = OpenAiCompatibleClient::builder()
            .base_url(&config.llm_base_url)
            .default_model(&config.llm_model);
        match config.llm_api_key() {
            Some(key) => llm = llm.api_key(key),
            None => tracing::warn!("LLM_API_KEY is not set; analysis and coordination will fail"),
        }
        let llm: Arc<dyn ToolCallingLlm> = Arc::new(llm.build()?);

        let roster = match &config.roster {
            Some(path) => AgentRoster::load(path)?,
            None => AgentRoster::default(),
        };
        tracing::info!(agents = roster.len(), "agent roster loaded");

        let tts = match config.elevenlabs_api_key() {
            Some(key) => TtsService::new(Some(
                ElevenLabsClient::builder(key)
                    .base_url(&config.elevenlabs_base_url)
                    .build()?,
            )),
            None => TtsService::default(),
        };

        Ok(Self::new(store, llm, roster, tts, &config.llm_model)
            .with_speech(LocalSpeech::from_command_line(&config.speech_command))
            .with_audio_player(AudioPlayer::from_command_line(&config.audio_player)))
    }
}
