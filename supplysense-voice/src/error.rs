use thiserror::Error;

/// `Display` is the message returned to callers of the voice endpoint.
#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("text is required")]
    MissingText,
    #[error("TTS not configured")]
    NotConfigured,
    #[error("TTS generation failed")]
    Provider {
        status: Option<u16>,
        detail: String,
    },
    #[error("failed to start '{command}': {source}")]
    LocalCommand {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' exited with {status}")]
    LocalCommandExit { command: String, status: String },
    #[error("failed to stage briefing audio: {0}")]
    AudioFile(#[source] std::io::Error),
}

impl VoiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            VoiceError::NotConfigured => 501,
            VoiceError::Provider { .. } => 502,
            _ => 500,
        }
    }
}

impl From<reqwest::Error> for VoiceError {
    fn from(err: reqwest::Error) -> Self {
        VoiceError::Provider {
            status: err.status().map(|status| status.as_u16()),
            detail: err.to_string(),
        }
    }
}
