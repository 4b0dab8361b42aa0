use std::path::Path;

use tokio::process::Command;

use crate::error::VoiceError;

pub const DEFAULT_SPEECH_COMMAND: &str = "espeak";
pub const DEFAULT_AUDIO_PLAYER: &str = "mpg123 -q";

/// A program plus leading arguments, parsed from a whitespace-separated
/// command line such as `"say -v Daniel"`.
#[derive(Clone, Debug, PartialEq, Eq)]
struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    fn parse(command: &str, fallback: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        match parts.next() {
            Some(program) => Self {
                program,
                args: parts.collect(),
            },
            None if fallback.is_empty() => Self {
                program: String::new(),
                args: Vec::new(),
            },
            None => Self::parse(fallback, ""),
        }
    }

    /// Runs the program with `last` appended and waits for it to exit.
    async fn run(&self, last: impl AsRef<std::ffi::OsStr>) -> Result<(), VoiceError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(last)
            .status()
            .await
            .map_err(|source| VoiceError::LocalCommand {
                command: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(VoiceError::LocalCommandExit {
                command: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Speaks text through a local speech-synthesis program, which receives the
/// text as its last argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalSpeech {
    command: CommandLine,
}

impl Default for LocalSpeech {
    fn default() -> Self {
        Self::from_command_line(DEFAULT_SPEECH_COMMAND)
    }
}

impl LocalSpeech {
    /// A blank command line selects [`DEFAULT_SPEECH_COMMAND`].
    pub fn from_command_line(command: &str) -> Self {
        Self {
            command: CommandLine::parse(command, DEFAULT_SPEECH_COMMAND),
        }
    }

    pub fn program(&self) -> &str {
        &self.command.program
    }

    pub async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::MissingText);
        }
        self.command.run(text).await
    }
}

/// Plays MP3 audio through a local player, which receives the path of a
/// temporary `.mp3` file as its last argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioPlayer {
    command: CommandLine,
}

impl Default for AudioPlayer {
    fn default() -> Self {
        Self::from_command_line(DEFAULT_AUDIO_PLAYER)
    }
}

impl AudioPlayer {
    /// A blank command line selects [`DEFAULT_AUDIO_PLAYER`].
    pub fn from_command_line(command: &str) -> Self {
        Self {
            command: CommandLine::parse(command, DEFAULT_AUDIO_PLAYER),
        }
    }

    pub fn program(&self) -> &str {
        &self.command.program
    }

    pub async fn play(&self, audio: &[u8]) -> Result<(), VoiceError> {
        let file = tempfile::Builder::new()
            .prefix("briefing-")
            .suffix(".mp3")
            .tempfile()
            .map_err(VoiceError::AudioFile)?;
        tokio::fs::write(file.path(), audio)
            .await
            .map_err(VoiceError::AudioFile)?;
        self.play_file(file.path()).await
    }

    async fn play_file(&self, path: &Path) -> Result<(), VoiceError> {
        self.command.run(path).await
    }
}
