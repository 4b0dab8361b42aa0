use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://supplysense.db";

#[derive(Parser)]
#[command(name = "supplysense", version, about = "SupplySense inventory backend")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,
    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every subcommand. Each falls back to an environment
/// variable, which `.env` may supply.
#[derive(Clone, Args)]
pub struct Config {
    #[arg(long, global = true, env = "SUPPLYSENSE_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    #[arg(
        long,
        global = true,
        env = "SUPPLYSENSE_DATABASE_URL",
        default_value = DEFAULT_DATABASE_URL
    )]
    pub database_url: String,

    #[arg(long, global = true, env = "LLM_BASE_URL", default_value = supplysense_llm::DEFAULT_BASE_URL)]
    pub llm_base_url: String,

    #[arg(long, global = true, env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    #[arg(long, global = true, env = "LLM_MODEL", default_value = supplysense_llm::DEFAULT_MODEL)]
    pub llm_model: String,

    #[arg(long, global = true, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub elevenlabs_api_key: Option<String>,

    #[arg(
        long,
        global = true,
        env = "ELEVENLABS_BASE_URL",
        default_value = supplysense_voice::tts::DEFAULT_BASE_URL
    )]
    pub elevenlabs_base_url: String,

    /// JSON file replacing the built-in agent roster.
    #[arg(long, global = true, env = "SUPPLYSENSE_ROSTER")]
    pub roster: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "SUPPLYSENSE_SPEECH_COMMAND",
        default_value = supplysense_voice::DEFAULT_SPEECH_COMMAND
    )]
    pub speech_command: String,

    /// Player for synthesized briefing audio; receives an `.mp3` path.
    #[arg(
        long,
        global = true,
        env = "SUPPLYSENSE_AUDIO_PLAYER",
        default_value = supplysense_voice::DEFAULT_AUDIO_PLAYER
    )]
    pub audio_player: String,

    /// User the CLI subcommands act for.
    #[arg(long, global = true, env = "SUPPLYSENSE_USER", default_value = "local")]
    pub user: String,
}

impl Config {
    pub fn llm_api_key(&self) -> Option<SecretString> {
        secret(self.llm_api_key.as_deref())
    }

    pub fn elevenlabs_api_key(&self) -> Option<SecretString> {
        secret(self.elevenlabs_api_key.as_deref())
    }
}

fn secret(value: Option<&str>) -> Option<SecretString> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| SecretString::new(value.to_string()))
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve,
    /// Validate and import a sales CSV.
    Import {
        path: PathBuf,
        /// Only validate and print the preview.
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate inventory insights from the imported sales.
    Analyze,
    /// Run one agent coordination session.
    Coordinate {
        /// Disruption scenario key; omit for a demand signal.
        #[arg(long)]
        scenario: Option<String>,
    },
    /// Build the executive briefing and play or save it.
    Brief {
        /// Also save the played MP3 here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
