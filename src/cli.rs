//! Аргументы командной строки

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ReadAloudConfig, TtsModel, VoiceSelection, DEFAULT_API_BASE, DEFAULT_CHUNK_SIZE};
use crate::controller::clamp_volume;

/// Read text aloud with the OpenAI speech API.
///
/// Type or paste text, then enter `:read`. Enter `:help` for all commands.
#[derive(Debug, Parser)]
#[command(name = "readaloud", version, about)]
pub struct Cli {
    /// Voice to read with (alloy, echo, fable, onyx, nova, shimmer or random)
    #[arg(long, default_value = "nova")]
    pub voice: VoiceSelection,

    /// Pick a random voice for every read
    #[arg(long, conflicts_with = "voice")]
    pub random_voice: bool,

    /// TTS model (tts-1 or tts-1-hd)
    #[arg(long, default_value = "tts-1")]
    pub model: TtsModel,

    /// Playback volume in percent (0 - 100)
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub volume: u32,

    /// Load text from a file into the buffer at startup
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Base URL of the OpenAI compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Directory for temporary audio files
    #[arg(long)]
    pub temp_dir: Option<PathBuf>,

    /// Maximum segment length in characters
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Validate the API key before starting
    #[arg(long)]
    pub check_key: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Перенести аргументы в конфигурацию
    pub fn apply(&self, config: &mut ReadAloudConfig) {
        config.voice = if self.random_voice {
            VoiceSelection::Random
        } else {
            self.voice
        };
        config.tts_model = self.model;
        config.volume = clamp_volume(self.volume as f32 / 100.0);
        config.api_base_url = self.api_base.clone();
        config.temp_dir = self.temp_dir.clone();
        config.chunk_size = self.chunk_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TtsVoice;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_options() {
        let cli = Cli::parse_from([
            "readaloud",
            "--voice",
            "onyx",
            "--model",
            "tts-1-hd",
            "--volume",
            "40",
            "--chunk-size",
            "1000",
        ]);
        let mut config = ReadAloudConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.voice, VoiceSelection::Fixed(TtsVoice::Onyx));
        assert_eq!(config.tts_model, TtsModel::HighDefinition);
        assert_eq!(config.volume, 0.4);
        assert_eq!(config.chunk_size, 1000);
    }

    #[test]
    fn test_random_voice() {
        let cli = Cli::parse_from(["readaloud", "--random-voice"]);
        let mut config = ReadAloudConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.voice, VoiceSelection::Random);
    }

    #[test]
    fn test_api_base_from_environment() {
        std::env::set_var("OPENAI_BASE_URL", "http://localhost:8080/v1");
        let cli = Cli::parse_from(["readaloud"]);
        std::env::remove_var("OPENAI_BASE_URL");

        let mut config = ReadAloudConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.api_base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Cli::try_parse_from(["readaloud", "--volume", "150"]).is_err());
        assert!(Cli::try_parse_from(["readaloud", "--voice", "robot"]).is_err());
    }
}
