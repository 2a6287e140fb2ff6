//! Модуль конфигурации библиотеки readaloud
//!
//! Этот модуль содержит структуры и перечисления для настройки чтения вслух.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{ReadAloudError, Result};

/// Переменная окружения с API ключом OpenAI
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Максимальная длина сегмента в символах
pub const DEFAULT_CHUNK_SIZE: usize = 4000;

/// Базовый адрес OpenAI API
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Модель TTS для использования с OpenAI API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TtsModel {
    /// Стандартная модель
    #[default]
    Standard,
    /// Модель высокого качества
    HighDefinition,
}

impl TtsModel {
    /// Получить строковое представление модели
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "tts-1",
            Self::HighDefinition => "tts-1-hd",
        }
    }
}

impl FromStr for TtsModel {
    type Err = ReadAloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tts-1" | "standard" => Ok(Self::Standard),
            "tts-1-hd" | "hd" => Ok(Self::HighDefinition),
            other => Err(ReadAloudError::Configuration(format!("Unknown TTS model: {}", other))),
        }
    }
}

impl fmt::Display for TtsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Голос для использования с OpenAI API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TtsVoice {
    /// Голос Alloy
    Alloy,
    /// Голос Echo
    Echo,
    /// Голос Fable
    Fable,
    /// Голос Onyx
    Onyx,
    /// Голос Nova
    #[default]
    Nova,
    /// Голос Shimmer
    Shimmer,
}

impl TtsVoice {
    /// Все доступные голоса
    pub const ALL: [TtsVoice; 6] = [
        Self::Alloy,
        Self::Echo,
        Self::Fable,
        Self::Onyx,
        Self::Nova,
        Self::Shimmer,
    ];

    /// Получить строковое представление голоса
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }

    /// Случайный голос из доступных
    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&Self::default())
    }
}

impl FromStr for TtsVoice {
    type Err = ReadAloudError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|voice| voice.as_str() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                ReadAloudError::Configuration(format!(
                    "Unknown voice '{}', expected one of: {}",
                    name,
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for TtsVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Как выбирается голос для очередного чтения
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VoiceSelection {
    /// Голос, выбранный пользователем
    Fixed(TtsVoice),
    /// Случайный голос на каждое чтение
    Random,
}

impl Default for VoiceSelection {
    fn default() -> Self {
        Self::Fixed(TtsVoice::default())
    }
}

impl VoiceSelection {
    /// Определить голос на одно чтение
    pub fn pick(&self) -> TtsVoice {
        match self {
            Self::Fixed(voice) => *voice,
            Self::Random => TtsVoice::random(),
        }
    }
}

impl FromStr for VoiceSelection {
    type Err = ReadAloudError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("random") {
            Ok(Self::Random)
        } else {
            s.parse().map(Self::Fixed)
        }
    }
}

impl fmt::Display for VoiceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(voice) => write!(f, "{}", voice),
            Self::Random => f.write_str("random"),
        }
    }
}

/// Конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadAloudConfig {
    /// API ключ для OpenAI
    pub openai_api_key: String,
    /// Базовый адрес API
    pub api_base_url: String,
    /// Модель TTS
    pub tts_model: TtsModel,
    /// Выбор голоса
    pub voice: VoiceSelection,
    /// Начальная громкость (0.0 - 1.0)
    pub volume: f32,
    /// Максимальная длина сегмента в символах
    pub chunk_size: usize,
    /// Интервал опроса плеера во время воспроизведения
    #[serde(with = "millis")]
    pub poll_interval: Duration,
    /// Директория для временных аудиофайлов (по умолчанию системная)
    pub temp_dir: Option<PathBuf>,
}

impl Default for ReadAloudConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            tts_model: TtsModel::default(),
            voice: VoiceSelection::default(),
            volume: 1.0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            poll_interval: Duration::from_millis(100),
            temp_dir: None,
        }
    }
}

impl ReadAloudConfig {
    /// Загрузить API ключ из окружения.
    ///
    /// Файл `.env` должен быть загружен заранее, до разбора аргументов.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = std::env::var(API_KEY_ENV).unwrap_or_default();
        let config = Self {
            openai_api_key,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Проверить согласованность настроек
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(ReadAloudError::Configuration(format!(
                "No OpenAI API key found, please set the {} environment variable",
                API_KEY_ENV
            )));
        }
        if self.chunk_size == 0 {
            return Err(ReadAloudError::Configuration(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Директория для временных файлов
    pub fn artifact_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
