//! Модуль для работы с TTS
//!
//! Этот модуль содержит интерфейс синтеза речи и его реализацию для OpenAI API.

pub mod openai;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::TtsVoice;
use crate::error::Result;

pub use openai::OpenAiSynthesizer;

/// Синтезатор речи: превращает текст сегмента в сжатое аудио (MP3)
#[async_trait(?Send)]
pub trait SpeechSynthesizer {
    /// Синтезировать речь для одного сегмента
    async fn synthesize(&self, text: &str, voice: TtsVoice) -> Result<Bytes>;
}
