//! Модуль обработки ошибок библиотеки readaloud
//!
//! Этот модуль содержит типы ошибок, которые могут возникнуть при чтении текста вслух.

use std::path::PathBuf;
use thiserror::Error;

/// Ошибки библиотеки readaloud
#[derive(Debug, Error)]
pub enum ReadAloudError {
    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка ввода-вывода
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Сервис синтеза вернул неуспешный статус
    #[error("OpenAI API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// Сервис синтеза вернул пустой ответ
    #[error("Received empty audio response")]
    EmptyAudio,

    /// Временный аудиофайл не был создан
    #[error("Temporary audio file was not created: {}", .0.display())]
    ArtifactMissing(PathBuf),

    /// Временный аудиофайл пуст
    #[error("Temporary audio file is empty: {}", .0.display())]
    ArtifactEmpty(PathBuf),

    /// Ошибка воспроизведения аудио
    #[error("Audio playback error: {0}")]
    Playback(String),

    /// Ошибка конфигурации
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Нет текста для чтения
    #[error("No text to read")]
    NoInput,

    /// Чтение уже запущено
    #[error("A read operation is already running")]
    AlreadyRunning,
}

impl ReadAloudError {
    /// Ошибка ввода пользователя, а не сбой выполнения
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NoInput | Self::AlreadyRunning)
    }

    /// Полное описание ошибки вместе с цепочкой причин
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            // Обертки #[from] уже включают текст причины в свое сообщение
            let cause_text = cause.to_string();
            if !message.contains(&cause_text) {
                message.push_str(&format!("\n  caused by: {}", cause_text));
            }
            source = cause.source();
        }
        message
    }
}

/// Тип Result для библиотеки readaloud
pub type Result<T> = std::result::Result<T, ReadAloudError>;
