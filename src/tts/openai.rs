//! Модуль для интеграции с OpenAI API
//!
//! Запросы к `audio/speech` выполняются строго по одному.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::SpeechSynthesizer;
use crate::config::{ReadAloudConfig, TtsModel, TtsVoice};
use crate::error::{ReadAloudError, Result};

/// Клиент OpenAI TTS
#[derive(Debug, Clone)]
pub struct OpenAiSynthesizer {
    client: Client,
    api_key: String,
    base_url: String,
    model: TtsModel,
}

impl OpenAiSynthesizer {
    /// Создает новый клиент OpenAI TTS
    pub fn new(config: &ReadAloudConfig) -> Result<Self> {
        if config.openai_api_key.trim().is_empty() {
            log::error!("OpenAI API key is empty");
            return Err(ReadAloudError::Configuration(
                "OpenAI API key is required for TTS generation".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.tts_model,
        })
    }

    fn speech_url(&self) -> String {
        format!("{}/audio/speech", self.base_url)
    }

    /// Проверка API ключа тестовым запросом к списку моделей
    pub async fn validate_api_key(&self) -> Result<()> {
        log::info!("Validating OpenAI API key...");
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to validate OpenAI API key: {}", e);
                ReadAloudError::Configuration(format!("Failed to validate OpenAI API key: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = read_error_body(response).await;
            log::error!("OpenAI API key validation failed (status {}): {}", status, error_text);
            return Err(ReadAloudError::Configuration(format!(
                "Invalid OpenAI API key: {} (status {})",
                error_text, status
            )));
        }

        log::info!("OpenAI API key validated successfully");
        Ok(())
    }
}

#[async_trait(?Send)]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str, voice: TtsVoice) -> Result<Bytes> {
        log::info!("Sending request to OpenAI TTS API...");
        log::debug!(
            "Model: {}, voice: {}, input: {} characters",
            self.model,
            voice,
            text.chars().count()
        );

        let response = self
            .client
            .post(self.speech_url())
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model.as_str(),
                "voice": voice.as_str(),
                "input": text,
                "response_format": "mp3",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_body(response).await;
            log::error!("OpenAI API error (status {}): {}", status, message);
            return Err(ReadAloudError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            log::error!("Received empty audio response from OpenAI");
            return Err(ReadAloudError::EmptyAudio);
        }

        log::info!("Received audio response from OpenAI ({} bytes).", bytes.len());
        Ok(bytes)
    }
}

/// Достать сообщение об ошибке из тела ответа
async fn read_error_body(response: reqwest::Response) -> String {
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return format!("Failed to read error response: {}", e),
    };

    // OpenAI отвечает {"error": {"message": ...}}
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or(text)
}
