//! Основной файл библиотеки readaloud
//!
//! Библиотека читает текст вслух через OpenAI TTS: текст делится на сегменты,
//! каждый сегмент синтезируется, сохраняется во временный файл и
//! воспроизводится, после чего файл удаляется. Чтение можно остановить и
//! менять громкость во время воспроизведения.

pub mod app;
pub mod chunker;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod notification;
pub mod pipeline;
pub mod playback;
pub mod progress;
pub mod tts;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::{ReadAloudConfig, TtsModel, TtsVoice, VoiceSelection};
pub use crate::controller::{RunController, RunHandle};
pub use crate::error::{ReadAloudError, Result};
pub use crate::pipeline::{PlaybackPipeline, RunOutcome};
