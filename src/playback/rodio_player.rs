//! Воспроизведение через `rodio` на устройстве вывода по умолчанию.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

use super::AudioPlayer;
use crate::controller::clamp_volume;
use crate::error::{ReadAloudError, Result};

pub struct RodioPlayer {
    /// Поток вывода rodio (должен жить, пока жив плеер)
    _stream: OutputStream,
    /// Дескриптор для создания sink
    stream_handle: OutputStreamHandle,
    /// Sink с загруженным файлом
    sink: Option<Sink>,
    /// Загруженный файл
    loaded: Option<PathBuf>,
    volume: f32,
}

impl RodioPlayer {
    /// Открыть устройство вывода по умолчанию
    pub fn new() -> Result<Self> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| ReadAloudError::Playback(e.to_string()))?;

        log::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            loaded: None,
            volume: 1.0,
        })
    }
}

impl AudioPlayer for RodioPlayer {
    fn load(&mut self, path: &Path) -> Result<()> {
        if let Some(previous) = &self.loaded {
            return Err(ReadAloudError::Playback(format!(
                "{} is still loaded",
                previous.display()
            )));
        }

        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| ReadAloudError::Playback(format!("Failed to decode {}: {}", path.display(), e)))?;

        let sink =
            Sink::try_new(&self.stream_handle).map_err(|e| ReadAloudError::Playback(e.to_string()))?;
        // Загружаем на паузе, запуск через play()
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(source);

        self.sink = Some(sink);
        self.loaded = Some(path.to_path_buf());
        log::debug!("Loaded {}", path.display());
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        match &self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(ReadAloudError::Playback("No audio file loaded".to_string())),
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.stop();
            log::debug!("Audio playback stopped");
        }
    }

    fn unload(&mut self) {
        // Удаление sink закрывает файл
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded = None;
    }

    fn set_volume(&mut self, level: f32) {
        self.volume = clamp_volume(level);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn is_busy(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        self.unload();
    }
}
