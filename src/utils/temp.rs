//! Модуль для работы с временными аудиофайлами
//!
//! Каждый сегмент получает собственный файл, который удаляется вместе с
//! [`AudioArtifact`] на любом пути выхода.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::{ReadAloudError, Result};

/// Префикс имен временных файлов
pub const ARTIFACT_PREFIX: &str = "readaloud_temp";

/// Временный аудиофайл одного сегмента
#[derive(Debug)]
pub struct AudioArtifact {
    /// Путь к файлу (None после удаления)
    path: Option<TempPath>,
    /// Путь для сообщений, доступен и после удаления
    display_path: PathBuf,
    /// Размер записанных данных
    size: u64,
}

impl AudioArtifact {
    /// Записать аудио во временный файл в директории `dir`.
    ///
    /// После записи файл проверяется: он должен существовать и быть не пустым.
    pub fn write(dir: &Path, index: usize, bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("{}_{}_", ARTIFACT_PREFIX, index))
            .suffix(".mp3")
            .tempfile_in(dir)?;
        let display_path = file.path().to_path_buf();
        log::info!("Writing audio to temporary file: {}", display_path.display());

        file.write_all(bytes)?;
        file.flush()?;

        let mut artifact = Self {
            path: Some(file.into_temp_path()),
            display_path,
            size: 0,
        };
        artifact.size = artifact.verify()?;
        log::info!("Temporary file created, size: {} bytes", artifact.size);
        Ok(artifact)
    }

    /// Проверить, что файл существует и не пуст
    fn verify(&self) -> Result<u64> {
        let metadata = match std::fs::metadata(&self.display_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReadAloudError::ArtifactMissing(self.display_path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        if metadata.len() == 0 {
            return Err(ReadAloudError::ArtifactEmpty(self.display_path.clone()));
        }
        Ok(metadata.len())
    }

    pub fn path(&self) -> &Path {
        &self.display_path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Удалить файл. Ошибки удаления только логируются.
    pub fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        log::info!("Deleting temporary audio file...");
        match path.close() {
            Ok(()) => log::info!("Temporary audio file deleted."),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Temporary file no longer exists.");
            }
            Err(e) => log::warn!(
                "Could not delete temporary file {}: {}",
                self.display_path.display(),
                e
            ),
        }
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        self.cleanup();
    }
}
