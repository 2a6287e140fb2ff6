//! Воспроизведение аудиофайлов
//!
//! [`AudioPlayer`] повторяет модель простого плеера: загрузить файл,
//! запустить, опрашивать занятость, остановить и выгрузить. Новый файл можно
//! загрузить только после выгрузки предыдущего.

pub mod rodio_player;

use std::path::Path;

use crate::error::Result;

pub use rodio_player::RodioPlayer;

/// Локальный аудиоплеер
pub trait AudioPlayer {
    /// Загрузить файл. Ошибка, если предыдущий файл еще не выгружен.
    fn load(&mut self, path: &Path) -> Result<()>;

    /// Начать воспроизведение загруженного файла
    fn play(&mut self) -> Result<()>;

    /// Остановить воспроизведение
    fn stop(&mut self);

    /// Освободить загруженный файл
    fn unload(&mut self);

    /// Громкость 0.0 - 1.0, действует сразу
    fn set_volume(&mut self, level: f32);

    /// Идет ли воспроизведение
    fn is_busy(&self) -> bool;
}
