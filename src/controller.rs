//! Состояние чтения вслух
//!
//! [`RunController`] принадлежит конвейеру воспроизведения. Интерфейс получает
//! только [`RunHandle`]: он может запросить остановку, изменить громкость и
//! прочитать состояние, но не может начать или завершить чтение сам.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::{ReadAloudError, Result};

#[derive(Debug)]
struct Shared {
    active: AtomicBool,
    had_error: AtomicBool,
    volume_bits: AtomicU32,
}

/// Привести громкость к диапазону 0.0 - 1.0
pub fn clamp_volume(level: f32) -> f32 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

/// Контроллер чтения: флаг активного чтения, громкость и флаг ошибки сессии
#[derive(Debug)]
pub struct RunController {
    shared: Arc<Shared>,
}

impl RunController {
    pub fn new(volume: f32) -> Self {
        Self {
            shared: Arc::new(Shared {
                active: AtomicBool::new(false),
                had_error: AtomicBool::new(false),
                volume_bits: AtomicU32::new(clamp_volume(volume).to_bits()),
            }),
        }
    }

    /// Получить дескриптор для интерфейса
    pub fn handle(&self) -> RunHandle {
        RunHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Отметить начало чтения. Второе одновременное чтение отклоняется.
    pub(crate) fn begin(&self) -> Result<()> {
        self.shared
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| ReadAloudError::AlreadyRunning)
    }

    pub(crate) fn finish(&self) {
        self.shared.active.store(false, Ordering::SeqCst);
    }

    pub(crate) fn record_error(&self) {
        self.shared.had_error.store(true, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.shared.volume_bits.load(Ordering::SeqCst))
    }

    pub fn had_error(&self) -> bool {
        self.shared.had_error.load(Ordering::SeqCst)
    }
}

impl Default for RunController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Дескриптор управления чтением со стороны интерфейса
#[derive(Debug, Clone)]
pub struct RunHandle {
    shared: Arc<Shared>,
}

impl RunHandle {
    /// Запросить остановку. Без активного чтения ничего не делает.
    pub fn stop(&self) -> bool {
        self.shared.active.swap(false, Ordering::SeqCst)
    }

    /// Установить громкость, значение вне диапазона обрезается
    pub fn set_volume(&self, level: f32) -> f32 {
        let level = clamp_volume(level);
        self.shared.volume_bits.store(level.to_bits(), Ordering::SeqCst);
        level
    }

    /// Установить громкость в процентах (0 - 100)
    pub fn set_volume_percent(&self, percent: u32) -> f32 {
        self.set_volume(percent as f32 / 100.0)
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.shared.volume_bits.load(Ordering::SeqCst))
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Была ли за сессию хотя бы одна ошибка чтения
    pub fn had_error(&self) -> bool {
        self.shared.had_error.load(Ordering::SeqCst)
    }
}
