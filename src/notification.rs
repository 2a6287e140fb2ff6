//! Модуль для реализации системы уведомлений
//!
//! Этот модуль предоставляет конкретные реализации наблюдателей для
//! системы прогресса.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::progress::{ProgressInfo, ProgressObserver};

/// Наблюдатель, сохраняющий информацию о прогрессе в памяти.
///
/// Клоны разделяют одну историю.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressObserver {
    /// История обновлений прогресса
    history: Arc<Mutex<Vec<ProgressInfo>>>,
}

impl MemoryProgressObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Получить историю обновлений прогресса
    pub fn history(&self) -> Vec<ProgressInfo> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Очистить историю обновлений прогресса
    pub fn clear_history(&self) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl ProgressObserver for MemoryProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(progress);
    }
}

/// Наблюдатель, отправляющий информацию о прогрессе через канал
pub struct ChannelProgressObserver {
    /// Отправитель для канала
    sender: mpsc::UnboundedSender<ProgressInfo>,
}

impl ChannelProgressObserver {
    pub fn new(sender: mpsc::UnboundedSender<ProgressInfo>) -> Self {
        Self { sender }
    }

    /// Создать наблюдателя вместе с приемником
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressInfo>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl ProgressObserver for ChannelProgressObserver {
    fn on_progress_update(&self, progress: ProgressInfo) {
        if self.sender.send(progress).is_err() {
            log::debug!("Progress receiver dropped");
        }
    }
}

/// Строка индикатора прогресса для интерфейса
pub fn format_progress(progress: &ProgressInfo) -> String {
    let mut line = if progress.segment == 0 {
        format!("[{:>5.1}%] {}", progress.total_progress, progress.stage.as_str())
    } else {
        format!(
            "[{:>5.1}%] segment {} of {}: {}",
            progress.total_progress,
            progress.segment,
            progress.total,
            progress.stage.as_str()
        )
    };
    if let Some(details) = &progress.details {
        line.push_str(" (");
        line.push_str(details);
        line.push(')');
    }
    line
}
