//! Модуль для отслеживания прогресса чтения
//!
//! Этот модуль предоставляет реализацию паттерна Observer для отслеживания
//! прогресса: какой сегмент из скольких сейчас обрабатывается и на каком этапе.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Этапы обработки сегмента
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunStage {
    /// Текст разбит на сегменты, чтение началось
    Started,
    /// Запрос к сервису синтеза
    Synthesizing,
    /// Запись аудио во временный файл
    Writing,
    /// Воспроизведение
    Playing,
    /// Удаление временного файла
    Cleanup,
    /// Все сегменты прочитаны
    Completed,
    /// Чтение остановлено пользователем
    Cancelled,
    /// Чтение прервано ошибкой
    Failed,
}

impl RunStage {
    /// Получить название этапа в виде строки
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::Synthesizing => "Synthesizing",
            Self::Writing => "Writing audio",
            Self::Playing => "Playing",
            Self::Cleanup => "Cleaning up",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }

    /// Этап завершает чтение
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Информация о прогрессе чтения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressInfo {
    /// Текущий этап
    pub stage: RunStage,
    /// Номер текущего сегмента (с 1, 0 до начала обработки)
    pub segment: usize,
    /// Общее количество сегментов
    pub total: usize,
    /// Общий процент выполнения (0.0 - 100.0)
    pub total_progress: f32,
    /// Дополнительная информация
    pub details: Option<String>,
}

impl ProgressInfo {
    pub fn new(stage: RunStage, segment: usize, total: usize, details: Option<String>) -> Self {
        let total_progress = if stage == RunStage::Completed {
            100.0
        } else if total == 0 {
            0.0
        } else {
            (segment.saturating_sub(1) as f32 / total as f32 * 100.0).clamp(0.0, 100.0)
        };

        Self {
            stage,
            segment,
            total,
            total_progress,
            details,
        }
    }
}

/// Трейт для наблюдателя, получающего уведомления о прогрессе
pub trait ProgressObserver: Send + Sync {
    /// Метод, вызываемый при обновлении прогресса
    fn on_progress_update(&self, progress: ProgressInfo);
}

/// Трейт для объекта, отправляющего уведомления о прогрессе
pub trait ProgressReporter: Send + Sync {
    /// Добавить наблюдателя
    ///
    /// Возвращает уникальный идентификатор наблюдателя, который можно использовать
    /// для его удаления в будущем.
    fn add_observer(&mut self, observer: Box<dyn ProgressObserver>) -> usize;

    /// Удалить наблюдателя по идентификатору
    fn remove_observer(&mut self, id: usize) -> Option<Box<dyn ProgressObserver>>;

    /// Уведомить всех наблюдателей о прогрессе
    fn notify_progress(&self, progress: ProgressInfo);
}

/// Реализация ProgressReporter по умолчанию
pub struct DefaultProgressReporter {
    /// Список наблюдателей
    observers: RwLock<HashMap<usize, Box<dyn ProgressObserver>>>,
    /// Счетчик для генерации уникальных идентификаторов наблюдателей
    next_id: AtomicUsize,
}

impl DefaultProgressReporter {
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            next_id: AtomicUsize::new(0),
        }
    }
}

impl Default for DefaultProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for DefaultProgressReporter {
    fn add_observer(&mut self, observer: Box<dyn ProgressObserver>) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let observers = self.observers.get_mut().unwrap_or_else(PoisonError::into_inner);
        observers.insert(id, observer);
        id
    }

    fn remove_observer(&mut self, id: usize) -> Option<Box<dyn ProgressObserver>> {
        let observers = self.observers.get_mut().unwrap_or_else(PoisonError::into_inner);
        observers.remove(&id)
    }

    fn notify_progress(&self, progress: ProgressInfo) {
        let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.values() {
            observer.on_progress_update(progress.clone());
        }
    }
}

/// Трекер прогресса одного чтения
#[derive(Default)]
pub struct ProgressTracker {
    /// Репортер прогресса
    reporter: Option<Box<dyn ProgressReporter>>,
    /// (текущий сегмент, всего сегментов)
    position: Mutex<(usize, usize)>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(reporter: Box<dyn ProgressReporter>) -> Self {
        Self {
            reporter: Some(reporter),
            position: Mutex::new((0, 0)),
        }
    }

    /// Начать новое чтение из `total` сегментов
    pub fn start(&self, total: usize, details: Option<String>) {
        *self.position.lock().unwrap_or_else(PoisonError::into_inner) = (0, total);
        self.report(RunStage::Started, details);
    }

    /// Перейти к этапу для сегмента `segment`
    pub fn segment_stage(&self, segment: usize, stage: RunStage) {
        self.position.lock().unwrap_or_else(PoisonError::into_inner).0 = segment;
        self.report(stage, None);
    }

    /// Завершить чтение с итоговым этапом
    pub fn finish(&self, stage: RunStage, details: Option<String>) {
        self.report(stage, details);
    }

    fn report(&self, stage: RunStage, details: Option<String>) {
        if let Some(reporter) = &self.reporter {
            let (segment, total) = *self.position.lock().unwrap_or_else(PoisonError::into_inner);
            reporter.notify_progress(ProgressInfo::new(stage, segment, total, details));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct TestObserver {
        updates: Arc<Mutex<Vec<ProgressInfo>>>,
    }

    impl TestObserver {
        fn new() -> (Self, Arc<Mutex<Vec<ProgressInfo>>>) {
            let updates = Arc::new(Mutex::new(Vec::new()));
            (Self { updates: updates.clone() }, updates)
        }
    }

    impl ProgressObserver for TestObserver {
        fn on_progress_update(&self, progress: ProgressInfo) {
            self.updates.lock().unwrap().push(progress);
        }
    }

    #[test]
    fn test_progress_tracker() {
        let mut reporter = DefaultProgressReporter::new();
        let (observer, updates) = TestObserver::new();
        reporter.add_observer(Box::new(observer));
        let tracker = ProgressTracker::with_reporter(Box::new(reporter));

        tracker.start(4, None);
        tracker.segment_stage(3, RunStage::Playing);
        tracker.finish(RunStage::Completed, None);

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].stage, RunStage::Started);
        assert_eq!(updates[0].total, 4);
        assert_eq!(updates[1].segment, 3);
        assert_eq!(updates[1].total_progress, 50.0);
        assert_eq!(updates[2].total_progress, 100.0);
        assert!(updates[2].stage.is_terminal());
    }

    #[test]
    fn test_remove_observer() {
        let mut reporter = DefaultProgressReporter::new();
        let (observer, updates) = TestObserver::new();
        let id = reporter.add_observer(Box::new(observer));
        assert!(reporter.remove_observer(id).is_some());

        reporter.notify_progress(ProgressInfo::new(RunStage::Started, 0, 1, None));
        assert!(updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_tracker_without_reporter() {
        let tracker = ProgressTracker::new();
        tracker.start(2, None);
        tracker.segment_stage(1, RunStage::Playing);
        tracker.finish(RunStage::Completed, None);
    }
}
