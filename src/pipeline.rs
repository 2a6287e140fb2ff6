//! Конвейер чтения вслух
//!
//! Для каждого сегмента по порядку: синтез, запись во временный файл,
//! воспроизведение до конца или до остановки, удаление файла. Остановка
//! проверяется перед синтезом, после синтеза и во время ожидания
//! воспроизведения. Любая ошибка синтеза или записи прерывает все чтение.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::chunker::{prepare_input, Chunker};
use crate::config::{ReadAloudConfig, TtsVoice};
use crate::controller::{RunController, RunHandle};
use crate::error::Result;
use crate::playback::AudioPlayer;
use crate::progress::{ProgressTracker, RunStage};
use crate::tts::SpeechSynthesizer;
use crate::utils::temp::AudioArtifact;

/// Результат чтения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Все сегменты прочитаны
    Completed { segments: usize },
    /// Чтение остановлено: `played` сегментов прозвучали полностью
    Cancelled { played: usize, total: usize },
}

pub struct PlaybackPipeline<S, P> {
    synthesizer: S,
    player: P,
    controller: RunController,
    tracker: ProgressTracker,
    chunk_size: usize,
    artifact_dir: PathBuf,
    poll_interval: Duration,
}

impl<S: SpeechSynthesizer, P: AudioPlayer> PlaybackPipeline<S, P> {
    pub fn new(config: &ReadAloudConfig, synthesizer: S, player: P) -> Self {
        Self {
            synthesizer,
            player,
            controller: RunController::new(config.volume),
            tracker: ProgressTracker::new(),
            chunk_size: config.chunk_size,
            artifact_dir: config.artifact_dir(),
            poll_interval: config.poll_interval,
        }
    }

    /// Подключить трекер прогресса
    pub fn with_tracker(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Дескриптор для остановки и громкости
    pub fn handle(&self) -> RunHandle {
        self.controller.handle()
    }

    pub fn controller(&self) -> &RunController {
        &self.controller
    }

    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Прочитать текст вслух одним голосом.
    ///
    /// Пустой текст отклоняется до любого запроса к сервису. Пока чтение
    /// идет, повторный вызов возвращает [`crate::error::ReadAloudError::AlreadyRunning`].
    pub async fn run(&mut self, text: &str, voice: TtsVoice) -> Result<RunOutcome> {
        self.begin(text)?;
        self.run_started(text, voice).await
    }

    /// Проверить ввод и отметить чтение активным.
    ///
    /// Остановка, запрошенная после `begin`, но до начала обработки,
    /// отменяет чтение до первого запроса к сервису.
    ///
    /// Каждый успешный `begin` должен завершаться вызовом
    /// [`PlaybackPipeline::run_started`], который снимает флаг активности.
    pub(crate) fn begin(&self, text: &str) -> Result<()> {
        let text = prepare_input(text).inspect_err(|_| {
            log::warn!("No text to read was entered.");
        })?;
        Chunker::new(text, self.chunk_size)?;
        self.controller.begin()
    }

    /// Выполнить чтение, начатое через [`PlaybackPipeline::begin`]
    pub(crate) async fn run_started(&mut self, text: &str, voice: TtsVoice) -> Result<RunOutcome> {
        log::info!("Starting read operation...");
        let chunk_size = self.chunk_size;
        let result = match prepare_input(text).and_then(|text| Chunker::new(text, chunk_size)) {
            Ok(chunker) => self.run_segments(chunker, voice).await,
            Err(e) => Err(e),
        };
        self.controller.finish();

        match &result {
            Ok(RunOutcome::Completed { segments }) => {
                log::info!("Read operation completed ({} segments).", segments);
                self.tracker.finish(RunStage::Completed, None);
            }
            Ok(RunOutcome::Cancelled { played, total }) => {
                log::info!("Read operation stopped after {} of {} segments.", played, total);
                self.tracker.finish(RunStage::Cancelled, None);
            }
            Err(e) => {
                self.controller.record_error();
                log::error!("Read operation aborted: {}", e.report());
                self.tracker.finish(RunStage::Failed, Some(e.to_string()));
            }
        }
        result
    }

    async fn run_segments(&mut self, chunker: Chunker<'_>, voice: TtsVoice) -> Result<RunOutcome> {
        let total = chunker.len();
        log::info!("Text split into {} segments.", total);
        log::info!("Selected voice: {}", voice);
        self.tracker.start(total, Some(format!("voice {}", voice)));

        let mut played = 0;
        for segment in chunker.segments() {
            if !self.controller.is_active() {
                log::info!("Stop requested, skipping remaining segments.");
                return Ok(RunOutcome::Cancelled { played, total });
            }

            log::info!("Processing segment {} of {}...", segment.index, total);
            self.tracker.segment_stage(segment.index, RunStage::Synthesizing);
            let audio = self.synthesizer.synthesize(segment.text, voice).await?;

            self.tracker.segment_stage(segment.index, RunStage::Writing);
            let mut artifact = AudioArtifact::write(&self.artifact_dir, segment.index, &audio)?;

            if !self.controller.is_active() {
                log::info!("Stop requested, segment {} will not be played.", segment.index);
                self.tracker.segment_stage(segment.index, RunStage::Cleanup);
                artifact.cleanup();
                return Ok(RunOutcome::Cancelled { played, total });
            }

            self.tracker.segment_stage(segment.index, RunStage::Playing);
            let finished = play_to_end(
                &mut self.player,
                &self.controller,
                self.poll_interval,
                artifact.path(),
            )
            .await;

            self.tracker.segment_stage(segment.index, RunStage::Cleanup);
            artifact.cleanup();

            if !finished? {
                return Ok(RunOutcome::Cancelled { played, total });
            }
            played += 1;
        }

        Ok(RunOutcome::Completed { segments: total })
    }
}

/// Загруженный в плеер файл; при выходе из области видимости плеер
/// останавливается и освобождает файл.
struct LoadedAudio<'a, P: AudioPlayer> {
    player: &'a mut P,
}

impl<P: AudioPlayer> Drop for LoadedAudio<'_, P> {
    fn drop(&mut self) {
        self.player.stop();
        self.player.unload();
    }
}

/// Воспроизвести файл и дождаться конца, опрашивая плеер.
///
/// Возвращает `false`, если воспроизведение прервано остановкой.
async fn play_to_end<P: AudioPlayer>(
    player: &mut P,
    controller: &RunController,
    poll_interval: Duration,
    path: &Path,
) -> Result<bool> {
    let mut loaded = LoadedAudio { player };

    log::info!("Loading audio file...");
    loaded.player.load(path)?;
    let mut volume = controller.volume();
    loaded.player.set_volume(volume);

    log::info!("Starting playback...");
    loaded.player.play()?;

    while loaded.player.is_busy() {
        if !controller.is_active() {
            log::info!("Stop requested, halting playback.");
            loaded.player.stop();
            return Ok(false);
        }

        let requested = controller.volume();
        if requested != volume {
            log::debug!("Volume changed to {:.2}", requested);
            loaded.player.set_volume(requested);
            volume = requested;
        }

        // Отдаем управление циклу событий
        tokio::time::sleep(poll_interval).await;
    }

    Ok(true)
}
