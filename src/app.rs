//! Консольный интерфейс чтения вслух
//!
//! Строки текста накапливаются в буфере, команды начинаются с `:`. Чтение
//! выполняется в том же потоке: цикл событий одновременно ждет ввод, прогресс
//! и завершение текущего чтения, поэтому `:stop` и `:volume` срабатывают
//! во время воспроизведения.

use std::io::Write;
use std::path::PathBuf;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::{TtsVoice, VoiceSelection};
use crate::controller::RunHandle;
use crate::error::{ReadAloudError, Result};
use crate::notification::format_progress;
use crate::pipeline::{PlaybackPipeline, RunOutcome};
use crate::playback::AudioPlayer;
use crate::progress::ProgressInfo;
use crate::tts::SpeechSynthesizer;

pub const HELP: &str = "\
Type or paste text; every line is added to the buffer.
Commands:
  :read            read the buffer aloud
  :stop            stop the current read
  :voice <name>    alloy, echo, fable, onyx, nova, shimmer or random
  :volume <0-100>  set the playback volume
  :show            show the buffer
  :clear           clear the buffer
  :load <file>     append a text file to the buffer
  :help            show this help
  :quit            exit";

/// Команда пользователя
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Строка текста для буфера
    Text(String),
    Read,
    Stop,
    Voice(VoiceSelection),
    Volume(u32),
    Show,
    Clear,
    Load(PathBuf),
    Help,
    Quit,
    /// Неверная команда с пояснением
    Invalid(String),
}

/// Разобрать строку ввода
pub fn parse_command(line: &str) -> Command {
    let Some(command) = line.trim_start().strip_prefix(':') else {
        return Command::Text(line.to_string());
    };

    let (name, argument) = match command.trim().split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command.trim(), ""),
    };

    match (name.to_ascii_lowercase().as_str(), argument) {
        ("read" | "r", "") => Command::Read,
        ("stop" | "s", "") => Command::Stop,
        ("show", "") => Command::Show,
        ("clear", "") => Command::Clear,
        ("help" | "h" | "?", "") => Command::Help,
        ("quit" | "q" | "exit", "") => Command::Quit,
        ("voice", "") => Command::Invalid("Usage: :voice <name>".to_string()),
        ("voice", name) => match name.parse() {
            Ok(selection) => Command::Voice(selection),
            Err(e) => Command::Invalid(e.to_string()),
        },
        ("volume", level) => match level.parse::<u32>() {
            Ok(level) if level <= 100 => Command::Volume(level),
            _ => Command::Invalid("Usage: :volume <0-100>".to_string()),
        },
        ("load", "") => Command::Invalid("Usage: :load <file>".to_string()),
        ("load", path) => Command::Load(PathBuf::from(path)),
        _ => Command::Invalid(format!("Unknown command ':{}', enter :help", command.trim())),
    }
}

type RunFuture<S, P> = LocalBoxFuture<'static, (PlaybackPipeline<S, P>, Result<RunOutcome>)>;

enum Event<S, P> {
    Line(std::io::Result<Option<String>>),
    Finished((PlaybackPipeline<S, P>, Result<RunOutcome>)),
    Progress(ProgressInfo),
    Closed,
}

/// Итог сессии
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Была ли хотя бы одна ошибка чтения
    pub had_error: bool,
}

impl SessionSummary {
    /// Код завершения процесса
    pub fn exit_code(&self) -> i32 {
        if self.had_error {
            1
        } else {
            0
        }
    }
}

/// Консольное приложение
pub struct App<S, P, W> {
    /// Конвейер, пока чтение не идет
    pipeline: Option<PlaybackPipeline<S, P>>,
    /// Текущее чтение
    running: Option<RunFuture<S, P>>,
    handle: RunHandle,
    progress: UnboundedReceiver<ProgressInfo>,
    buffer: String,
    voice: VoiceSelection,
    out: W,
    quitting: bool,
}

impl<S, P, W> App<S, P, W>
where
    S: SpeechSynthesizer + 'static,
    P: AudioPlayer + 'static,
    W: Write,
{
    pub fn new(
        pipeline: PlaybackPipeline<S, P>,
        progress: UnboundedReceiver<ProgressInfo>,
        voice: VoiceSelection,
        out: W,
    ) -> Self {
        Self {
            handle: pipeline.handle(),
            pipeline: Some(pipeline),
            running: None,
            progress,
            buffer: String::new(),
            voice,
            out,
            quitting: false,
        }
    }

    /// Добавить текст в буфер
    pub fn append_text(&mut self, text: &str) {
        self.buffer.push_str(text);
        if !text.ends_with('\n') {
            self.buffer.push('\n');
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn voice(&self) -> VoiceSelection {
        self.voice
    }

    pub fn is_reading(&self) -> bool {
        self.running.is_some()
    }

    /// Конвейер, если чтение не идет
    pub fn pipeline(&self) -> Option<&PlaybackPipeline<S, P>> {
        self.pipeline.as_ref()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Цикл событий: ввод, прогресс и завершение чтения.
    ///
    /// Заканчивается по `:quit` или концу ввода, после того как текущее
    /// чтение завершится.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> std::io::Result<SessionSummary> {
        let mut lines = input.lines();
        let mut input_open = true;

        writeln!(self.out, "Enter text to read, then :read (:help for commands).")?;

        loop {
            if (self.quitting || !input_open) && self.running.is_none() {
                break;
            }

            let event = tokio::select! {
                line = lines.next_line(), if input_open && !self.quitting => Event::Line(line),
                finished = next_finished(&mut self.running) => Event::Finished(finished),
                Some(progress) = self.progress.recv() => Event::Progress(progress),
                else => Event::Closed,
            };

            match event {
                Event::Line(Ok(Some(line))) => self.handle_command(parse_command(&line)).await?,
                Event::Line(Ok(None)) => input_open = false,
                Event::Line(Err(e)) => {
                    log::warn!("Failed to read input: {}", e);
                    input_open = false;
                }
                Event::Finished((pipeline, result)) => {
                    self.running = None;
                    self.pipeline = Some(pipeline);
                    self.drain_progress()?;
                    self.report_result(result)?;
                }
                Event::Progress(progress) => writeln!(self.out, "{}", format_progress(&progress))?,
                Event::Closed => break,
            }
            self.out.flush()?;
        }

        self.drain_progress()?;
        Ok(SessionSummary {
            had_error: self.handle.had_error(),
        })
    }

    /// Выполнить одну команду
    pub async fn handle_command(&mut self, command: Command) -> std::io::Result<()> {
        match command {
            Command::Text(line) => self.append_text(&line),
            Command::Read => self.start_reading()?,
            Command::Stop => {
                if self.running.is_some() {
                    self.handle.stop();
                    writeln!(self.out, "Stopping...")?;
                } else {
                    writeln!(self.out, "Nothing is being read.")?;
                }
            }
            Command::Voice(selection) => {
                self.voice = selection;
                writeln!(self.out, "Voice: {}", selection)?;
            }
            Command::Volume(percent) => {
                let level = self.handle.set_volume_percent(percent);
                writeln!(self.out, "Volume: {:.0}%", level * 100.0)?;
            }
            Command::Show => {
                let characters = self.buffer.trim().chars().count();
                writeln!(self.out, "{}", self.buffer.trim_end())?;
                writeln!(self.out, "({} characters)", characters)?;
            }
            Command::Clear => {
                self.buffer.clear();
                writeln!(self.out, "Buffer cleared.")?;
            }
            Command::Load(path) => match tokio::fs::read_to_string(&path).await {
                Ok(text) => {
                    self.append_text(&text);
                    writeln!(self.out, "Loaded {} characters from {}", text.chars().count(), path.display())?;
                }
                Err(e) => {
                    log::warn!("Could not read {}: {}", path.display(), e);
                    writeln!(self.out, "WARNING: could not read {}: {}", path.display(), e)?;
                }
            },
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => {
                self.quitting = true;
                if self.running.is_some() {
                    self.handle.stop();
                    writeln!(self.out, "Stopping before exit...")?;
                }
            }
            Command::Invalid(message) => writeln!(self.out, "{}", message)?,
        }
        Ok(())
    }

    /// Запустить чтение буфера, если чтение еще не идет
    fn start_reading(&mut self) -> std::io::Result<()> {
        let Some(mut pipeline) = self.pipeline.take() else {
            writeln!(self.out, "Already reading, use :stop first.")?;
            return Ok(());
        };

        let text = self.buffer.clone();
        if let Err(e) = pipeline.begin(&text) {
            self.pipeline = Some(pipeline);
            return self.report_result(Err(e));
        }

        let voice: TtsVoice = self.voice.pick();
        log::debug!("Reading {} characters", text.trim().chars().count());
        writeln!(self.out, "Reading with voice {}...", voice)?;

        let run = async move {
            let result = pipeline.run_started(&text, voice).await;
            (pipeline, result)
        };
        self.running = Some(run.boxed_local());
        Ok(())
    }

    fn report_result(&mut self, result: Result<RunOutcome>) -> std::io::Result<()> {
        match result {
            Ok(RunOutcome::Completed { .. }) => writeln!(self.out, "Finished reading."),
            Ok(RunOutcome::Cancelled { played, total }) => {
                writeln!(self.out, "Stopped after {} of {} segments.", played, total)
            }
            Err(ReadAloudError::NoInput) => {
                writeln!(self.out, "WARNING: please enter some text first.")
            }
            Err(e) if e.is_input_error() => writeln!(self.out, "WARNING: {}", e),
            Err(e) => {
                writeln!(self.out, "========================")?;
                writeln!(self.out, "ERROR: reading failed")?;
                writeln!(self.out, "Details: {}", e.report())?;
                writeln!(self.out, "========================")
            }
        }
    }

    fn drain_progress(&mut self) -> std::io::Result<()> {
        while let Ok(progress) = self.progress.try_recv() {
            writeln!(self.out, "{}", format_progress(&progress))?;
        }
        Ok(())
    }
}

/// Дождаться завершения текущего чтения; без чтения никогда не завершается
async fn next_finished<S, P>(running: &mut Option<RunFuture<S, P>>) -> (PlaybackPipeline<S, P>, Result<RunOutcome>) {
    match running {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
