use anyhow::Context;
use clap::Parser;
use log::{error, info};

use readaloud::app::App;
use readaloud::cli::Cli;
use readaloud::config::ReadAloudConfig;
use readaloud::error::ReadAloudError;
use readaloud::notification::ChannelProgressObserver;
use readaloud::pipeline::PlaybackPipeline;
use readaloud::playback::RodioPlayer;
use readaloud::progress::{DefaultProgressReporter, ProgressReporter, ProgressTracker};
use readaloud::tts::OpenAiSynthesizer;
use readaloud::utils::logger::init_logger;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env читается до аргументов: из него берутся OPENAI_BASE_URL и RUST_LOG
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Инициализируем логгер с тонкой настройкой
    init_logger(cli.verbose);

    let mut config = match ReadAloudConfig::from_env() {
        Ok(config) => config,
        Err(e) => fail_startup(&e),
    };
    cli.apply(&mut config);
    if let Err(e) = config.validate() {
        fail_startup(&e);
    }

    let synthesizer = OpenAiSynthesizer::new(&config)?;
    if cli.check_key {
        info!("Validating API key...");
        synthesizer
            .validate_api_key()
            .await
            .context("API key validation failed")?;
        info!("API key is valid.");
    }

    // Без аудиоустройства читать некуда
    let player = match RodioPlayer::new() {
        Ok(player) => player,
        Err(e) => {
            error!("Failed to initialize audio output: {}", e);
            eprintln!("ERROR: no audio output available: {}", e);
            std::process::exit(1);
        }
    };

    let (observer, progress) = ChannelProgressObserver::channel();
    let mut reporter = DefaultProgressReporter::new();
    reporter.add_observer(Box::new(observer));
    let pipeline = PlaybackPipeline::new(&config, synthesizer, player)
        .with_tracker(ProgressTracker::with_reporter(Box::new(reporter)));

    let mut app = App::new(pipeline, progress, config.voice, std::io::stdout());
    if let Some(path) = &cli.file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!("Loaded {} characters from {}", text.chars().count(), path.display());
        app.append_text(&text);
    }

    let summary = app
        .run(tokio::io::BufReader::new(tokio::io::stdin()))
        .await
        .context("Console input failed")?;

    drop(app);
    let code = summary.exit_code();
    if code != 0 {
        error!("At least one read operation failed during this session.");
    }
    info!("Exiting.");
    std::process::exit(code);
}

/// Ошибка запуска: сообщить и выйти с кодом 1
fn fail_startup(e: &ReadAloudError) -> ! {
    error!("{}", e);
    eprintln!("ERROR: {}", e);
    std::process::exit(1);
}
