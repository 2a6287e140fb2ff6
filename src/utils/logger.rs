//! Настройка логирования
//!
//! Лог пишется в stderr, чтобы не смешиваться с выводом консоли.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Фильтр по умолчанию, если RUST_LOG не задан
pub const DEFAULT_FILTER: &str = "warn,readaloud=info";

/// Инициализировать логгер; `verbose` включает debug для readaloud
pub fn init_logger(verbose: bool) {
    // Установка базового фильтра и переопределение через переменные окружения
    let default_filter = if verbose { "warn,readaloud=debug" } else { DEFAULT_FILTER };
    let env = Env::default().filter_or("RUST_LOG", default_filter);

    let mut builder = Builder::from_env(env);

    // Явно подавляем логи от определенных модулей
    builder
        .filter_module("hyper", LevelFilter::Error)
        .filter_module("mio", LevelFilter::Error)
        .filter_module("symphonia", LevelFilter::Warn)
        // Форматирование логов
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}: {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Stderr)
        .init();
}
