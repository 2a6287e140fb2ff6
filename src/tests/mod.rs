//! Тесты конвейера чтения на подставных синтезаторе и плеере

mod test_pipeline;
