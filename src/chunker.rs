//! Разбиение текста на сегменты для TTS
//!
//! OpenAI ограничивает длину входного текста, поэтому длинный текст
//! читается по частям. Разбиение чисто позиционное: границы слов и
//! предложений не учитываются, длина считается в символах.

use crate::error::{ReadAloudError, Result};

/// Сегмент текста для синтеза
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Номер сегмента, начиная с 1
    pub index: usize,
    /// Общее количество сегментов
    pub total: usize,
    /// Текст сегмента
    pub text: &'a str,
}

/// Разбиение текста на сегменты ограниченной длины.
///
/// Каждый вызов [`Chunker::segments`] начинает обход заново.
#[derive(Debug, Clone, Copy)]
pub struct Chunker<'a> {
    text: &'a str,
    limit: usize,
}

impl<'a> Chunker<'a> {
    pub fn new(text: &'a str, limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(ReadAloudError::Configuration(
                "Chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { text, limit })
    }

    /// Количество сегментов
    pub fn len(&self) -> usize {
        self.text.chars().count().div_ceil(self.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Ленивый обход сегментов по порядку
    pub fn segments(&self) -> Segments<'a> {
        Segments {
            rest: self.text,
            limit: self.limit,
            next_index: 1,
            total: self.len(),
        }
    }
}

impl<'a> IntoIterator for Chunker<'a> {
    type Item = Segment<'a>;
    type IntoIter = Segments<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments()
    }
}

/// Итератор по сегментам
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    rest: &'a str,
    limit: usize,
    next_index: usize,
    total: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        // Граница сегмента всегда на границе символа
        let split_at = self
            .rest
            .char_indices()
            .nth(self.limit)
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());
        let (text, rest) = self.rest.split_at(split_at);
        self.rest = rest;

        let segment = Segment {
            index: self.next_index,
            total: self.total,
            text,
        };
        self.next_index += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total + 1 - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Segments<'_> {}

/// Обрезать пробелы и отклонить пустой ввод
pub fn prepare_input(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ReadAloudError::NoInput);
    }
    Ok(trimmed)
}
