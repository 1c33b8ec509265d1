// path: crates/megascan_view/src/segment.rs
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Highlight,
}

/// Кусок текста фрагмента для вывода: обычный или подсвеченный.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

impl<'a> Segment<'a> {
    pub fn plain(text: &'a str) -> Self {
        Self {
            kind: SegmentKind::Plain,
            text,
        }
    }

    pub fn highlight(text: &'a str) -> Self {
        Self {
            kind: SegmentKind::Highlight,
            text,
        }
    }

    pub fn is_highlight(&self) -> bool {
        self.kind == SegmentKind::Highlight
    }
}

/// Границы подсветки нарушают инварианты; такой фрагмент не рендерим частично.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedBoundaries {
    #[error("odd number of boundaries: {count}")]
    OddCount { count: usize },
    #[error("boundary #{index} = {value} is past the end of text (len {len})")]
    OutOfRange { index: usize, value: usize, len: usize },
    #[error("boundary #{index} = {value} goes backwards (previous {prev})")]
    NotMonotonic { index: usize, value: usize, prev: usize },
    #[error("boundary #{index} = {value} splits a UTF-8 char")]
    NotCharBoundary { index: usize, value: usize },
    #[error("boundary #{index} = {value} is negative")]
    Negative { index: usize, value: i64 },
}

/// Смещения в том виде, как их прислал бэкенд, в байтовые индексы.
/// Отрицательное значение ломает только этот фрагмент.
pub fn byte_offsets(raw: &[i64]) -> Result<Vec<usize>, MalformedBoundaries> {
    raw.iter()
        .enumerate()
        .map(|(index, &value)| {
            if value < 0 {
                return Err(MalformedBoundaries::Negative { index, value });
            }
            // не влезло в usize: отсечётся проверкой диапазона
            Ok(usize::try_from(value).unwrap_or(usize::MAX))
        })
        .collect()
}

/// Проверка: чётная длина, неубывание, все смещения в [0, len] и на границах символов.
pub fn validate(text: &str, boundaries: &[usize]) -> Result<(), MalformedBoundaries> {
    if boundaries.len() % 2 != 0 {
        return Err(MalformedBoundaries::OddCount {
            count: boundaries.len(),
        });
    }
    let mut prev = 0usize;
    for (index, &value) in boundaries.iter().enumerate() {
        if value > text.len() {
            return Err(MalformedBoundaries::OutOfRange {
                index,
                value,
                len: text.len(),
            });
        }
        if value < prev {
            return Err(MalformedBoundaries::NotMonotonic { index, value, prev });
        }
        if !text.is_char_boundary(value) {
            return Err(MalformedBoundaries::NotCharBoundary { index, value });
        }
        prev = value;
    }
    Ok(())
}

/// Разбить `text` на чередующиеся Plain/Highlight сегменты по парам смещений.
///
/// Первый и последний сегменты всегда Plain (могут быть пустыми), склейка
/// всех сегментов даёт исходный текст.
pub fn segment<'a>(
    text: &'a str,
    boundaries: &[usize],
) -> Result<Vec<Segment<'a>>, MalformedBoundaries> {
    if boundaries.is_empty() {
        return Ok(vec![Segment::plain(text)]);
    }
    validate(text, boundaries)?;

    let mut out = Vec::with_capacity(boundaries.len() + 1);
    out.push(Segment::plain(&text[..boundaries[0]]));
    for (pair_no, pair) in boundaries.chunks_exact(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        out.push(Segment::highlight(&text[start..end]));
        // промежуток до следующей пары
        if let Some(&next) = boundaries.get(2 * pair_no + 2) {
            out.push(Segment::plain(&text[end..next]));
        }
    }
    let last = boundaries[boundaries.len() - 1];
    out.push(Segment::plain(&text[last..]));
    Ok(out)
}
