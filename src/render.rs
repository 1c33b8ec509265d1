use std::fmt::Write;

use megascan_view::window::Pagination;
use megascan_view::{Fragment, Segment};
use reviewer::api::Settings;
use reviewer::FragmentStore;
use tracing::warn;

/// Как выделять подсвеченные сегменты в терминале.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Жирный жёлтый через ANSI escape-коды.
    Ansi,
    /// `[совпадение]`, для логов и не-tty вывода.
    Brackets,
}

impl Style {
    fn open(self) -> &'static str {
        match self {
            Style::Ansi => "\x1b[1;33m",
            Style::Brackets => "[",
        }
    }

    fn close(self) -> &'static str {
        match self {
            Style::Ansi => "\x1b[0m",
            Style::Brackets => "]",
        }
    }
}

pub fn render_segments(segments: &[Segment<'_>], style: Style) -> String {
    let mut out = String::new();
    for s in segments {
        if s.is_highlight() {
            out.push_str(style.open());
            out.push_str(s.text);
            out.push_str(style.close());
        } else {
            out.push_str(s.text);
        }
    }
    out
}

/// Текст фрагмента с подсветкой. Битые границы не валят список:
/// фрагмент выводится как есть, без подсветки.
pub fn render_fragment(fragment: &Fragment, style: Style) -> String {
    match fragment.segments() {
        Ok(segs) => render_segments(&segs, style),
        Err(err) => {
            warn!(id = %fragment.id, error = %err, "malformed boundaries, showing plain text");
            fragment.text.clone()
        }
    }
}

/// Строка пагинатора: `<< < 0 1 [2] 3 > >>`.
pub fn render_pager(p: &Pagination) -> String {
    let mut out = String::from("<< <");
    for &page in &p.window {
        if p.is_active(page) {
            let _ = write!(out, " [{page}]");
        } else {
            let _ = write!(out, " {page}");
        }
    }
    let _ = write!(out, " > >>  (last: {})", p.max_page);
    out
}

/// Полный экран: заголовок фильтра, фрагменты с id, пагинатор.
pub fn render_page(store: &FragmentStore, style: Style) -> String {
    let filter = store.filter();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} / {} (limit {}) ==",
        store.page_type(),
        filter.status,
        filter.limit
    );
    if store.fragments().is_empty() {
        out.push_str("(no fragments)\n");
    }
    for f in store.fragments() {
        let _ = writeln!(out, "--- #{} ---", f.id);
        out.push_str(&render_fragment(f, style));
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(&render_pager(store.pagination()));
    out.push('\n');
    out
}

pub fn render_settings(settings: &Settings) -> anyhow::Result<String> {
    let masked = settings.masked();
    Ok(serde_json::to_string_pretty(&masked)?)
}
