// path: crates/megascan_view/src/model.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::segment::{byte_offsets, segment, MalformedBoundaries, Segment};

/// Ошибки разбора фильтров/вердиктов из текстового ввода (CLI, env, REPL).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown status {0:?} (expected new|closed)")]
    UnknownStatus(String),
    #[error("unknown page type {0:?} (expected github|gist)")]
    UnknownPageType(String),
    #[error("unsupported limit {0} (allowed: 10, 20, 50, 100)")]
    UnsupportedLimit(u32),
    #[error("invalid limit {0:?}")]
    InvalidLimit(String),
    #[error("unknown verdict {0:?} (expected 0|1|2 or info|close|verify)")]
    UnknownVerdict(String),
}

/// Внешний id фрагмента. Бэкенд отдаёт int, но допускаем и строки.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FragmentId {
    Num(i64),
    Text(String),
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentId::Num(n) => write!(f, "{n}"),
            FragmentId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FragmentId {
    fn from(n: i64) -> Self {
        FragmentId::Num(n)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        FragmentId::Text(s.to_string())
    }
}

impl FromStr for FragmentId {
    type Err = Infallible;

    /// "42" -> Num(42), всё остальное -> Text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>()
            .map(FragmentId::Num)
            .unwrap_or_else(|_| FragmentId::Text(s.to_string())))
    }
}

/// Один фрагмент текста, найденный сканером, с границами совпадений.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: FragmentId,
    pub text: String,
    /// Пары байтовых смещений [start, end) подряд: [s0, e0, s1, e1, ...].
    /// Хранятся как пришли, проверяются при разбиении на сегменты.
    #[serde(rename = "ids", default, deserialize_with = "null_as_empty")]
    pub boundaries: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shahash: Option<String>,
}

impl Fragment {
    pub fn new(id: impl Into<FragmentId>, text: impl Into<String>, boundaries: Vec<i64>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            boundaries,
            report_id: None,
            reject_id: None,
            shahash: None,
        }
    }

    pub fn segments(&self) -> Result<Vec<Segment<'_>>, MalformedBoundaries> {
        let offsets = byte_offsets(&self.boundaries)?;
        segment(&self.text, &offsets)
    }
}

// бэкенд на Go сериализует пустой слайс как null
fn null_as_empty<'de, D>(d: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<i64>>::deserialize(d)?.unwrap_or_default())
}

/// Решение ревьюера по фрагменту. Коды совпадают с кодами действий UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Info = 0,
    Close = 1,
    Verify = 2,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Info, Verdict::Close, Verdict::Verify];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Info => "info",
            Verdict::Close => "close",
            Verdict::Verify => "verify",
        }
    }
}

impl TryFrom<u8> for Verdict {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Verdict::Info),
            1 => Ok(Verdict::Close),
            2 => Ok(Verdict::Verify),
            other => Err(FilterError::UnknownVerdict(other.to_string())),
        }
    }
}

impl FromStr for Verdict {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u8>() {
            return Verdict::try_from(code);
        }
        match s.to_ascii_lowercase().as_str() {
            "info" | "i" => Ok(Verdict::Info),
            "close" | "c" => Ok(Verdict::Close),
            "verify" | "v" => Ok(Verdict::Verify),
            _ => Err(FilterError::UnknownVerdict(s.to_string())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Статус отчётов, по которому фильтруется выдача.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    New,
    Closed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Closed => "closed",
        }
    }
}

impl FromStr for Status {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Status::New),
            "closed" => Ok(Status::Closed),
            _ => Err(FilterError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Источник результатов сканирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    #[default]
    Github,
    Gist,
}

impl PageType {
    pub fn as_str(self) -> &'static str {
        match self {
            PageType::Github => "github",
            PageType::Gist => "gist",
        }
    }
}

impl FromStr for PageType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(PageType::Github),
            "gist" => Ok(PageType::Gist),
            _ => Err(FilterError::UnknownPageType(s.to_string())),
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Размер страницы; допустим только фиксированный набор значений.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageLimit(u32);

impl PageLimit {
    pub const ALLOWED: [u32; 4] = [10, 20, 50, 100];

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = PageLimit> {
        Self::ALLOWED.into_iter().map(PageLimit)
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        PageLimit(10)
    }
}

impl TryFrom<u32> for PageLimit {
    type Error = FilterError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&v) {
            Ok(PageLimit(v))
        } else {
            Err(FilterError::UnsupportedLimit(v))
        }
    }
}

impl From<PageLimit> for u32 {
    fn from(l: PageLimit) -> u32 {
        l.0
    }
}

impl FromStr for PageLimit {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v: u32 = s
            .trim()
            .parse()
            .map_err(|_| FilterError::InvalidLimit(s.to_string()))?;
        PageLimit::try_from(v)
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Текущий фильтр выдачи.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterState {
    pub status: Status,
    pub limit: PageLimit,
}

impl FilterState {
    pub fn new(status: Status, limit: PageLimit) -> Self {
        Self { status, limit }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={} limit={}", self.status, self.limit)
    }
}
