//! Чистая часть ревьюера: модель фрагментов, разбиение текста на
//! подсвеченные сегменты и окно пагинации.

pub mod model;
pub mod segment;
pub mod window;

pub use model::{FilterError, FilterState, Fragment, FragmentId, PageLimit, PageType, Status, Verdict};
pub use segment::{byte_offsets, segment, MalformedBoundaries, Segment, SegmentKind};
pub use window::{compute_window, navigate, Pagination};
