// path: crates/megascan_view/src/window.rs
use serde::Serialize;

pub const DEFAULT_RADIUS: usize = 5;
pub const DEFAULT_SKIP_STEP: usize = 10;

/// Окно номеров страниц вокруг текущей, ширина не больше `2 * radius + 1`.
///
/// Окно прижимается к краям `[0, max_page]`: у левого края недостающие
/// слева страницы добавляются справа, у правого края окно обрезается.
/// Текущая страница всегда попадает в окно.
pub fn compute_window(current_page: usize, max_page: usize, radius: usize) -> Vec<usize> {
    let cur = current_page.min(max_page);

    // radius приходит из конфига и CLI без верхней границы
    let (start, end) = if max_page - cur >= radius && cur >= radius {
        (cur - radius, cur + radius)
    } else if cur < radius {
        let deficit = radius - cur;
        if max_page - cur >= radius.saturating_add(deficit) {
            (0, cur.saturating_add(radius).saturating_add(deficit))
        } else {
            (0, max_page)
        }
    } else {
        (cur - radius, max_page)
    };

    // полуинтервал может не дотянуться до текущей (cur == max_page)
    let end = end
        .min(max_page.saturating_add(1))
        .max(cur.saturating_add(1));
    (start..end).collect()
}

/// Зажать желаемую страницу в `[0, max_page]`. Выход за границы не ошибка.
pub fn navigate(target: i64, max_page: usize) -> usize {
    if target <= 0 {
        return 0;
    }
    match usize::try_from(target) {
        Ok(t) => t.min(max_page),
        Err(_) => max_page,
    }
}

pub fn skip_left(current_page: usize, max_page: usize, step: usize) -> usize {
    navigate(signed(current_page) - signed(step), max_page)
}

pub fn skip_right(current_page: usize, max_page: usize, step: usize) -> usize {
    navigate(signed(current_page).saturating_add(signed(step)), max_page)
}

fn signed(v: usize) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// Подсвечивать ли элемент как активный.
pub fn is_active<T: PartialEq + ?Sized>(item: &T, current: &T) -> bool {
    item == current
}

/// `ceil(total / limit)`; 0 для пустой выдачи.
pub fn max_page_for(total_count: u64, limit: u32) -> usize {
    if limit == 0 {
        return 0;
    }
    let pages = total_count.div_ceil(u64::from(limit));
    usize::try_from(pages).unwrap_or(usize::MAX)
}

/// Состояние пагинации для одного списка фрагментов.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub max_page: usize,
    pub window: Vec<usize>,
    #[serde(skip)]
    radius: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::with_radius(DEFAULT_RADIUS)
    }
}

impl Pagination {
    pub fn with_radius(radius: usize) -> Self {
        Self {
            current_page: 0,
            max_page: 0,
            window: compute_window(0, 0, radius),
            radius,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn set_radius(&mut self, radius: usize) {
        self.radius = radius;
        self.refresh_window();
    }

    /// Переход на страницу (с зажатием); окно пересчитывается сразу.
    pub fn go_to(&mut self, target: i64) -> usize {
        self.current_page = navigate(target, self.max_page);
        self.refresh_window();
        self.current_page
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.refresh_window();
    }

    /// Применить новый total_count после успешной загрузки.
    ///
    /// Если выдача сократилась и текущая страница оказалась за `max_page`,
    /// она зажимается на последнюю. Показанные фрагменты при этом остаются
    /// от запрошенного смещения (обычно пустые) до следующей навигации.
    pub fn update(&mut self, total_count: u64, limit: u32) {
        self.max_page = max_page_for(total_count, limit);
        self.current_page = self.current_page.min(self.max_page);
        self.refresh_window();
    }

    pub fn is_active(&self, page: usize) -> bool {
        is_active(&page, &self.current_page)
    }

    fn refresh_window(&mut self) {
        self.window = compute_window(self.current_page, self.max_page, self.radius);
    }
}
