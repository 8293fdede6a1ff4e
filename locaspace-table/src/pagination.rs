use serde::{Deserialize, Serialize};

/// One clickable control of the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "page", rename_all = "lowercase")]
pub enum PageItem {
    Page(usize),
    Gap,
}

pub fn total_pages(items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return if items == 0 { 0 } else { 1 };
    }
    items.div_ceil(page_size)
}

/// Page controls around `current`: a window of two pages on each side,
/// with the first and last pages always present and the rest collapsed
/// into gaps.
///
/// The window is `max(2, current - 2) ..= min(total - 1, current + 2)`. A gap
/// follows page 1 when the window starts after 2, and precedes the last page
/// when it ends before `total - 1`.
pub fn visible_pages(current: usize, total: usize) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }

    let window_start = current.saturating_sub(2).max(2);
    let window_end = (current + 2).min(total.saturating_sub(1));

    let mut pages = vec![PageItem::Page(1)];
    if window_start <= window_end {
        if window_start > 2 {
            pages.push(PageItem::Gap);
        }
        pages.extend((window_start..=window_end).map(PageItem::Page));
        if window_end < total - 1 {
            pages.push(PageItem::Gap);
        }
    }
    if total > 1 {
        pages.push(PageItem::Page(total));
    }

    pages.dedup();
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Gap, Page};

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(23, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn test_small_page_counts() {
        assert_eq!(visible_pages(1, 0), vec![]);
        assert_eq!(visible_pages(1, 1), vec![Page(1)]);
        assert_eq!(visible_pages(2, 2), vec![Page(1), Page(2)]);
        assert_eq!(visible_pages(1, 3), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn test_window_in_the_middle() {
        assert_eq!(
            visible_pages(10, 20),
            vec![Page(1), Gap, Page(8), Page(9), Page(10), Page(11), Page(12), Gap, Page(20)]
        );
    }

    #[test]
    fn test_window_touching_edges() {
        assert_eq!(
            visible_pages(1, 10),
            vec![Page(1), Page(2), Page(3), Gap, Page(10)]
        );
        assert_eq!(
            visible_pages(4, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Gap, Page(10)]
        );
        assert_eq!(
            visible_pages(10, 10),
            vec![Page(1), Gap, Page(8), Page(9), Page(10)]
        );
    }
}
