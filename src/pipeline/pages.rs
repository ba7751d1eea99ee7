use serde::Serialize;

/// Elements in `[(page-1)*size, page*size)`. Out-of-range pages yield an empty slice;
/// clamping is the caller's job.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> &[T] {
    if page == 0 || size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Pager buttons: every page up to 7, otherwise first/last with a window around `current`.
pub fn page_items(current: usize, total_pages: usize) -> Vec<PageItem> {
    use PageItem::{Ellipsis, Page};

    if total_pages <= 7 {
        return (1..=total_pages).map(Page).collect();
    }
    let n = total_pages;
    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(n)]
    } else if current >= n - 2 {
        vec![Page(1), Ellipsis, Page(n - 3), Page(n - 2), Page(n - 1), Page(n)]
    } else {
        vec![
            Page(1),
            Ellipsis,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Ellipsis,
            Page(n),
        ]
    }
}

/// 1-based "showing start-end of total" for the footer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShowingRange {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

pub fn showing_range(page: usize, size: usize, total: usize) -> ShowingRange {
    let offset = page.saturating_sub(1).saturating_mul(size);
    let start = if total > 0 { offset + 1 } else { 0 };
    let end = page.saturating_mul(size).min(total);
    ShowingRange { start, end, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn eight_items_in_pages_of_five() {
        let items: Vec<i32> = (1..=8).collect();
        assert_eq!(total_pages(items.len(), 5), 2);
        assert_eq!(paginate(&items, 1, 5), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&items, 2, 5), &[6, 7, 8]);
        assert!(paginate(&items, 3, 5).is_empty());
    }

    #[test]
    fn degenerate_page_or_size_is_empty() {
        let items = [1, 2, 3];
        assert!(paginate(&items, 0, 5).is_empty());
        assert!(paginate(&items, 1, 0).is_empty());
        assert_eq!(total_pages(3, 0), 0);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn page_items_short_list() {
        assert_eq!(page_items(1, 3), vec![Page(1), Page(2), Page(3)]);
        assert!(page_items(1, 0).is_empty());
    }

    #[test]
    fn page_items_near_start_middle_and_end() {
        assert_eq!(
            page_items(2, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_items(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_items(9, 10),
            vec![Page(1), Ellipsis, Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn showing_range_bounds() {
        assert_eq!(
            showing_range(2, 5, 8),
            ShowingRange { start: 6, end: 8, total: 8 }
        );
        assert_eq!(
            showing_range(1, 10, 0),
            ShowingRange { start: 0, end: 0, total: 0 }
        );
    }

    proptest! {
        #[test]
        fn pages_concatenate_to_original(len in 0usize..200, size in 1usize..25) {
            let items: Vec<usize> = (0..len).collect();
            let pages = total_pages(len, size);
            let rebuilt: Vec<usize> = (1..=pages)
                .flat_map(|p| paginate(&items, p, size).iter().copied())
                .collect();
            prop_assert_eq!(rebuilt, items);
        }
    }
}
