//! Page windows for paginated JSON listings.

use serde::Serialize;

/// Page size used when the client does not ask for one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Largest page size a client may request.
pub const MAX_ITEMS_PER_PAGE: usize = 100;

/// Builds the list of page links around `current_page`; `None` marks a gap.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Clamps a requested page size into `1..=MAX_ITEMS_PER_PAGE`.
pub fn clamp_per_page(per_page: Option<usize>) -> usize {
    per_page
        .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
        .clamp(1, MAX_ITEMS_PER_PAGE)
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

impl<T> Paginated<T> {
    /// Wraps one page of `items` out of `total` matching rows.
    pub fn new(items: Vec<T>, current_page: usize, per_page: usize, total: usize) -> Self {
        let current_page = current_page.max(1);
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page);

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            pages,
            page: current_page,
            per_page,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_listings_have_no_gaps() {
        let page: Paginated<i32> = Paginated::new(vec![1, 2], 1, 20, 45);
        assert_eq!(page.pages, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(page.total, 45);
    }

    #[test]
    fn long_listings_elide_the_middle() {
        let page: Paginated<i32> = Paginated::new(vec![], 10, 10, 200);
        assert_eq!(page.pages.first(), Some(&Some(1)));
        assert_eq!(page.pages.last(), Some(&Some(20)));
        assert_eq!(page.pages.iter().filter(|p| p.is_none()).count(), 2);
        assert!(page.pages.contains(&Some(10)));
    }

    #[test]
    fn empty_listing_has_no_pages_and_page_zero_becomes_one() {
        let page: Paginated<i32> = Paginated::new(vec![], 0, 20, 0);
        assert!(page.pages.is_empty());
        assert_eq!(page.page, 1);
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(clamp_per_page(None), DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(clamp_per_page(Some(0)), 1);
        assert_eq!(clamp_per_page(Some(5_000)), MAX_ITEMS_PER_PAGE);
    }
}
