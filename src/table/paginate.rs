pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 20, 50];

/// Number of pages needed for `len` rows. Zero when there are no rows.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// 1-based page slice. Out-of-range pages yield an empty slice.
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= rows.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(rows.len());
    &rows[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_page_of_twenty_five() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&rows, 3, 10), &[21, 22, 23, 24, 25]);
        assert_eq!(paginate(&rows, 1, 10).len(), 10);
        assert_eq!(total_pages(rows.len(), 10), 3);
    }

    #[test]
    fn beyond_last_page_is_empty() {
        let rows: Vec<u32> = (1..=25).collect();
        assert!(paginate(&rows, 99, 10).is_empty());
        assert!(paginate(&rows, 0, 10).is_empty());
        assert!(paginate(&rows, usize::MAX, usize::MAX).is_empty());
    }

    #[test]
    fn empty_input() {
        let rows: Vec<u32> = Vec::new();
        assert_eq!(total_pages(0, 10), 0);
        assert!(paginate(&rows, 1, 10).is_empty());
    }
}
