use std::hash::Hash;

use types::{Post, PostId};

/// Globally unique key for the given type
pub trait KeyedData {
    type Key: Eq + Hash + 'static;

    fn key(&self) -> Self::Key;
}

impl KeyedData for Post {
    type Key = PostId;

    fn key(&self) -> Self::Key {
        self.id
    }
}

/// Fixed size, 1-based pages over an in-memory list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page_size: 5 }
    }
}

impl Pagination {
    /// A zero page size is treated as 1
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// `ceil(len / page_size)`, an empty list has no pages
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Items `(page-1)*size .. page*size` clamped to the list bounds.
    /// Page 0 and pages past the end are empty.
    pub fn page<T: Clone>(&self, items: &[T], page: usize) -> Vec<T> {
        if page == 0 {
            return vec![];
        }

        let start = ((page - 1) * self.page_size).min(items.len());
        let end = (page * self.page_size).min(items.len());
        items[start..end].to_vec()
    }

    /// Keeps `page` within `1..=max(1, total_pages)`
    pub fn clamp_page(&self, page: usize, len: usize) -> usize {
        page.clamp(1, self.total_pages(len).max(1))
    }

    pub fn contains_page(&self, page: usize, len: usize) -> bool {
        page >= 1 && page <= self.total_pages(len).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_partition_the_list() {
        let pagination = Pagination::default();
        for len in 0..23 {
            let items: Vec<usize> = (0..len).collect();
            let total = pagination.total_pages(len);
            assert_eq!(total, len.div_ceil(5));

            let mut joined = vec![];
            for page in 1..=total {
                let entry = pagination.page(&items, page);
                assert!(!entry.is_empty());
                assert!(entry.len() <= 5);
                joined.extend(entry);
            }
            assert_eq!(joined, items);
        }
    }

    #[test]
    fn empty_list_has_no_pages() {
        let pagination = Pagination::default();
        assert_eq!(pagination.total_pages(0), 0);
        assert!(pagination.page::<u8>(&[], 1).is_empty());
        assert_eq!(pagination.clamp_page(3, 0), 1);
    }

    #[test]
    fn out_of_range_pages_are_empty() {
        let pagination = Pagination::new(5);
        let items: Vec<u32> = (0..7).collect();
        assert_eq!(pagination.page(&items, 2), vec![5, 6]);
        assert!(pagination.page(&items, 3).is_empty());
        assert!(pagination.page(&items, 0).is_empty());
    }

    #[test]
    fn clamps_after_shrink() {
        let pagination = Pagination::default();
        assert_eq!(pagination.clamp_page(4, 12), 3);
        assert_eq!(pagination.clamp_page(2, 12), 2);
        assert!(pagination.contains_page(1, 0));
        assert!(!pagination.contains_page(2, 5));
        assert!(!pagination.contains_page(0, 5));
    }

    #[test]
    fn zero_page_size_falls_back_to_one() {
        let pagination = Pagination::new(0);
        assert_eq!(pagination.total_pages(3), 3);
        assert_eq!(pagination.page(&[1, 2, 3], 2), vec![2]);
    }
}
