//! Page slicing over the accumulated catalog

use crate::types::{PageRequest, ValidatedItem};

/// Items of `request`'s page, `accumulated[start..start + page_size]` clamped to bounds
///
/// Shorter than `page_size` (possibly empty) when fewer items were accumulated.
pub fn slice(accumulated: &[ValidatedItem], request: PageRequest) -> Vec<ValidatedItem> {
    let start = request.start().min(accumulated.len());
    let end = start
        .saturating_add(request.page_size)
        .min(accumulated.len());
    accumulated[start..end].to_vec()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaType;
    use chrono::NaiveDate;

    fn items(n: u64) -> Vec<ValidatedItem> {
        (1..=n)
            .map(|i| ValidatedItem {
                id: format!("tmdb:{}", i),
                media_type: MediaType::Movie,
                name: format!("Movie {}", i),
                description: String::new(),
                poster_url: None,
                release_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            })
            .collect()
    }

    fn names(page: &[ValidatedItem]) -> Vec<&str> {
        page.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_full_page() {
        let all = items(10);
        let page = slice(&all, PageRequest::new(2, 3));
        assert_eq!(names(&page), vec!["tmdb:4", "tmdb:5", "tmdb:6"]);
    }

    #[test]
    fn test_partial_last_page() {
        let all = items(7);
        let page = slice(&all, PageRequest::new(3, 3));
        assert_eq!(names(&page), vec!["tmdb:7"]);
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let all = items(4);
        assert!(slice(&all, PageRequest::new(3, 3)).is_empty());
        assert!(slice(&[], PageRequest::new(1, 3)).is_empty());
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let all = items(2);
        assert!(slice(&all, PageRequest::new(usize::MAX, 40)).is_empty());
    }
}
