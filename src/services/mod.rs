pub mod analytics_service;
pub mod event_service;
pub mod report_service;
pub mod student_service;
pub mod upload_service;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Slices an already filtered list. Returns (items, total, page, limit) with
/// `page` clamped to >= 1 and `limit` to 1..=MAX_PAGE_SIZE.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, limit: Option<usize>) -> (Vec<T>, usize, usize, usize) {
    let total = items.len();
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(limit))
        .take(limit)
        .collect();
    (items, total, page, limit)
}

/// Trims an optional text field; blank becomes None.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginates_with_clamping() {
        let items: Vec<u32> = (1..=25).collect();

        let (page, total, n, limit) = paginate(items.clone(), None, None);
        assert_eq!((page.len(), total, n, limit), (20, 25, 1, 20));

        let (page, _, _, _) = paginate(items.clone(), Some(2), None);
        assert_eq!(page, vec![21, 22, 23, 24, 25]);

        let (page, _, n, limit) = paginate(items.clone(), Some(0), Some(1000));
        assert_eq!((page.len(), n, limit), (25, 1, MAX_PAGE_SIZE));

        let (page, _, _, _) = paginate(items, Some(9), Some(10));
        assert!(page.is_empty());
    }

    #[test]
    fn normalizes_optional_text() {
        assert_eq!(normalize_optional(Some("  CSE ".into())), Some("CSE".into()));
        assert_eq!(normalize_optional(Some("   ".into())), None);
        assert_eq!(normalize_optional(None), None);
    }
}
