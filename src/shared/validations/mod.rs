/// Normalise `page` / `limit` query values: page is 1-based, limit is 1..=100.
pub fn validate_pagination(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(50).clamp(1, 100);
    (page, limit)
}

/// Clamp a "top N" style limit to 1..=100, defaulting to 5.
pub fn validate_top_limit(limit: Option<u32>) -> usize {
    limit.unwrap_or(5).clamp(1, 100) as usize
}
