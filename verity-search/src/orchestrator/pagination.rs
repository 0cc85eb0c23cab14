//! Page-window planning for deep result sets.
//!
//! The provider serves at most [`MAX_PAGE_SIZE`] items per call and never
//! past result index [`MAX_RESULT_INDEX`], so a target of N results is
//! split into consecutive windows `start = 1, 1 + size, 1 + 2 * size, ...`.

use crate::config::MAX_PAGE_SIZE;
use crate::types::SearchQueryConfig;

/// Highest 1-indexed result position the provider will serve.
pub const MAX_RESULT_INDEX: u32 = 100;

/// Plan the page windows needed to cover `target_total` results of one engine.
///
/// Every window carries an explicit `start_offset`. The last window is
/// shrunk to the remainder, so the windows cover exactly `target_total`
/// positions (capped at [`MAX_RESULT_INDEX`]). A zero `page_size` or
/// `target_total` yields no windows.
pub fn page_windows(engine_id: &str, page_size: u32, target_total: u32) -> Vec<SearchQueryConfig> {
    let page_size = page_size.min(MAX_PAGE_SIZE);
    if page_size == 0 || target_total == 0 {
        return Vec::new();
    }

    let target_total = target_total.min(MAX_RESULT_INDEX);
    let mut windows = Vec::new();
    let mut start = 1;

    while start <= target_total {
        let remaining = target_total - start + 1;
        let size = page_size.min(remaining);
        windows.push(SearchQueryConfig::new(engine_id, size).with_start_offset(start));
        start += size;
    }

    windows
}
