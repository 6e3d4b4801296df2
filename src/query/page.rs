//! Pagination: a fixed 30-row window over the matched set.

use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: u32 = 30;

/// The resolved window: page number, fixed size and row offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
    pub offset: u64,
}

/// Resolve the window for a result set of `total_count` rows.
///
/// When everything fits on one page the requested page is ignored and page 1
/// is forced. Otherwise the requested page (default 1) is taken as-is: a page
/// past the end yields an empty window, not an error. Stateless — whoever
/// remembers the current page across searches passes it back in.
pub fn paginate(total_count: usize, requested_page: Option<u32>) -> PageWindow {
    let page = if total_count <= PAGE_SIZE as usize {
        1
    } else {
        requested_page.unwrap_or(1).max(1)
    };
    PageWindow {
        page,
        page_size: PAGE_SIZE,
        offset: (page as u64 - 1) * PAGE_SIZE as u64,
    }
}
