//! Offset pagination over a composed collection.

use tracing::debug;

use crate::core::Collection;
use crate::error::StorageResult;
use crate::types::{PageRequest, PageResult};

/// Counts `collection` once and loads the requested page.
///
/// The page is not clamped against the page count: asking past the end
/// yields an empty slice with the real totals. The slice query is skipped
/// when the offset is already past the total.
pub async fn paginate<C: Collection>(
    collection: &C,
    request: PageRequest,
) -> StorageResult<PageResult<C::Record>> {
    let total_count = collection.count().await?;

    let items = match request.offset() {
        Some(offset) if offset < total_count => {
            collection.slice(offset, request.page_size()).await?
        }
        _ => Vec::new(),
    };

    let result = PageResult::new(request, total_count, items);
    debug!(
        total = result.total_count,
        page = result.current_page,
        page_size = result.page_size,
        returned = result.items.len(),
        "Paginated collection"
    );
    Ok(result)
}
