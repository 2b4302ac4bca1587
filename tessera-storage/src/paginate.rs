//! Pagination engine.

use tessera_core::{Page, PageMetadata, PageRequest, Record, TesseraResult, ValidationError};

use crate::RecordStore;

/// Run a page request against `store`.
///
/// `total` is counted over the (collection, filter) pair independently of
/// page and limit. The store is only asked for rows when the normalised
/// page actually holds some.
pub async fn paginate(
    store: &dyn RecordStore,
    request: &PageRequest,
) -> TesseraResult<Page<Record>> {
    if request.model != store.collection() {
        return Err(ValidationError::UnknownModel {
            model: request.model.clone(),
        }
        .into());
    }

    let (page, limit) = request.normalized();
    let total = store.count(&request.filter).await?;
    let metadata = PageMetadata::compute(page, limit, total);

    let records = if metadata.record > 0 {
        store
            .fetch_page(&request.filter, request.offset(), metadata.limit)
            .await?
    } else {
        Vec::new()
    };

    tracing::debug!(
        model = %request.model,
        page = metadata.page,
        limit = metadata.limit,
        total = metadata.total,
        returned = records.len(),
        "paginated list"
    );

    Ok(Page { records, metadata })
}
