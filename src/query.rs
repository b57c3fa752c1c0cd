//! Paginated listing over the record store.

use anyhow::Result;

use roster_core::models::Record;
use roster_core::paging::{Page, PageRequest};
use roster_core::responses::ListResponse;
use roster_core::store::{FindOptions, RecordStore};

/// Fetch one newest-first page of records.
///
/// The window and the total are read with two separate store calls and no
/// lock between them, so a concurrent import or clear can make them
/// disagree by one batch.
pub async fn list_page(store: &dyn RecordStore, req: PageRequest) -> Result<Page<Record>> {
    let items = store.find(FindOptions::for_page(req)).await?;
    let total = store.count().await?;
    let total_pages = req.total_pages(total);
    Ok(Page {
        items,
        current_page: req.served_page(total_pages),
        total_pages,
        total,
    })
}

/// [`list_page`] shaped as the `GET /users` response body.
pub async fn list_records(store: &dyn RecordStore, req: PageRequest) -> Result<ListResponse> {
    Ok(list_page(store, req).await?.into())
}
