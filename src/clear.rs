//! Delete-all over the record store.

use anyhow::Result;

use roster_core::responses::ClearResponse;
use roster_core::store::RecordStore;

/// Counts observed around a delete-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearReport {
    pub removed_count: u64,
    pub total_before: u64,
    pub total_after: u64,
}

impl ClearReport {
    pub fn into_response(self, message: impl Into<String>) -> ClearResponse {
        ClearResponse {
            message: message.into(),
            removed_count: self.removed_count,
            total_before: self.total_before,
            total_after: self.total_after,
        }
    }
}

/// Remove every record, unconditionally.
///
/// There is no authorization or confirmation here; the caller owns that.
/// `total_after` is a fresh recount. It is non-zero only when an import
/// lands between the delete and the recount, which is logged and reported
/// as observed.
pub async fn clear_all(store: &dyn RecordStore) -> Result<ClearReport> {
    let total_before = store.count().await?;
    let removed_count = store.remove_all().await?;
    let total_after = store.count().await?;

    if total_after == 0 {
        tracing::info!(total_before, removed_count, "records cleared");
    } else {
        tracing::warn!(
            total_before,
            removed_count,
            total_after,
            "records remain after clear; a concurrent import landed"
        );
    }

    Ok(ClearReport {
        removed_count,
        total_before,
        total_after,
    })
}
