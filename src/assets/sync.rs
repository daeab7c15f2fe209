//! Two-step reconciliation between local gallery metadata and the remote
//! asset host.
//!
//! The local record is always committed first (as `pending`). Only then are
//! its tags pushed to the remote host, in a single attempt bounded by the
//! client's timeout. The outcome is recorded as `synced` or `failed`; a remote
//! failure never rolls the local commit back.

use std::time::Instant;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::AssetHost;
use crate::{
    models::{GalleryChanges, GalleryItem, SyncStatus},
    store::{GalleryRepository, Repository, StoreResult},
    telemetry::{record_asset_sync, SyncOutcomeLabel},
};

#[derive(Debug, Clone)]
pub enum SyncOutcome {
    Synced(GalleryItem),
    /// Local changes are kept; the remote mirror is stale.
    Failed { item: GalleryItem, reason: String },
}

impl SyncOutcome {
    pub fn item(&self) -> &GalleryItem {
        match self {
            SyncOutcome::Synced(item) => item,
            SyncOutcome::Failed { item, .. } => item,
        }
    }
}

/// Commits `changes` locally, then pushes the resulting tags. `None` when the
/// record does not exist.
pub async fn update_and_sync(
    gallery: &dyn GalleryRepository,
    host: &dyn AssetHost,
    id: Uuid,
    changes: GalleryChanges,
) -> StoreResult<Option<SyncOutcome>> {
    let changes = GalleryChanges {
        sync_status: Some(SyncStatus::Pending),
        ..changes
    };

    let Some(item) = gallery.update(id, changes)? else {
        return Ok(None);
    };

    info!(gallery_id = %item.id, "Gallery item updated locally");
    Ok(Some(push_tags(gallery, host, item).await))
}

/// Pushes the current tags of `item` and records the outcome.
pub async fn push_tags(
    gallery: &dyn GalleryRepository,
    host: &dyn AssetHost,
    item: GalleryItem,
) -> SyncOutcome {
    let started = Instant::now();
    let result = host.replace_tags(&item.asset_id, &item.tags).await;

    match result {
        Ok(()) => {
            record_asset_sync(SyncOutcomeLabel::Synced, started.elapsed());
            SyncOutcome::Synced(mark(gallery, item, SyncStatus::Synced))
        }
        Err(e) => {
            warn!(
                gallery_id = %item.id,
                asset_id = %item.asset_id,
                error = %e,
                "Remote tag sync failed, keeping local changes"
            );
            record_asset_sync(SyncOutcomeLabel::Failed, started.elapsed());
            SyncOutcome::Failed {
                item: mark(gallery, item, SyncStatus::Failed),
                reason: e.to_string(),
            }
        }
    }
}

fn mark(gallery: &dyn GalleryRepository, mut item: GalleryItem, status: SyncStatus) -> GalleryItem {
    match gallery.set_sync_status(item.id, status) {
        Ok(Some(updated)) => updated,
        Ok(None) => {
            item.sync_status = status;
            item
        }
        Err(e) => {
            error!(gallery_id = %item.id, error = %e, "Failed to record sync status");
            item
        }
    }
}
