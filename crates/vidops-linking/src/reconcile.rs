//! Link reconciliation: finding external-side links that no longer hold.
//!
//! Reconciliation is a decision pass over the currently linked videos of an
//! account. It never creates links; it only nominates links for removal, and
//! the caller clears them on the external side without touching the content
//! items' stored URLs.

use std::collections::HashMap;

use uuid::Uuid;

use vidops_core::{ContentItem, ExternalVideo};

use crate::similarity::jaccard_score;

/// Outcome of a reconciliation pass. Both lists hold external video ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Links whose target content item no longer exists.
    pub orphaned: Vec<Uuid>,
    /// Links whose target exists but whose titles no longer share any token.
    pub mismatched: Vec<Uuid>,
}

impl ReconcilePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orphaned.is_empty() && self.mismatched.is_empty()
    }

    /// All video ids the caller should unlink, orphans first.
    #[must_use]
    pub fn stale_video_ids(&self) -> Vec<Uuid> {
        let mut ids = self.orphaned.clone();
        ids.extend(&self.mismatched);
        ids
    }
}

/// Classifies every linked video against the current content items.
///
/// A link survives when its target item still exists and the video title
/// scores above zero against any of the item's titles (either language's
/// main title or the internal working title). Zero overlap means the link
/// points at content that was retitled out from under it, or was wrong to
/// begin with. Videos with no link are ignored.
#[must_use]
pub fn plan_reconciliation(
    linked_videos: &[ExternalVideo],
    items: &[ContentItem],
) -> ReconcilePlan {
    let by_id: HashMap<Uuid, &ContentItem> = items.iter().map(|item| (item.id, item)).collect();

    let mut plan = ReconcilePlan::default();
    for video in linked_videos {
        let Some(content_id) = video.linked_content_id else {
            continue;
        };
        match by_id.get(&content_id) {
            None => {
                tracing::debug!(video_id = %video.id, %content_id, "link target missing");
                plan.orphaned.push(video.id);
            }
            Some(item) if !titles_overlap(video, item) => {
                tracing::debug!(video_id = %video.id, %content_id, "link titles diverged");
                plan.mismatched.push(video.id);
            }
            Some(_) => {}
        }
    }
    plan
}

/// Best score of the video title against all of the item's titles.
fn titles_overlap(video: &ExternalVideo, item: &ContentItem) -> bool {
    let mut best: f64 = jaccard_score(&video.title, &item.internal_title);
    if let Some(title) = item.en.main_title.as_deref() {
        best = best.max(jaccard_score(&video.title, title));
    }
    if let Some(title) = item.es.main_title.as_deref() {
        best = best.max(jaccard_score(&video.title, title));
    }
    best > 0.0
}
