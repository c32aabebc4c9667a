//! Best-match selection for automatic linking.

use uuid::Uuid;

use vidops_core::{ContentItem, ExternalVideo, Language};

use crate::similarity::jaccard_score;

/// Minimum similarity (strict) for an auto-link to commit.
pub const DEFAULT_LINK_THRESHOLD: f64 = 0.6;

/// A committed-candidate decision: the best candidate and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDecision {
    pub candidate_id: Uuid,
    pub score: f64,
}

/// Picks the best external video for a content item's language track.
///
/// Compares the track's main title against each candidate title and keeps
/// the single highest score; ties go to the first candidate reaching the
/// maximum in iteration order. Returns `None` when no candidate scores
/// strictly above `threshold` — a reported outcome, not an error. A missing
/// main title scores 0 against everything and therefore never links.
#[must_use]
pub fn best_external_match(
    source: &ContentItem,
    language: Language,
    candidates: &[&ExternalVideo],
    threshold: f64,
) -> Option<MatchDecision> {
    let title = source.track(language).main_title.as_deref().unwrap_or("");

    let mut best: Option<MatchDecision> = None;
    for candidate in candidates {
        let score = jaccard_score(title, &candidate.title);
        if score > threshold && best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(MatchDecision {
                candidate_id: candidate.id,
                score,
            });
        }
    }

    if let Some(decision) = &best {
        tracing::debug!(
            content_id = %source.id,
            candidate_id = %decision.candidate_id,
            score = decision.score,
            "auto-link candidate selected"
        );
    }
    best
}

/// Picks the best content item for an external video.
///
/// This direction does not know which language matched, so each candidate is
/// scored as the better of its EN and ES titles. Threshold and tie-break
/// semantics are identical to [`best_external_match`].
#[must_use]
pub fn best_content_match(
    video: &ExternalVideo,
    candidates: &[ContentItem],
    threshold: f64,
) -> Option<MatchDecision> {
    let mut best: Option<MatchDecision> = None;
    for candidate in candidates {
        let en_score = candidate
            .en
            .main_title
            .as_deref()
            .map_or(0.0, |t| jaccard_score(&video.title, t));
        let es_score = candidate
            .es
            .main_title
            .as_deref()
            .map_or(0.0, |t| jaccard_score(&video.title, t));
        let score = en_score.max(es_score);

        if score > threshold && best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(MatchDecision {
                candidate_id: candidate.id,
                score,
            });
        }
    }

    if let Some(decision) = &best {
        tracing::debug!(
            video_id = %video.id,
            candidate_id = %decision.candidate_id,
            score = decision.score,
            "auto-link candidate selected"
        );
    }
    best
}
