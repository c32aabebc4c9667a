//! Candidate pools for linking, plus free-text narrowing for interactive
//! search.

use vidops_core::{Channel, ContentItem, ExternalVideo, VideoType};

/// Structural candidate filter for the content→external direction.
///
/// Eligible candidates are videos on the channel matching the requested
/// language, not yet linked, and whose short/long classification matches the
/// source item's type. A video whose classification cannot be determined is
/// excluded entirely — no match is preferred over a wrong-type match.
#[must_use]
pub fn content_to_external_candidates<'a>(
    source: &ContentItem,
    videos: &'a [ExternalVideo],
    channel: &Channel,
) -> Vec<&'a ExternalVideo> {
    let want_short = source.video_type == VideoType::ShortForm;

    videos
        .iter()
        .filter(|video| video.channel_id == channel.id)
        .filter(|video| video.linked_content_id.is_none())
        .filter(|video| video.short_classification() == Some(want_short))
        .collect()
}

// The external→content direction has no structural filter: a content item
// carries both languages, so every item in the account is a candidate.

/// Case-insensitive substring narrowing over external video titles and
/// platform ids. Applied after the structural filter; an empty term matches
/// everything.
#[must_use]
pub fn search_external<'a>(videos: &[&'a ExternalVideo], term: &str) -> Vec<&'a ExternalVideo> {
    let needle = term.to_lowercase();
    videos
        .iter()
        .filter(|video| {
            video.title.to_lowercase().contains(&needle)
                || video.external_id.to_lowercase().contains(&needle)
        })
        .copied()
        .collect()
}

/// Case-insensitive substring narrowing over content item titles.
#[must_use]
pub fn search_content<'a>(items: &'a [ContentItem], term: &str) -> Vec<&'a ContentItem> {
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| {
            item.internal_title.to_lowercase().contains(&needle)
                || title_contains(item.en.main_title.as_deref(), &needle)
                || title_contains(item.es.main_title.as_deref(), &needle)
        })
        .collect()
}

fn title_contains(title: Option<&str>, needle: &str) -> bool {
    title.is_some_and(|t| t.to_lowercase().contains(needle))
}
