//! Content-gap analysis: how many drafts a target date demands versus what
//! the pipeline currently holds.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use vidops_core::{ContentItem, Language, Topic, VideoType};

/// Default long-form share of each topic's needed count. The remainder is
/// short-form.
pub const DEFAULT_LONG_FORM_SHARE: f64 = 0.6;

/// Needed-versus-available for one format within a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatNeed {
    pub needed: u32,
    pub available: u32,
}

impl FormatNeed {
    #[must_use]
    pub fn deficit(self) -> bool {
        self.available < self.needed
    }
}

/// Per-topic slice of the gap report.
#[derive(Debug, Clone, Serialize)]
pub struct TopicBreakdown {
    pub topic_id: Uuid,
    pub topic_name: String,
    pub long_form: FormatNeed,
    pub short_form: FormatNeed,
    /// Sum of the two format needed-counts. May exceed the topic's equal
    /// share because each format rounds up independently.
    pub total_needed: u32,
    pub total_available: u32,
    pub deficit: bool,
}

/// Result of one gap analysis run, scoped to a single language.
#[derive(Debug, Clone, Serialize)]
pub struct GapReport {
    pub language: Language,
    pub target_date: NaiveDate,
    pub weeks_until_target: u32,
    pub total_needed: u32,
    pub available_drafts: u32,
    /// `max(0, total_needed - available_drafts)`; never negative.
    pub shortfall: u32,
    pub breakdown: Vec<TopicBreakdown>,
}

/// Whether an item's language track is an unscheduled draft.
///
/// Any pre-published status counts; a set publication date disqualifies the
/// item regardless of status.
fn is_unscheduled_draft(item: &ContentItem, language: Language) -> bool {
    let track = item.track(language);
    track.status.is_schedulable() && track.publication_date.is_none()
}

/// Computes the gap report for one language.
///
/// `weeks_until_target` is the ceiling of the calendar-day distance from
/// `today` to `target_date` divided by seven; a target in the past yields
/// zero weeks and therefore zero need. Each topic receives an equal share of
/// the total (ceiling-rounded), split into long-form and short-form by
/// `long_form_share`, each share again rounded up. Zero topics produce an
/// empty breakdown, not an error.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn analyze_gap(
    items: &[ContentItem],
    topics: &[Topic],
    today: NaiveDate,
    target_date: NaiveDate,
    posts_per_week: u32,
    language: Language,
    long_form_share: f64,
) -> GapReport {
    let days_until = (target_date - today).num_days().max(0) as u64;
    let weeks_until_target = days_until.div_ceil(7) as u32;
    let total_needed = weeks_until_target * posts_per_week;

    let drafts: Vec<&ContentItem> = items
        .iter()
        .filter(|item| is_unscheduled_draft(item, language))
        .collect();
    let available_drafts = drafts.len() as u32;
    let shortfall = total_needed.saturating_sub(available_drafts);

    // Guard the zero-topics case before dividing; it simply yields no rows.
    let needed_per_topic = match u32::try_from(topics.len()) {
        Ok(0) | Err(_) => 0,
        Ok(count) => total_needed.div_ceil(count),
    };

    let breakdown = topics
        .iter()
        .map(|topic| {
            let long_needed = (f64::from(needed_per_topic) * long_form_share).ceil() as u32;
            let short_needed =
                (f64::from(needed_per_topic) * (1.0 - long_form_share)).ceil() as u32;

            let count_format = |video_type: VideoType| {
                drafts
                    .iter()
                    .filter(|item| item.topic_id == Some(topic.id))
                    .filter(|item| item.video_type == video_type)
                    .count() as u32
            };
            let long_form = FormatNeed {
                needed: long_needed,
                available: count_format(VideoType::LongForm),
            };
            let short_form = FormatNeed {
                needed: short_needed,
                available: count_format(VideoType::ShortForm),
            };

            TopicBreakdown {
                topic_id: topic.id,
                topic_name: topic.name.clone(),
                total_needed: long_form.needed + short_form.needed,
                total_available: long_form.available + short_form.available,
                deficit: long_form.deficit() || short_form.deficit(),
                long_form,
                short_form,
            }
        })
        .collect();

    tracing::debug!(
        %language,
        total_needed,
        available_drafts,
        shortfall,
        "gap analysis complete"
    );

    GapReport {
        language,
        target_date,
        weeks_until_target,
        total_needed,
        available_drafts,
        shortfall,
        breakdown,
    }
}
