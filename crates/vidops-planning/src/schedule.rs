//! Greedy publication-date assignment for draft content.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use vidops_core::{ContentItem, FormatMix, Language, SchedulingPreferences, VideoType};

/// Hard cap on the schedule walk, counted in Sunday crossings. Guarantees
/// termination even when the preferences can never place another item
/// (empty weekday set, zero frequency).
pub const MAX_SCHEDULE_WEEKS: u32 = 52;

/// One generated slot: publish this item on this date, for this language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub content_id: Uuid,
    pub date: NaiveDate,
    pub language: Language,
}

/// Filters a snapshot down to the items the generator may place, preserving
/// the snapshot's order.
///
/// An item qualifies when its language track is an unscheduled draft (status
/// before published, no publication date), its topic is in `selected_topics`
/// (empty set = no filter; an untagged item only passes the empty filter),
/// and its format matches `format_mix`.
#[must_use]
pub fn eligible_candidates<'a>(
    items: &'a [ContentItem],
    preferences: &SchedulingPreferences,
    language: Language,
) -> Vec<&'a ContentItem> {
    items
        .iter()
        .filter(|item| {
            let track = item.track(language);
            track.status.is_schedulable() && track.publication_date.is_none()
        })
        .filter(|item| {
            preferences.selected_topics.is_empty()
                || item
                    .topic_id
                    .is_some_and(|id| preferences.selected_topics.contains(&id))
        })
        .filter(|item| match preferences.format_mix {
            FormatMix::Balanced => true,
            FormatMix::LongFormOnly => item.video_type == VideoType::LongForm,
            FormatMix::ShortFormOnly => item.video_type == VideoType::ShortForm,
        })
        .collect()
}

/// Walks the calendar from `start` and assigns candidates to publish dates.
///
/// Day by day: a date receives the next unassigned candidate when its
/// weekday is in `days_of_week` and fewer than `frequency` items have been
/// placed in the current week. The weekly counter resets every Sunday, and
/// each Sunday crossing consumes one week of the [`MAX_SCHEDULE_WEEKS`]
/// budget; a mid-week start spends its first week on the partial stub. The
/// walk stops once every candidate is placed or the budget runs out;
/// leftover candidates are simply absent from the result.
#[must_use]
pub fn generate_schedule(
    candidates: &[&ContentItem],
    preferences: &SchedulingPreferences,
    language: Language,
    start: NaiveDate,
) -> Vec<Assignment> {
    let mut assignments = Vec::with_capacity(candidates.len());
    let mut next = 0;
    let mut posts_this_week = 0u32;
    let mut weeks_elapsed = 0u32;
    let mut day = 0u64;
    let mut date = start;

    while next < candidates.len() && weeks_elapsed < MAX_SCHEDULE_WEEKS {
        let weekday = u8::try_from(date.weekday().num_days_from_sunday()).unwrap_or(u8::MAX);
        if preferences.days_of_week.contains(&weekday) && posts_this_week < preferences.frequency {
            assignments.push(Assignment {
                content_id: candidates[next].id,
                date,
                language,
            });
            next += 1;
            posts_this_week += 1;
        }
        // Saturday closes the week; the following Sunday starts a new one.
        if weekday == 6 {
            posts_this_week = 0;
            weeks_elapsed += 1;
        }
        day += 1;
        date = start + Days::new(day);
    }

    tracing::debug!(
        %language,
        assigned = assignments.len(),
        unplaced = candidates.len() - assignments.len(),
        "schedule generated"
    );
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Utc, Weekday};
    use std::collections::BTreeSet;
    use vidops_core::{LanguageTrack, VideoStatus};

    fn item(number: i32, video_type: VideoType, topic_id: Option<Uuid>) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            video_number: number,
            internal_title: format!("item {number}"),
            video_type,
            topic_id,
            en: LanguageTrack {
                status: VideoStatus::Edited,
                ..LanguageTrack::default()
            },
            es: LanguageTrack::default(),
            created_at: Utc::now(),
        }
    }

    fn prefs(days: &[u8], frequency: u32) -> SchedulingPreferences {
        SchedulingPreferences {
            days_of_week: days.iter().copied().collect(),
            frequency,
            format_mix: FormatMix::Balanced,
            selected_topics: BTreeSet::new(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn candidates_keep_snapshot_order() {
        let items = vec![
            item(3, VideoType::LongForm, None),
            item(1, VideoType::LongForm, None),
            item(2, VideoType::LongForm, None),
        ];
        let picked = eligible_candidates(&items, &prefs(&[1], 1), Language::En);
        let numbers: Vec<i32> = picked.iter().map(|i| i.video_number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
    }

    #[test]
    fn published_or_dated_items_are_not_candidates() {
        let mut published = item(1, VideoType::LongForm, None);
        published.en.status = VideoStatus::Published;
        let mut dated = item(2, VideoType::LongForm, None);
        dated.en.publication_date = Some(Utc::now());
        let open = item(3, VideoType::LongForm, None);
        let items = vec![published, dated, open];

        let picked = eligible_candidates(&items, &prefs(&[1], 1), Language::En);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].video_number, 3);
    }

    #[test]
    fn topic_filter_excludes_untagged_items() {
        let topic_id = Uuid::new_v4();
        let tagged = item(1, VideoType::LongForm, Some(topic_id));
        let untagged = item(2, VideoType::LongForm, None);
        let other = item(3, VideoType::LongForm, Some(Uuid::new_v4()));
        let items = vec![tagged, untagged, other];

        let mut preferences = prefs(&[1], 1);
        preferences.selected_topics.insert(topic_id);
        let picked = eligible_candidates(&items, &preferences, Language::En);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].video_number, 1);
    }

    #[test]
    fn format_mix_restricts_candidates() {
        let items = vec![
            item(1, VideoType::LongForm, None),
            item(2, VideoType::ShortForm, None),
        ];
        let mut preferences = prefs(&[1], 1);
        preferences.format_mix = FormatMix::ShortFormOnly;
        let picked = eligible_candidates(&items, &preferences, Language::En);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].video_number, 2);
    }

    #[test]
    fn ten_drafts_fill_five_weeks_on_mon_wed_fri_at_two_per_week() {
        let items: Vec<ContentItem> =
            (1..=10).map(|n| item(n, VideoType::LongForm, None)).collect();
        let preferences = prefs(&[1, 3, 5], 2);
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        // 2026-01-04 is a Sunday, so weeks align with the walk's reset.
        let start = date(2026, 1, 4);
        assert_eq!(start.weekday(), Weekday::Sun);

        let assignments = generate_schedule(&candidates, &preferences, Language::En, start);
        assert_eq!(assignments.len(), 10);
        for a in &assignments {
            assert!(matches!(
                a.date.weekday(),
                Weekday::Mon | Weekday::Wed | Weekday::Fri
            ));
        }
        // At most two per calendar week.
        let mut per_week = std::collections::HashMap::new();
        for a in &assignments {
            let week = (a.date - start).num_days() / 7;
            *per_week.entry(week).or_insert(0u32) += 1;
        }
        assert!(per_week.values().all(|&count| count <= 2));
        // All ten consumed within five weeks of the start.
        let last = assignments.last().unwrap().date;
        assert!((last - start).num_days() < 35);
        // Order follows the candidate sequence.
        assert_eq!(assignments[0].content_id, items[0].id);
        assert_eq!(assignments[9].content_id, items[9].id);
    }

    #[test]
    fn never_assigns_outside_the_weekday_set() {
        let items: Vec<ContentItem> =
            (1..=20).map(|n| item(n, VideoType::LongForm, None)).collect();
        let preferences = prefs(&[2], 5); // Tuesdays only
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        let assignments =
            generate_schedule(&candidates, &preferences, Language::En, date(2026, 1, 1));
        assert!(!assignments.is_empty());
        for a in &assignments {
            assert_eq!(a.date.weekday(), Weekday::Tue);
        }
    }

    #[test]
    fn weekly_counter_resets_on_sunday() {
        let items: Vec<ContentItem> =
            (1..=4).map(|n| item(n, VideoType::LongForm, None)).collect();
        // Every day allowed, one post per week.
        let preferences = prefs(&[0, 1, 2, 3, 4, 5, 6], 1);
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        let start = date(2026, 1, 4); // Sunday
        let assignments = generate_schedule(&candidates, &preferences, Language::En, start);

        let dates: Vec<NaiveDate> = assignments.iter().map(|a| a.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2026, 1, 4),
                date(2026, 1, 11),
                date(2026, 1, 18),
                date(2026, 1, 25),
            ]
        );
    }

    #[test]
    fn empty_weekday_set_terminates_with_no_assignments() {
        let items: Vec<ContentItem> =
            (1..=3).map(|n| item(n, VideoType::LongForm, None)).collect();
        let preferences = prefs(&[], 3);
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        let assignments =
            generate_schedule(&candidates, &preferences, Language::En, date(2026, 1, 1));
        assert!(assignments.is_empty());
    }

    #[test]
    fn leftover_candidates_are_unscheduled_after_the_cap() {
        // One slot per week, more candidates than the cap allows. A Sunday
        // start gives exactly 52 full weeks, each with one Monday.
        let items: Vec<ContentItem> =
            (1..=60).map(|n| item(n, VideoType::LongForm, None)).collect();
        let preferences = prefs(&[1], 1);
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        let assignments =
            generate_schedule(&candidates, &preferences, Language::En, date(2026, 1, 4));
        assert_eq!(assignments.len(), 52);
        assert!(assignments.len() < candidates.len());
    }

    #[test]
    fn mid_week_start_counts_the_partial_week_against_the_cap() {
        // Thursday start: the Thu-Sat stub consumes the first budget week
        // without containing a Wednesday, leaving 51 Wednesdays.
        let items: Vec<ContentItem> =
            (1..=60).map(|n| item(n, VideoType::LongForm, None)).collect();
        let preferences = prefs(&[3], 1);
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        let start = date(2026, 1, 1);
        assert_eq!(start.weekday(), Weekday::Thu);

        let assignments = generate_schedule(&candidates, &preferences, Language::En, start);
        assert_eq!(assignments.len(), 51);
        assert_eq!(assignments[0].date, date(2026, 1, 7));
        assert_eq!(assignments.last().unwrap().date, date(2026, 12, 23));
    }

    #[test]
    fn zero_frequency_places_nothing() {
        let items = vec![item(1, VideoType::LongForm, None)];
        let preferences = prefs(&[1, 2, 3], 0);
        let candidates = eligible_candidates(&items, &preferences, Language::En);
        assert!(
            generate_schedule(&candidates, &preferences, Language::En, date(2026, 1, 1))
                .is_empty()
        );
    }
}
