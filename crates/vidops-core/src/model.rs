//! Shared domain model for the content-operations pipeline.
//!
//! Content items carry one [`LanguageTrack`] per channel language; all
//! per-language access goes through an explicit [`Language`] value rather
//! than string-built field names.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// A channel language. Every account runs one channel per language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::En, Self::Es];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(CoreError::InvalidLanguage(other.to_string())),
        }
    }
}

/// Pipeline status of one language version of a content item.
///
/// The declaration order defines the total order used everywhere:
/// `Idea < Scripted < Recorded < Edited < Unlisted < Published`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    #[default]
    Idea,
    Scripted,
    Recorded,
    Edited,
    Unlisted,
    Published,
}

impl VideoStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Scripted => "scripted",
            Self::Recorded => "recorded",
            Self::Edited => "edited",
            Self::Unlisted => "unlisted",
            Self::Published => "published",
        }
    }

    /// Whether this status is eligible for auto-scheduling.
    ///
    /// Any status before `Published` counts as a draft for planning purposes;
    /// whether the item is actually scheduled is decided by the presence of a
    /// publication date, not by status alone.
    #[must_use]
    pub fn is_schedulable(self) -> bool {
        self < Self::Published
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idea" => Ok(Self::Idea),
            "scripted" => Ok(Self::Scripted),
            "recorded" => Ok(Self::Recorded),
            "edited" => Ok(Self::Edited),
            "unlisted" => Ok(Self::Unlisted),
            "published" => Ok(Self::Published),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// Long-form vs. short-form content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoType {
    #[serde(rename = "long-form")]
    LongForm,
    #[serde(rename = "short-form")]
    ShortForm,
}

impl VideoType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LongForm => "long-form",
            Self::ShortForm => "short-form",
        }
    }
}

impl FromStr for VideoType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "long-form" => Ok(Self::LongForm),
            "short-form" => Ok(Self::ShortForm),
            other => Err(CoreError::InvalidVideoType(other.to_string())),
        }
    }
}

/// Format constraint applied when generating a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FormatMix {
    #[default]
    #[serde(rename = "balanced")]
    Balanced,
    #[serde(rename = "long-form")]
    LongFormOnly,
    #[serde(rename = "short-form")]
    ShortFormOnly,
}

impl FromStr for FormatMix {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balanced" => Ok(Self::Balanced),
            "long-form" => Ok(Self::LongFormOnly),
            "short-form" => Ok(Self::ShortFormOnly),
            other => Err(CoreError::InvalidFormatMix(other.to_string())),
        }
    }
}

/// One language version of a content item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageTrack {
    pub main_title: Option<String>,
    pub status: VideoStatus,
    /// Only meaningful once the status reaches `Unlisted`/`Published`; the
    /// scheduler treats any track with a date set as already scheduled.
    pub publication_date: Option<DateTime<Utc>>,
    pub youtube_link: Option<String>,
}

/// An internally authored video concept spanning both language variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Sequential number, unique per account, assigned at creation.
    pub video_number: i32,
    pub internal_title: String,
    pub video_type: VideoType,
    pub topic_id: Option<Uuid>,
    pub en: LanguageTrack,
    pub es: LanguageTrack,
    pub created_at: DateTime<Utc>,
}

impl ContentItem {
    #[must_use]
    pub fn track(&self, language: Language) -> &LanguageTrack {
        match language {
            Language::En => &self.en,
            Language::Es => &self.es,
        }
    }

    #[must_use]
    pub fn track_mut(&mut self, language: Language) -> &mut LanguageTrack {
        match language {
            Language::En => &mut self.en,
            Language::Es => &mut self.es,
        }
    }
}

/// Snapshot of one externally hosted video, refreshed by the sync job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalVideo {
    pub id: Uuid,
    pub account_id: Uuid,
    pub channel_id: Uuid,
    /// Platform video identifier (the `v=` parameter of a watch URL).
    pub external_id: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub duration_seconds: Option<i32>,
    pub is_short: Option<bool>,
    /// Back-reference to the linked [`ContentItem`], if any.
    pub linked_content_id: Option<Uuid>,
}

impl ExternalVideo {
    /// Short/long classification: explicit flag first, duration fallback,
    /// `None` when neither is known.
    #[must_use]
    pub fn short_classification(&self) -> Option<bool> {
        self.is_short
            .or_else(|| self.duration_seconds.map(|secs| secs <= 60))
    }

    /// Canonical watch URL stored on the content side of a link.
    #[must_use]
    pub fn watch_url(&self) -> String {
        format!("https://youtube.com/watch?v={}", self.external_id)
    }
}

/// One externally hosted channel; each account has one per language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub account_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub language: Language,
}

/// A named grouping tag used by the gap analyzer and schedule generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub color: String,
    pub keywords: Vec<String>,
}

/// Per-language auto-scheduling preferences for one planning session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingPreferences {
    /// Weekday indices, 0 = Sunday through 6 = Saturday.
    pub days_of_week: BTreeSet<u8>,
    /// Maximum posts per week.
    pub frequency: u32,
    pub format_mix: FormatMix,
    /// Topic filter; empty means no filter.
    pub selected_topics: BTreeSet<Uuid>,
}

impl Default for SchedulingPreferences {
    fn default() -> Self {
        Self {
            days_of_week: [1, 3, 5].into_iter().collect(), // Mon, Wed, Fri
            frequency: 3,
            format_mix: FormatMix::Balanced,
            selected_topics: BTreeSet::new(),
        }
    }
}
