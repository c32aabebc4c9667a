//! Content-gap analysis and publication scheduling.
//!
//! Like the linking crate, everything here is pure: the caller loads a
//! snapshot of content items and topics, runs the analysis or the schedule
//! walk in memory, and persists the result itself.

pub mod gap;
pub mod schedule;

pub use gap::{analyze_gap, FormatNeed, GapReport, TopicBreakdown, DEFAULT_LONG_FORM_SHARE};
pub use schedule::{eligible_candidates, generate_schedule, Assignment, MAX_SCHEDULE_WEEKS};
