//! Title-similarity matching between synced external videos and internally
//! authored content items.
//!
//! Everything in this crate is pure and synchronous: it takes snapshots of
//! the two collections, scores candidates, and returns decisions. The caller
//! (the server) owns the snapshot reads and the link-store writes.

pub mod autolink;
pub mod filter;
pub mod reconcile;
pub mod similarity;

pub use autolink::{best_content_match, best_external_match, MatchDecision, DEFAULT_LINK_THRESHOLD};
pub use filter::{content_to_external_candidates, search_content, search_external};
pub use reconcile::{plan_reconciliation, ReconcilePlan};
pub use similarity::jaccard_score;
