//! Relevance scoring for search matches.
//!
//! Scores are bands rather than probabilities: what-you-typed sits at the top
//! for query-like input, history decays from just below it, and remote
//! suggestions fill a narrow band underneath. Secondary (default-while-keyword)
//! engines get much lower bases so they never outrank the engine the user
//! explicitly invoked.

use chrono::{DateTime, Utc};

use crate::input::InputType;

/// Relevance of the what-you-typed match while a keyword engine is active.
pub const KEYWORD_WHAT_YOU_TYPED: u32 = 250;

/// Score for searching the raw input text.
pub fn for_what_you_typed(input_type: InputType, keyword_active: bool) -> u32 {
    if keyword_active {
        return KEYWORD_WHAT_YOU_TYPED;
    }
    match input_type {
        InputType::Unknown | InputType::Query | InputType::ForcedQuery => 1300,
        InputType::RequestedUrl => 1150,
        InputType::Url => 850,
        InputType::Invalid => 0,
    }
}

/// Score for a past search made `elapsed_secs` seconds ago.
///
/// The discount curve costs about 50 points after 15 minutes and about 450
/// points after two weeks. Never negative.
pub fn for_history(elapsed_secs: f64, is_primary: bool, input_type: InputType) -> u32 {
    let elapsed = elapsed_secs.max(0.0);
    let discount = (6.5 * elapsed.powf(0.3)) as i64;
    let base: i64 = if !is_primary {
        200
    } else if input_type.is_url() {
        750
    } else {
        1050
    };
    (base - discount).max(0) as u32
}

/// [`for_history`] measured from a timestamp.
pub fn for_history_at(
    last_used: DateTime<Utc>,
    now: DateTime<Utc>,
    is_primary: bool,
    input_type: InputType,
) -> u32 {
    let elapsed = (now - last_used).num_milliseconds() as f64 / 1000.0;
    for_history(elapsed, is_primary, input_type)
}

/// Score for the suggestion at `rank` out of `total` from one engine.
pub fn for_suggestion(total: usize, rank: usize, is_primary: bool, input_type: InputType) -> u32 {
    debug_assert!(rank < total);
    let base = if !is_primary {
        100
    } else if input_type.is_url() {
        300
    } else {
        600
    };
    base + rank_bonus(total, rank)
}

/// Score for the navigation suggestion at `rank` out of `total`.
pub fn for_navigation(total: usize, rank: usize, is_primary: bool) -> u32 {
    debug_assert!(rank < total);
    let base = if is_primary { 800 } else { 150 };
    base + rank_bonus(total, rank)
}

fn rank_bonus(total: usize, rank: usize) -> u32 {
    total.saturating_sub(1).saturating_sub(rank) as u32
}
