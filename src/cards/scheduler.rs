//! Fixed-interval review scheduling
//!
//! Deliberately a small lookup table, not a full spaced-repetition
//! algorithm: no ease factors, no interval growth, no clamping. Each answer
//! quality maps to a state transition and a fixed offset from now.
//!
//! `mastered` is a terminal state with no entry transition here; answers
//! never produce it.

use chrono::{DateTime, Duration, Utc};

use super::models::{CardState, ReviewQuality};

/// Result of answering a card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub state: CardState,
    pub next_review_date: DateTime<Utc>,
}

/// Apply one answer to a card's state.
///
/// | quality | state transition                        | next review |
/// |---------|-----------------------------------------|-------------|
/// | again   | always -> learning                      | now         |
/// | hard    | always -> learning                      | now + 1d    |
/// | good    | new -> learning, otherwise unchanged    | now + 3d    |
/// | easy    | new/learning -> review, else unchanged  | now + 7d    |
pub fn apply_answer(
    state: CardState,
    quality: ReviewQuality,
    now: DateTime<Utc>,
) -> ReviewOutcome {
    let state = match quality {
        ReviewQuality::Again | ReviewQuality::Hard => CardState::Learning,
        ReviewQuality::Good => match state {
            CardState::New => CardState::Learning,
            other => other,
        },
        ReviewQuality::Easy => match state {
            CardState::New | CardState::Learning => CardState::Review,
            other => other,
        },
    };

    ReviewOutcome {
        state,
        next_review_date: now + Duration::days(interval_days(quality)),
    }
}

/// The fixed offset, in days, an answer schedules the next review at.
/// Shown in review prompts so the user sees what each answer does.
pub fn interval_days(quality: ReviewQuality) -> i64 {
    match quality {
        ReviewQuality::Again => 0,
        ReviewQuality::Hard => 1,
        ReviewQuality::Good => 3,
        ReviewQuality::Easy => 7,
    }
}
