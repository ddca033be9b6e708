//! Review sessions
//!
//! A session is an ephemeral shuffled queue drawn from the due cards. It
//! holds a private snapshot of the cards it will visit; the card store
//! remains the source of truth and is updated through each answer.

pub mod session;

pub use session::{ReviewController, ReviewSession, SessionProgress};
