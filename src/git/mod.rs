//! Git integration
//!
//! Optional version control for the workspace directory. The core stores
//! never call this; the surrounding application (here, the CLI) triggers a
//! commit after structural changes when it wants a snapshot.

mod repository;

pub use repository::*;
