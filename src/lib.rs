// src/lib.rs

//! Adaptive mastery and spaced-repetition engine for coding-interview
//! practice.
//!
//! Three stores own the user's state: [`mistakes::MistakeStore`] schedules
//! mistake re-tests with an SM-2 variant, [`strength::PatternStrengthTracker`]
//! keeps per-pattern proficiency, and [`progress::ProblemProgressStore`]
//! tracks per-problem attempt history. The read-only
//! [`recommend::RecommendationEngine`] ranks patterns by urgency over those
//! stores and a static problem catalog, and [`trainer::Trainer`] wires the
//! pieces into one session.
//!
//! Persistence and time are collaborators: each store saves its whole
//! collection through a [`storage::Storage`] handle on every mutation, and
//! all date math flows through an injected [`clock::Clock`], which keeps
//! interval scheduling and the daily challenge deterministic under test.

pub mod catalog;
pub mod clock;
pub mod constants;
pub mod error;
pub mod mistakes;
pub mod models;
pub mod progress;
pub mod recommend;
pub mod storage;
pub mod strength;
pub mod trainer;

pub use catalog::ProblemCatalog;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use mistakes::MistakeStore;
pub use models::{
    AttemptOutcome, AttemptRecord, Difficulty, Level, MistakeEntry, Pattern, PatternCoverage,
    PatternStrength, ProblemInfo, ProblemProgressEntry, ProblemStatus, Readiness, Recommendation,
    WeakPattern,
};
pub use progress::ProblemProgressStore;
pub use recommend::RecommendationEngine;
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use strength::PatternStrengthTracker;
pub use trainer::Trainer;
