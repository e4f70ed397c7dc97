// src/trainer.rs

use crate::catalog::ProblemCatalog;
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::mistakes::MistakeStore;
use crate::models::{
    AttemptOutcome, AttemptRecord, AttemptUpdate, MistakeEntry, Pattern, ProblemStatus,
};
use crate::progress::ProblemProgressStore;
use crate::recommend::RecommendationEngine;
use crate::storage::{SqliteStorage, Storage};
use crate::strength::PatternStrengthTracker;
use log::info;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Wires the catalog, the three stores, and the clock into one session.
///
/// One attempt reported by the host fans out to the progress store and the
/// strength tracker here; the stores themselves never reach into each
/// other.
pub struct Trainer {
    catalog: ProblemCatalog,
    mistakes: MistakeStore,
    strength: PatternStrengthTracker,
    progress: ProblemProgressStore,
    clock: Arc<dyn Clock>,
}

impl Trainer {
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        catalog: ProblemCatalog,
    ) -> Result<Self> {
        let mistakes = MistakeStore::load(storage.clone(), clock.clone())?;
        let strength = PatternStrengthTracker::load(storage.clone(), clock.clone())?;
        let progress = ProblemProgressStore::load(storage, clock.clone())?;
        Ok(Self {
            catalog,
            mistakes,
            strength,
            progress,
            clock,
        })
    }

    /// Sqlite-backed session with the bundled catalog and the system clock.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        info!("Opening trainer database: {:?}", db_path.as_ref());
        let storage = Arc::new(SqliteStorage::open(db_path)?);
        Self::new(storage, Arc::new(SystemClock), ProblemCatalog::bundled())
    }

    /// Processes one attempt: resolves the problem against the catalog,
    /// records progress, and folds the score into the pattern record when
    /// one was reported.
    pub fn record_attempt(&mut self, attempt: AttemptRecord) -> Result<AttemptOutcome> {
        let problem = self.catalog.get(attempt.problem_id).ok_or_else(|| {
            Error::Validation(format!("unknown problem id: {}", attempt.problem_id))
        })?;
        let pattern = problem.pattern;
        info!(
            "Processing attempt for {} (ID: {}, {})",
            problem.title, problem.id, pattern
        );

        let status = if attempt.solved {
            ProblemStatus::Solved
        } else {
            ProblemStatus::Attempted
        };
        let first_solve = self.progress.record_attempt(AttemptUpdate {
            problem_id: attempt.problem_id,
            status,
            score: attempt.score,
            time_minutes: attempt.time_minutes,
            hints_used: attempt.hints_used,
            code: attempt.code,
        })?;

        if let Some(score) = attempt.score {
            self.strength.update(pattern, attempt.solved, score)?;
        }

        Ok(AttemptOutcome {
            first_solve,
            total_solved: self.progress.solved_count(),
        })
    }

    /// Logs a mistake against a catalog problem, inferring pattern and
    /// title; pass `pattern` directly via `mistakes_mut` for free-form
    /// mistakes not tied to a problem.
    pub fn log_problem_mistake(
        &mut self,
        problem_id: i64,
        description: &str,
    ) -> Result<MistakeEntry> {
        let problem = self
            .catalog
            .get(problem_id)
            .ok_or_else(|| Error::Validation(format!("unknown problem id: {problem_id}")))?;
        let (pattern, title) = (problem.pattern, problem.title.clone());
        self.mistakes
            .log_mistake(pattern, Some(problem_id), &title, description)
    }

    pub fn review_mistake(&mut self, id: Uuid, quality: u8) -> Result<()> {
        self.mistakes.review_mistake(id, quality)
    }

    /// A read-only engine view over the current store state.
    pub fn recommender(&self) -> RecommendationEngine<'_> {
        RecommendationEngine::new(
            &self.catalog,
            &self.mistakes,
            &self.strength,
            &self.progress,
            self.clock.as_ref(),
        )
    }

    pub fn catalog(&self) -> &ProblemCatalog {
        &self.catalog
    }

    pub fn mistakes(&self) -> &MistakeStore {
        &self.mistakes
    }

    pub fn mistakes_mut(&mut self) -> &mut MistakeStore {
        &mut self.mistakes
    }

    pub fn strength(&self) -> &PatternStrengthTracker {
        &self.strength
    }

    pub fn strength_mut(&mut self) -> &mut PatternStrengthTracker {
        &mut self.strength
    }

    pub fn progress(&self) -> &ProblemProgressStore {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProblemProgressStore {
        &mut self.progress
    }

    pub fn solved_count(&self) -> usize {
        self.progress.solved_count()
    }

    /// Patterns the mistake log says need attention, weakest first.
    pub fn weak_patterns(&self) -> Vec<Pattern> {
        self.mistakes
            .weak_patterns()
            .into_iter()
            .map(|w| w.pattern)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn trainer() -> Trainer {
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        Trainer::new(
            Arc::new(MemoryStorage::new()),
            clock,
            ProblemCatalog::bundled(),
        )
        .unwrap()
    }

    #[test]
    fn attempt_updates_progress_and_strength() {
        let mut t = trainer();
        let outcome = t
            .record_attempt(AttemptRecord {
                problem_id: 1,
                solved: true,
                score: Some(3.0),
                time_minutes: Some(12.0),
                hints_used: 0,
                code: "use std::collections::HashMap;".to_string(),
            })
            .unwrap();

        assert!(outcome.first_solve);
        assert_eq!(outcome.total_solved, 1);
        assert_eq!(t.progress().status(1), ProblemStatus::Solved);
        let record = t.strength().get(Pattern::ArraysAndHashing).unwrap();
        assert_eq!(record.attempted, 1);
        assert_eq!(record.avg_score, 3.0);
    }

    #[test]
    fn scoreless_attempt_skips_strength() {
        let mut t = trainer();
        t.record_attempt(AttemptRecord {
            problem_id: 10,
            solved: false,
            score: None,
            time_minutes: None,
            hints_used: 2,
            code: String::new(),
        })
        .unwrap();

        assert_eq!(t.progress().status(10), ProblemStatus::Attempted);
        assert_eq!(t.strength().get(Pattern::Stack).unwrap().attempted, 0);
    }

    #[test]
    fn unknown_problem_rejected() {
        let mut t = trainer();
        let result = t.record_attempt(AttemptRecord {
            problem_id: 9999,
            solved: true,
            score: Some(4.0),
            time_minutes: None,
            hints_used: 0,
            code: String::new(),
        });
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn problem_mistake_inherits_catalog_metadata() {
        let mut t = trainer();
        let entry = t.log_problem_mistake(31, "flood fill visited set").unwrap();
        assert_eq!(entry.pattern, Pattern::Graphs);
        assert_eq!(entry.problem_title, "Number of Islands");
        assert_eq!(entry.problem_id, Some(31));
    }
}
