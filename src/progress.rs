// src/progress.rs

use crate::clock::Clock;
use crate::constants::SCORE_MAX;
use crate::error::{Error, Result};
use crate::models::{AttemptUpdate, ProblemProgressEntry, ProblemStatus};
use crate::storage::Storage;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

const NAMESPACE: &str = "problem_progress";

/// Attempt history per problem. Best score and best time are monotone:
/// a bad day never erases a good one. A problem that has reached `Solved`
/// stays solved even if later attempts fail.
pub struct ProblemProgressStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    entries: BTreeMap<i64, ProblemProgressEntry>,
}

impl ProblemProgressStore {
    pub fn load(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Result<Self> {
        let persisted: Vec<ProblemProgressEntry> = match storage.load(NAMESPACE)? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Vec::new(),
        };
        let entries = persisted.into_iter().map(|e| (e.problem_id, e)).collect();
        Ok(Self {
            storage,
            clock,
            entries,
        })
    }

    fn persist(&self) -> Result<()> {
        let snapshot: Vec<&ProblemProgressEntry> = self.entries.values().collect();
        let blob = serde_json::to_string(&snapshot)?;
        if let Err(e) = self.storage.save(NAMESPACE, &blob) {
            warn!("[Progress] snapshot not persisted, serving from memory: {e}");
            return Err(e);
        }
        Ok(())
    }

    /// Records one attempt. Returns true when this attempt moved the
    /// problem into `Solved` for the first time.
    pub fn record_attempt(&mut self, update: AttemptUpdate) -> Result<bool> {
        if let Some(score) = update.score {
            if !(0.0..=SCORE_MAX).contains(&score) {
                return Err(Error::Validation(format!(
                    "score must be 0-{SCORE_MAX}, got {score}"
                )));
            }
        }
        if let Some(time) = update.time_minutes {
            if !time.is_finite() || time < 0.0 {
                return Err(Error::Validation(format!(
                    "time_minutes must be non-negative, got {time}"
                )));
            }
        }

        let today = self.clock.today();
        let entry = self
            .entries
            .entry(update.problem_id)
            .or_insert_with(|| ProblemProgressEntry {
                problem_id: update.problem_id,
                status: ProblemStatus::Unseen,
                attempts: 0,
                best_score: None,
                best_time_minutes: None,
                last_attempted: today,
                hints_used: 0,
                code: String::new(),
            });

        let first_solve =
            update.status == ProblemStatus::Solved && entry.status != ProblemStatus::Solved;

        entry.attempts += 1;
        if update.status == ProblemStatus::Solved {
            entry.status = ProblemStatus::Solved;
        } else if entry.status != ProblemStatus::Solved {
            entry.status = update.status;
        }
        if let Some(score) = update.score {
            entry.best_score = Some(entry.best_score.unwrap_or(0.0).max(score));
        }
        if let Some(time) = update.time_minutes {
            entry.best_time_minutes =
                Some(entry.best_time_minutes.unwrap_or(f64::INFINITY).min(time));
        }
        entry.last_attempted = today;
        entry.hints_used = update.hints_used;
        entry.code = update.code;

        if first_solve {
            info!("[Progress] Problem {} solved for the first time", update.problem_id);
        }

        self.persist()?;
        Ok(first_solve)
    }

    /// `Unseen` for problems with no recorded attempts.
    pub fn status(&self, problem_id: i64) -> ProblemStatus {
        self.entries
            .get(&problem_id)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    pub fn get(&self, problem_id: i64) -> Option<&ProblemProgressEntry> {
        self.entries.get(&problem_id)
    }

    pub fn all(&self) -> impl Iterator<Item = &ProblemProgressEntry> {
        self.entries.values()
    }

    pub fn solved_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.status == ProblemStatus::Solved)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn attempt(problem_id: i64, status: ProblemStatus) -> AttemptUpdate {
        AttemptUpdate {
            problem_id,
            status,
            score: None,
            time_minutes: None,
            hints_used: 0,
            code: String::new(),
        }
    }

    fn store() -> ProblemProgressStore {
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        ProblemProgressStore::load(Arc::new(MemoryStorage::new()), clock).unwrap()
    }

    #[test]
    fn unknown_problem_is_unseen() {
        let store = store();
        assert_eq!(store.status(42), ProblemStatus::Unseen);
    }

    #[test]
    fn first_solve_reported_once() {
        let mut store = store();
        assert!(!store
            .record_attempt(attempt(1, ProblemStatus::Attempted))
            .unwrap());
        assert!(store
            .record_attempt(attempt(1, ProblemStatus::Solved))
            .unwrap());
        assert!(!store
            .record_attempt(attempt(1, ProblemStatus::Solved))
            .unwrap());
        assert_eq!(store.get(1).unwrap().attempts, 3);
        assert_eq!(store.solved_count(), 1);
    }

    #[test]
    fn solved_status_never_regresses() {
        let mut store = store();
        store.record_attempt(attempt(5, ProblemStatus::Solved)).unwrap();
        store
            .record_attempt(attempt(5, ProblemStatus::Attempted))
            .unwrap();
        assert_eq!(store.status(5), ProblemStatus::Solved);
    }

    #[test]
    fn best_score_and_time_are_monotone() {
        let mut store = store();
        let mut a = attempt(7, ProblemStatus::Solved);
        a.score = Some(3.0);
        a.time_minutes = Some(30.0);
        store.record_attempt(a).unwrap();

        let mut b = attempt(7, ProblemStatus::Solved);
        b.score = Some(2.0);
        b.time_minutes = Some(45.0);
        store.record_attempt(b).unwrap();

        let entry = store.get(7).unwrap();
        assert_eq!(entry.best_score, Some(3.0));
        assert_eq!(entry.best_time_minutes, Some(30.0));

        let mut c = attempt(7, ProblemStatus::Solved);
        c.score = Some(4.0);
        c.time_minutes = Some(12.0);
        store.record_attempt(c).unwrap();

        let entry = store.get(7).unwrap();
        assert_eq!(entry.best_score, Some(4.0));
        assert_eq!(entry.best_time_minutes, Some(12.0));
    }

    #[test]
    fn hints_and_code_always_overwritten() {
        let mut store = store();
        let mut a = attempt(3, ProblemStatus::Attempted);
        a.hints_used = 2;
        a.code = "fn brute_force() {}".to_string();
        store.record_attempt(a).unwrap();

        let mut b = attempt(3, ProblemStatus::Solved);
        b.hints_used = 0;
        b.code = "fn linear() {}".to_string();
        store.record_attempt(b).unwrap();

        let entry = store.get(3).unwrap();
        assert_eq!(entry.hints_used, 0);
        assert_eq!(entry.code, "fn linear() {}");
    }

    #[test]
    fn invalid_score_rejected() {
        let mut store = store();
        let mut a = attempt(9, ProblemStatus::Solved);
        a.score = Some(5.0);
        assert!(store.record_attempt(a).is_err());
        assert_eq!(store.status(9), ProblemStatus::Unseen);
    }

    #[test]
    fn round_trips_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        ));
        {
            let mut store = ProblemProgressStore::load(storage.clone(), clock.clone()).unwrap();
            let mut a = attempt(11, ProblemStatus::Solved);
            a.score = Some(3.5);
            store.record_attempt(a).unwrap();
        }
        let store = ProblemProgressStore::load(storage, clock).unwrap();
        assert_eq!(store.status(11), ProblemStatus::Solved);
        assert_eq!(store.get(11).unwrap().best_score, Some(3.5));
    }
}
