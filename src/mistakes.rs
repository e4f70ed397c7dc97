// src/mistakes.rs

//! Mistake log with SM-2 spaced-repetition scheduling.
//!
//! Quality ratings (0-5):
//! - 0-2: failed recall, the schedule resets
//! - 3: correct with serious difficulty
//! - 4: correct after hesitation
//! - 5: perfect recall

use crate::clock::Clock;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::models::{MistakeEntry, Pattern, WeakPattern};
use crate::storage::Storage;
use chrono::Duration;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

const NAMESPACE: &str = "mistakes";

/// Owns the logged-mistake collection. Every mutation updates the in-memory
/// snapshot first and then persists the whole collection; a failed save
/// keeps the updated snapshot serving reads and surfaces the error.
pub struct MistakeStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    entries: Vec<MistakeEntry>,
}

impl MistakeStore {
    pub fn load(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Result<Self> {
        let entries = match storage.load(NAMESPACE)? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Vec::new(),
        };
        Ok(Self {
            storage,
            clock,
            entries,
        })
    }

    fn persist(&self) -> Result<()> {
        let blob = serde_json::to_string(&self.entries)?;
        if let Err(e) = self.storage.save(NAMESPACE, &blob) {
            warn!("[Mistakes] snapshot not persisted, serving from memory: {e}");
            return Err(e);
        }
        Ok(())
    }

    /// Logs a new mistake, scheduled for its first review tomorrow.
    pub fn log_mistake(
        &mut self,
        pattern: Pattern,
        problem_id: Option<i64>,
        problem_title: &str,
        description: &str,
    ) -> Result<MistakeEntry> {
        let today = self.clock.today();
        let entry = MistakeEntry {
            id: Uuid::new_v4(),
            pattern,
            problem_id,
            problem_title: problem_title.to_string(),
            description: description.to_string(),
            created_at: today,
            next_review: today + Duration::days(INTERVAL_FIRST_PASS),
            interval: INTERVAL_FIRST_PASS,
            ease_factor: EASE_FACTOR_DEFAULT,
            repetitions: 0,
            streak: 0,
        };
        info!(
            "[Mistakes] Logged '{}' ({}), first review {}",
            entry.problem_title, pattern, entry.next_review
        );
        self.entries.insert(0, entry.clone());
        self.persist()?;
        Ok(entry)
    }

    /// Applies one SM-2 review. Out-of-range quality is a validation error;
    /// an unknown id is a no-op, so stale UI references cannot crash a
    /// session.
    pub fn review_mistake(&mut self, id: Uuid, quality: u8) -> Result<()> {
        if quality > QUALITY_MAX {
            return Err(Error::Validation(format!(
                "quality must be 0-{QUALITY_MAX}, got {quality}"
            )));
        }

        let today = self.clock.today();
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            debug!("[Mistakes] review for unknown id {id}, ignoring");
            return Ok(());
        };

        // Snapshot old state for logging
        let old_ease = entry.ease_factor;
        let old_interval = entry.interval;

        // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3
        let q = f64::from(quality);
        let new_ease = (entry.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02)))
            .max(EASE_FACTOR_MIN);

        if quality < QUALITY_PASS_THRESHOLD {
            // Failed recall: schedule restarts from scratch
            entry.repetitions = 0;
            entry.interval = INTERVAL_FIRST_PASS;
            entry.streak = 0;
        } else {
            entry.repetitions += 1;
            entry.streak += 1;
            entry.interval = match entry.repetitions {
                1 => INTERVAL_FIRST_PASS,
                2 => INTERVAL_SECOND_PASS,
                _ => (entry.interval as f64 * new_ease).round() as i64,
            };
        }

        entry.ease_factor = new_ease;
        entry.next_review = today + Duration::days(entry.interval);

        info!(
            "[SM-2 Result] Mistake {}: Ease {:.2} -> {:.2}, Interval {}d -> {}d, next {}",
            id, old_ease, entry.ease_factor, old_interval, entry.interval, entry.next_review
        );

        self.persist()
    }

    /// Removes one entry. Unknown ids are ignored, same policy as review.
    pub fn remove_mistake(&mut self, id: Uuid) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            debug!("[Mistakes] remove for unknown id {id}, ignoring");
            return Ok(());
        }
        self.persist()
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    /// All entries, newest first.
    pub fn all(&self) -> &[MistakeEntry] {
        &self.entries
    }

    /// Entries whose next review date has arrived (inclusive of today).
    pub fn due_for_review(&self) -> Vec<&MistakeEntry> {
        let today = self.clock.today();
        self.entries
            .iter()
            .filter(|e| e.next_review <= today)
            .collect()
    }

    pub fn mistakes_by_pattern(&self) -> BTreeMap<Pattern, Vec<&MistakeEntry>> {
        let mut grouped: BTreeMap<Pattern, Vec<&MistakeEntry>> = BTreeMap::new();
        for entry in &self.entries {
            grouped.entry(entry.pattern).or_default().push(entry);
        }
        grouped
    }

    pub fn count_for_pattern(&self, pattern: Pattern) -> usize {
        self.entries.iter().filter(|e| e.pattern == pattern).count()
    }

    /// Patterns ranked weakest first by the average review streak of their
    /// tracked mistakes. Ties keep the canonical pattern order.
    pub fn weak_patterns(&self) -> Vec<WeakPattern> {
        let mut weak: Vec<WeakPattern> = self
            .mistakes_by_pattern()
            .into_iter()
            .map(|(pattern, entries)| {
                let count = entries.len() as u32;
                let streak_sum: u32 = entries.iter().map(|e| e.streak).sum();
                WeakPattern {
                    pattern,
                    count,
                    avg_streak: f64::from(streak_sum) / f64::from(count),
                }
            })
            .collect();
        weak.sort_by(|a, b| a.avg_streak.total_cmp(&b.avg_streak));
        weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() + Duration::days(i64::from(d))
    }

    fn store() -> (MistakeStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(day(0)));
        let store =
            MistakeStore::load(Arc::new(MemoryStorage::new()), clock.clone()).unwrap();
        (store, clock)
    }

    #[test]
    fn fresh_mistake_is_due_tomorrow() {
        let (mut store, clock) = store();
        let entry = store
            .log_mistake(Pattern::ArraysAndHashing, Some(1), "Two Sum", "forgot the map")
            .unwrap();

        assert_eq!(entry.interval, 1);
        assert_eq!(entry.ease_factor, EASE_FACTOR_DEFAULT);
        assert_eq!(entry.next_review, day(1));

        // Not due on the day it was logged
        assert!(store.due_for_review().is_empty());
        clock.set(day(1));
        assert_eq!(store.due_for_review().len(), 1);
    }

    #[test]
    fn sm2_pass_ladder() {
        let (mut store, clock) = store();
        let id = store
            .log_mistake(Pattern::Stack, None, "Valid Parentheses", "")
            .unwrap()
            .id;

        clock.set(day(1));
        store.review_mistake(id, 4).unwrap();
        let e = &store.all()[0];
        assert_eq!((e.interval, e.repetitions, e.streak), (1, 1, 1));

        clock.set(day(2));
        store.review_mistake(id, 4).unwrap();
        let e = &store.all()[0];
        assert_eq!((e.interval, e.repetitions), (6, 2));

        // Quality 4 leaves the ease factor untouched at 2.5, so the third
        // pass lands on round(6 * 2.5) = 15.
        clock.set(day(8));
        store.review_mistake(id, 4).unwrap();
        let e = &store.all()[0];
        assert_eq!(e.interval, 15);
        assert_eq!(e.ease_factor, 2.5);
        assert_eq!(e.next_review, day(8) + Duration::days(15));
    }

    #[test]
    fn failed_review_resets_schedule() {
        let (mut store, clock) = store();
        let id = store
            .log_mistake(Pattern::Graphs, None, "Course Schedule", "")
            .unwrap()
            .id;

        clock.set(day(1));
        store.review_mistake(id, 5).unwrap();
        store.review_mistake(id, 5).unwrap();
        assert_eq!(store.all()[0].repetitions, 2);

        store.review_mistake(id, 2).unwrap();
        let e = &store.all()[0];
        assert_eq!((e.interval, e.repetitions, e.streak), (1, 0, 0));
    }

    #[test]
    fn ease_factor_never_drops_below_floor() {
        let (mut store, _clock) = store();
        let id = store
            .log_mistake(Pattern::Greedy, None, "Candy", "")
            .unwrap()
            .id;

        for _ in 0..20 {
            store.review_mistake(id, 0).unwrap();
        }
        assert!(store.all()[0].ease_factor >= EASE_FACTOR_MIN);
        assert_eq!(store.all()[0].ease_factor, EASE_FACTOR_MIN);
    }

    #[test]
    fn review_quality_out_of_range_rejected() {
        let (mut store, _clock) = store();
        let id = store
            .log_mistake(Pattern::Tries, None, "Word Search II", "")
            .unwrap()
            .id;
        assert!(matches!(
            store.review_mistake(id, 6),
            Err(Error::Validation(_))
        ));
        // State untouched by the rejected call
        assert_eq!(store.all()[0].repetitions, 0);
    }

    #[test]
    fn review_unknown_id_is_a_no_op() {
        let (mut store, _clock) = store();
        store
            .log_mistake(Pattern::Intervals, None, "Merge Intervals", "")
            .unwrap();
        store.review_mistake(Uuid::new_v4(), 4).unwrap();
        assert_eq!(store.all()[0].repetitions, 0);
    }

    #[test]
    fn weak_patterns_sorted_by_avg_streak() {
        let (mut store, clock) = store();
        let strong = store
            .log_mistake(Pattern::ArraysAndHashing, None, "Two Sum", "")
            .unwrap()
            .id;
        store
            .log_mistake(Pattern::Graphs, None, "Word Ladder", "")
            .unwrap();

        clock.set(day(1));
        store.review_mistake(strong, 4).unwrap();

        let weak = store.weak_patterns();
        assert_eq!(weak.len(), 2);
        // Streak 0 sorts before streak 1
        assert_eq!(weak[0].pattern, Pattern::Graphs);
        assert_eq!(weak[0].avg_streak, 0.0);
        assert_eq!(weak[1].pattern, Pattern::ArraysAndHashing);
        assert_eq!(weak[1].avg_streak, 1.0);
    }

    #[test]
    fn remove_and_clear_persist() {
        let (mut store, _clock) = store();
        let id = store
            .log_mistake(Pattern::Trees, None, "Invert Binary Tree", "")
            .unwrap()
            .id;
        store
            .log_mistake(Pattern::Trees, None, "Binary Tree Maximum Path Sum", "")
            .unwrap();

        store.remove_mistake(id).unwrap();
        assert_eq!(store.all().len(), 1);
        store.clear_all().unwrap();
        assert!(store.all().is_empty());
    }

    #[test]
    fn collection_round_trips_through_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::new(day(0)));
        {
            let mut store = MistakeStore::load(storage.clone(), clock.clone()).unwrap();
            store
                .log_mistake(Pattern::LinkedList, Some(16), "Reverse Linked List", "lost the prev pointer")
                .unwrap();
        }
        let reloaded = MistakeStore::load(storage, clock).unwrap();
        assert_eq!(reloaded.all().len(), 1);
        assert_eq!(reloaded.all()[0].problem_title, "Reverse Linked List");
        assert_eq!(reloaded.all()[0].ease_factor, EASE_FACTOR_DEFAULT);
    }
}
