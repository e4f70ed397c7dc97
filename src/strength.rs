// src/strength.rs

use crate::clock::Clock;
use crate::constants::SCORE_MAX;
use crate::error::{Error, Result};
use crate::models::{Pattern, PatternStrength};
use crate::storage::Storage;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

const NAMESPACE: &str = "pattern_strength";

/// Per-pattern proficiency records over the whole closed pattern universe.
///
/// Construction reconciles the persisted snapshot against `Pattern::ALL`:
/// every pattern gets a zeroed record up front, so the read paths never
/// have to handle a missing topic.
pub struct PatternStrengthTracker {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    records: BTreeMap<Pattern, PatternStrength>,
}

impl PatternStrengthTracker {
    pub fn load(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Result<Self> {
        let persisted: Vec<PatternStrength> = match storage.load(NAMESPACE)? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Vec::new(),
        };

        let mut records: BTreeMap<Pattern, PatternStrength> = Pattern::ALL
            .into_iter()
            .map(|p| (p, PatternStrength::zeroed(p)))
            .collect();
        let seeded = records.len() - persisted.len().min(records.len());
        for record in persisted {
            records.insert(record.pattern, record);
        }
        if seeded > 0 {
            debug!("[Strength] seeded {seeded} zero-state pattern records");
        }

        Ok(Self {
            storage,
            clock,
            records,
        })
    }

    fn persist(&self) -> Result<()> {
        let snapshot: Vec<&PatternStrength> = self.records.values().collect();
        let blob = serde_json::to_string(&snapshot)?;
        if let Err(e) = self.storage.save(NAMESPACE, &blob) {
            warn!("[Strength] snapshot not persisted, serving from memory: {e}");
            return Err(e);
        }
        Ok(())
    }

    /// Folds one practice result into the pattern's running record.
    pub fn update(&mut self, pattern: Pattern, solved: bool, score: f64) -> Result<()> {
        if !(0.0..=SCORE_MAX).contains(&score) {
            return Err(Error::Validation(format!(
                "score must be 0-{SCORE_MAX}, got {score}"
            )));
        }

        let today = self.clock.today();
        let record = self
            .records
            .entry(pattern)
            .or_insert_with(|| PatternStrength::zeroed(pattern));

        // Incremental mean keeps the stored average exact without replaying
        // the full score history.
        let attempted = f64::from(record.attempted);
        record.avg_score = (record.avg_score * attempted + score) / (attempted + 1.0);
        record.attempted += 1;
        if solved {
            record.solved += 1;
        }
        record.last_practiced = Some(today);

        info!(
            "[Strength] {}: {}/{} solved, avg {:.1}",
            pattern,
            record.solved,
            record.attempted,
            record.display_avg()
        );

        self.persist()
    }

    pub fn get(&self, pattern: Pattern) -> Option<&PatternStrength> {
        self.records.get(&pattern)
    }

    pub fn all(&self) -> impl Iterator<Item = &PatternStrength> {
        self.records.values()
    }

    /// Lowest average score first, practiced patterns only.
    pub fn weakest(&self, n: usize) -> Vec<&PatternStrength> {
        let mut practiced: Vec<&PatternStrength> =
            self.records.values().filter(|r| r.attempted > 0).collect();
        practiced.sort_by(|a, b| a.avg_score.total_cmp(&b.avg_score));
        practiced.truncate(n);
        practiced
    }

    /// Highest average score first, practiced patterns only.
    pub fn strongest(&self, n: usize) -> Vec<&PatternStrength> {
        let mut practiced: Vec<&PatternStrength> =
            self.records.values().filter(|r| r.attempted > 0).collect();
        practiced.sort_by(|a, b| b.avg_score.total_cmp(&a.avg_score));
        practiced.truncate(n);
        practiced
    }
}
