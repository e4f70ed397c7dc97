// src/recommend.rs

//! Recommendation and readiness scoring over the three stores.
//!
//! Everything here is a pure function of current store state plus the
//! injected clock: the engine owns nothing and mutates nothing, so a host
//! can rebuild it per call or keep one around, same answer either way.

use crate::catalog::ProblemCatalog;
use crate::clock::{days_since_epoch, Clock};
use crate::constants::*;
use crate::mistakes::MistakeStore;
use crate::models::{
    Difficulty, Level, Pattern, PatternCoverage, ProblemInfo, ProblemStatus, Readiness,
    Recommendation,
};
use crate::progress::ProblemProgressStore;
use crate::strength::PatternStrengthTracker;
use log::{debug, info};

pub struct RecommendationEngine<'a> {
    catalog: &'a ProblemCatalog,
    mistakes: &'a MistakeStore,
    strength: &'a PatternStrengthTracker,
    progress: &'a ProblemProgressStore,
    clock: &'a dyn Clock,
}

impl<'a> RecommendationEngine<'a> {
    pub fn new(
        catalog: &'a ProblemCatalog,
        mistakes: &'a MistakeStore,
        strength: &'a PatternStrengthTracker,
        progress: &'a ProblemProgressStore,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            catalog,
            mistakes,
            strength,
            progress,
            clock,
        }
    }

    // --- Urgency Ranking ---

    /// How badly a pattern needs practice right now. Combines weakness,
    /// tracked mistakes, staleness, and the unsolved fraction of attempts.
    pub fn urgency_score(&self, pattern: Pattern) -> f64 {
        let today = self.clock.today();
        let record = self.strength.get(pattern);
        let (attempted, solved, avg_score, last_practiced) = match record {
            Some(r) => (r.attempted, r.solved, r.avg_score, r.last_practiced),
            None => (0, 0, 0.0, None),
        };

        let mut score = if attempted > 0 {
            (SCORE_MAX - avg_score) * URGENCY_WEAKNESS_WEIGHT
        } else {
            URGENCY_UNPRACTICED
        };

        score += self.mistakes.count_for_pattern(pattern) as f64 * URGENCY_MISTAKE_WEIGHT;

        // Never practiced counts as infinitely stale
        let days_idle = last_practiced
            .map(|d| today.signed_duration_since(d).num_days())
            .unwrap_or(i64::MAX);
        if days_idle > STALE_DAYS_LONG {
            score += URGENCY_STALE_LONG;
        } else if days_idle > STALE_DAYS_MEDIUM {
            score += URGENCY_STALE_MEDIUM;
        } else if days_idle > STALE_DAYS_SHORT {
            score += URGENCY_STALE_SHORT;
        }

        if attempted > 0 {
            let unsolved = 1.0 - f64::from(solved) / f64::from(attempted);
            score += unsolved * URGENCY_UNSOLVED_WEIGHT;
        }

        score
    }

    /// All patterns, most urgent first. Equal scores keep the canonical
    /// pattern order, so the ranking is deterministic.
    pub fn ranked_patterns(&self) -> Vec<(Pattern, f64)> {
        let mut ranked: Vec<(Pattern, f64)> = Pattern::ALL
            .into_iter()
            .map(|p| (p, self.urgency_score(p)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    // --- Problem Selection ---

    fn target_difficulty(&self, pattern: Pattern) -> Difficulty {
        match self.strength.get(pattern) {
            Some(r) if r.attempted > 0 => {
                if r.avg_score >= TARGET_HARD_MIN_AVG {
                    Difficulty::Hard
                } else if r.avg_score >= TARGET_MEDIUM_MIN_AVG {
                    Difficulty::Medium
                } else {
                    Difficulty::Easy
                }
            }
            _ => Difficulty::Easy,
        }
    }

    /// Best unsolved problem for a pattern: unseen problems first, then
    /// closest to the target difficulty, catalog order as the final tie
    /// break.
    pub fn pick_problem_from_pattern(
        &self,
        pattern: Pattern,
        preferred_difficulty: Option<Difficulty>,
    ) -> Option<&ProblemInfo> {
        let target = preferred_difficulty.unwrap_or_else(|| self.target_difficulty(pattern));
        let mut candidates: Vec<&ProblemInfo> = self
            .catalog
            .by_pattern(pattern)
            .into_iter()
            .filter(|p| self.progress.status(p.id) != ProblemStatus::Solved)
            .collect();
        candidates.sort_by_key(|p| {
            (
                self.progress.status(p.id) != ProblemStatus::Unseen,
                (p.difficulty.ordinal() - target.ordinal()).abs(),
            )
        });
        candidates.first().copied()
    }

    /// Why a pattern was recommended, picked by cause priority.
    fn reason_for(&self, pattern: Pattern) -> String {
        let record = match self.strength.get(pattern) {
            Some(r) if r.attempted > 0 => r,
            _ => return format!("✨ New territory: first {pattern} problem"),
        };

        if record.avg_score < LOW_SCORE_AVG {
            return format!(
                "📉 Weak spot: averaging {:.1}/4 on {pattern}",
                record.display_avg()
            );
        }

        let today = self.clock.today();
        let days_idle = record
            .last_practiced
            .map(|d| today.signed_duration_since(d).num_days())
            .unwrap_or(i64::MAX);
        if days_idle > STALE_DAYS_MEDIUM {
            return format!("⏳ Rusty: no {pattern} practice in {days_idle} days");
        }

        let mistake_count = self.mistakes.count_for_pattern(pattern);
        if mistake_count > 0 {
            return format!("🧠 Mistake review: {mistake_count} tracked mistakes in {pattern}");
        }

        format!("🚀 Level up: pushing {pattern} further")
    }

    fn recommend(&self, problem: &ProblemInfo, reason: String) -> Recommendation {
        Recommendation {
            problem_id: problem.id,
            title: problem.title.clone(),
            difficulty: problem.difficulty,
            pattern: problem.pattern,
            reason,
        }
    }

    /// Walks the urgency ranking and serves the first pattern that still
    /// has an eligible problem. None only when every problem is solved.
    pub fn next_problem(&self, preferred_difficulty: Option<Difficulty>) -> Option<Recommendation> {
        debug!("Requesting next problem...");
        for (pattern, urgency) in self.ranked_patterns() {
            if let Some(problem) = self.pick_problem_from_pattern(pattern, preferred_difficulty) {
                let reason = self.reason_for(pattern);
                info!(
                    "Serving {} (ID: {}) for {} (urgency {:.0}): {}",
                    problem.title, problem.id, pattern, urgency, reason
                );
                return Some(self.recommend(problem, reason));
            }
        }
        info!("No problems available.");
        None
    }

    /// Up to `count` recommendations, at most one problem per pattern,
    /// in urgency order.
    pub fn recommendations(&self, count: usize) -> Vec<Recommendation> {
        let mut results = Vec::new();
        for (pattern, _) in self.ranked_patterns() {
            if results.len() >= count {
                break;
            }
            if let Some(problem) = self.pick_problem_from_pattern(pattern, None) {
                let reason = self.reason_for(pattern);
                results.push(self.recommend(problem, reason));
            }
        }
        results
    }

    // --- Aggregate Metrics ---

    /// Overall 0-100 readiness: solved coverage, pattern coverage, and
    /// score quality. Empty stores score 0, never error.
    pub fn readiness_score(&self) -> u32 {
        let total_problems = self.catalog.len();
        let solved_frac = if total_problems == 0 {
            0.0
        } else {
            self.progress.solved_count() as f64 / total_problems as f64
        };

        let attempted: Vec<f64> = self
            .strength
            .all()
            .filter(|r| r.attempted > 0)
            .map(|r| r.avg_score)
            .collect();
        let coverage_frac = attempted.len() as f64 / Pattern::ALL.len() as f64;
        let quality_frac = if attempted.is_empty() {
            0.0
        } else {
            attempted.iter().sum::<f64>() / attempted.len() as f64 / SCORE_MAX
        };

        (READINESS_SOLVED_WEIGHT * solved_frac
            + READINESS_COVERAGE_WEIGHT * coverage_frac
            + READINESS_QUALITY_WEIGHT * quality_frac)
            .round() as u32
    }

    /// Solved-per-pattern rows for the whole universe.
    pub fn pattern_coverage(&self) -> Vec<PatternCoverage> {
        Pattern::ALL
            .into_iter()
            .map(|pattern| {
                let problems = self.catalog.by_pattern(pattern);
                let total = problems.len() as u32;
                let solved = problems
                    .iter()
                    .filter(|p| self.progress.status(p.id) == ProblemStatus::Solved)
                    .count() as u32;
                let percentage = if total == 0 {
                    0.0
                } else {
                    f64::from(solved) / f64::from(total) * 100.0
                };
                PatternCoverage {
                    pattern,
                    solved,
                    total,
                    percentage,
                }
            })
            .collect()
    }

    /// The date-seeded challenge. Same date and same solved-set in, same
    /// problem out, regardless of who asks or in what order state was
    /// written.
    pub fn daily_challenge(&self) -> Option<Recommendation> {
        let total = self.catalog.len();
        if total == 0 {
            return None;
        }

        let seed = days_since_epoch(self.clock.today()).rem_euclid(total as i64) as usize;
        let problems = self.catalog.problems();
        for offset in 0..total {
            let problem = &problems[(seed + offset) % total];
            if self.progress.status(problem.id) != ProblemStatus::Solved {
                return Some(self.recommend(problem, "📅 Daily Challenge".to_string()));
            }
        }
        // Everything is solved: re-serve the seed slot
        Some(self.recommend(&problems[seed], "📅 Daily Challenge".to_string()))
    }

    /// Readiness against one interview level's bar.
    pub fn interview_ready_score(&self, level: Level) -> Readiness {
        let thresholds = level.thresholds();

        let mut strong_patterns = Vec::new();
        let mut weak_patterns = Vec::new();
        for pattern in Pattern::ALL {
            let is_strong = self.strength.get(pattern).is_some_and(|r| {
                r.attempted > 0
                    && r.solve_rate() >= thresholds.min_solve_rate
                    && r.avg_score >= thresholds.min_avg_score
            });
            if is_strong {
                strong_patterns.push(pattern);
            } else {
                weak_patterns.push(pattern);
            }
        }

        let attempted: Vec<f64> = self
            .strength
            .all()
            .filter(|r| r.attempted > 0)
            .map(|r| r.avg_score)
            .collect();
        let mean_avg = if attempted.is_empty() {
            0.0
        } else {
            attempted.iter().sum::<f64>() / attempted.len() as f64
        };

        let strong_term =
            (strong_patterns.len() as f64 / f64::from(thresholds.min_patterns)).min(1.0);
        let quality_term = (mean_avg / thresholds.min_avg_score).min(1.0);
        let total_problems = self.catalog.len();
        let volume_term = if total_problems == 0 {
            0.0
        } else {
            (self.progress.solved_count() as f64
                / (total_problems as f64 * thresholds.min_solve_rate))
                .min(1.0)
        };

        let score = (INTERVIEW_STRONG_WEIGHT * strong_term
            + INTERVIEW_QUALITY_WEIGHT * quality_term
            + INTERVIEW_VOLUME_WEIGHT * volume_term)
            .round() as u32;

        Readiness {
            level_label: level.as_str().to_string(),
            score,
            strong_patterns,
            weak_patterns,
        }
    }
}
