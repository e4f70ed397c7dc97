// src/models.rs

use crate::constants::*;
use crate::error::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// --- Topic Universe ---

/// The closed set of algorithmic patterns the trainer tracks.
///
/// The declaration order is the canonical ordering: it seeds the strength
/// tracker, keys the coverage report, and breaks ties when urgency scores
/// are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pattern {
    #[serde(rename = "Arrays and Hashing")]
    ArraysAndHashing,
    #[serde(rename = "Two Pointers")]
    TwoPointers,
    #[serde(rename = "Sliding Window")]
    SlidingWindow,
    #[serde(rename = "Stack")]
    Stack,
    #[serde(rename = "Binary Search")]
    BinarySearch,
    #[serde(rename = "Linked List")]
    LinkedList,
    #[serde(rename = "Trees")]
    Trees,
    #[serde(rename = "Tries")]
    Tries,
    #[serde(rename = "Heap / Priority Queue")]
    HeapPriorityQueue,
    #[serde(rename = "Backtracking")]
    Backtracking,
    #[serde(rename = "Graphs")]
    Graphs,
    #[serde(rename = "Intervals")]
    Intervals,
    #[serde(rename = "Greedy")]
    Greedy,
    #[serde(rename = "Dynamic Programming")]
    DynamicProgramming,
    #[serde(rename = "Bit Manipulation")]
    BitManipulation,
    #[serde(rename = "Math and Geometry")]
    MathAndGeometry,
}

impl Pattern {
    pub const ALL: [Pattern; 16] = [
        Pattern::ArraysAndHashing,
        Pattern::TwoPointers,
        Pattern::SlidingWindow,
        Pattern::Stack,
        Pattern::BinarySearch,
        Pattern::LinkedList,
        Pattern::Trees,
        Pattern::Tries,
        Pattern::HeapPriorityQueue,
        Pattern::Backtracking,
        Pattern::Graphs,
        Pattern::Intervals,
        Pattern::Greedy,
        Pattern::DynamicProgramming,
        Pattern::BitManipulation,
        Pattern::MathAndGeometry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::ArraysAndHashing => "Arrays and Hashing",
            Pattern::TwoPointers => "Two Pointers",
            Pattern::SlidingWindow => "Sliding Window",
            Pattern::Stack => "Stack",
            Pattern::BinarySearch => "Binary Search",
            Pattern::LinkedList => "Linked List",
            Pattern::Trees => "Trees",
            Pattern::Tries => "Tries",
            Pattern::HeapPriorityQueue => "Heap / Priority Queue",
            Pattern::Backtracking => "Backtracking",
            Pattern::Graphs => "Graphs",
            Pattern::Intervals => "Intervals",
            Pattern::Greedy => "Greedy",
            Pattern::DynamicProgramming => "Dynamic Programming",
            Pattern::BitManipulation => "Bit Manipulation",
            Pattern::MathAndGeometry => "Math and Geometry",
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pattern {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::Validation(format!("unknown pattern: {s}")))
    }
}

// --- Difficulty ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Position on the ordinal Easy < Medium < Hard scale.
    pub fn ordinal(&self) -> i64 {
        *self as i64
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            _ => Err(Error::Validation(format!("unknown difficulty: {s}"))),
        }
    }
}

// --- Interview Levels ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Junior,
    Mid,
    Senior,
    Staff,
}

/// Per-level bar a pattern portfolio is measured against.
#[derive(Debug, Clone, Copy)]
pub struct LevelThresholds {
    pub min_patterns: u32,
    pub min_solve_rate: f64,
    pub min_avg_score: f64,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Junior => "Junior",
            Level::Mid => "Mid",
            Level::Senior => "Senior",
            Level::Staff => "Staff",
        }
    }

    /// Thresholds grow strictly tighter from Junior to Staff.
    pub fn thresholds(&self) -> LevelThresholds {
        match self {
            Level::Junior => LevelThresholds {
                min_patterns: 4,
                min_solve_rate: 0.40,
                min_avg_score: 2.0,
            },
            Level::Mid => LevelThresholds {
                min_patterns: 8,
                min_solve_rate: 0.50,
                min_avg_score: 2.5,
            },
            Level::Senior => LevelThresholds {
                min_patterns: 12,
                min_solve_rate: 0.60,
                min_avg_score: 3.0,
            },
            Level::Staff => LevelThresholds {
                min_patterns: 16,
                min_solve_rate: 0.70,
                min_avg_score: 3.5,
            },
        }
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "junior" => Ok(Level::Junior),
            "mid" => Ok(Level::Mid),
            "senior" => Ok(Level::Senior),
            "staff" => Ok(Level::Staff),
            _ => Err(Error::Validation(format!("unknown level: {s}"))),
        }
    }
}

// --- Problem Catalog Entries ---

/// A catalog row. The catalog is read-only reference data; user state lives
/// in the stores and points back at it by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemInfo {
    pub id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    pub pattern: Pattern,
    pub url: String,
}

// --- Persisted State ---

fn default_ease_factor() -> f64 {
    EASE_FACTOR_DEFAULT
}

fn default_interval() -> i64 {
    INTERVAL_FIRST_PASS
}

/// A logged mistake with its spaced-repetition schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakeEntry {
    pub id: Uuid,
    pub pattern: Pattern,
    pub problem_id: Option<i64>,
    pub problem_title: String,
    pub description: String,
    pub created_at: NaiveDate,
    pub next_review: NaiveDate,
    /// Current review interval in days, always >= 1.
    #[serde(default = "default_interval")]
    pub interval: i64,
    /// SM-2 ease factor, floored at 1.3.
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    /// Successful reviews since the last failure.
    #[serde(default)]
    pub repetitions: u32,
    /// Consecutive successful reviews, same reset rule as `repetitions`.
    #[serde(default)]
    pub streak: u32,
}

/// Running proficiency record for one pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternStrength {
    pub pattern: Pattern,
    #[serde(default)]
    pub solved: u32,
    #[serde(default)]
    pub attempted: u32,
    /// Arithmetic mean of all submitted scores, kept at full precision.
    #[serde(default)]
    pub avg_score: f64,
    #[serde(default)]
    pub last_practiced: Option<NaiveDate>,
}

impl PatternStrength {
    pub fn zeroed(pattern: Pattern) -> Self {
        Self {
            pattern,
            solved: 0,
            attempted: 0,
            avg_score: 0.0,
            last_practiced: None,
        }
    }

    pub fn solve_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            f64::from(self.solved) / f64::from(self.attempted)
        }
    }

    /// Average score rounded to one decimal, for display.
    pub fn display_avg(&self) -> f64 {
        (self.avg_score * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemStatus {
    Unseen,
    Attempted,
    Solved,
}

impl Default for ProblemStatus {
    fn default() -> Self {
        Self::Unseen
    }
}

/// Per-problem attempt history. Best score and best time only ever improve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemProgressEntry {
    pub problem_id: i64,
    #[serde(default)]
    pub status: ProblemStatus,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub best_score: Option<f64>,
    #[serde(default)]
    pub best_time_minutes: Option<f64>,
    pub last_attempted: NaiveDate,
    #[serde(default)]
    pub hints_used: u32,
    /// Last submitted solution text.
    #[serde(default)]
    pub code: String,
}

// --- Inputs ---

/// One attempt as reported by the host, resolved against the catalog by the
/// trainer before it fans out to the stores.
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptRecord {
    pub problem_id: i64,
    pub solved: bool,
    /// Self- or grader-assigned quality of the solution, 0-4.
    pub score: Option<f64>,
    pub time_minutes: Option<f64>,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub code: String,
}

/// Store-level attempt input with the status transition already decided.
#[derive(Debug, Clone)]
pub struct AttemptUpdate {
    pub problem_id: i64,
    pub status: ProblemStatus,
    pub score: Option<f64>,
    pub time_minutes: Option<f64>,
    pub hints_used: u32,
    pub code: String,
}

// --- Derived Results ---

/// What the engine hands back when asked what to work on next.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub problem_id: i64,
    pub title: String,
    pub difficulty: Difficulty,
    pub pattern: Pattern,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub level_label: String,
    pub score: u32,
    pub strong_patterns: Vec<Pattern>,
    pub weak_patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternCoverage {
    pub pattern: Pattern,
    pub solved: u32,
    pub total: u32,
    pub percentage: f64,
}

/// Weakness signal derived from the mistake log alone.
#[derive(Debug, Clone, Serialize)]
pub struct WeakPattern {
    pub pattern: Pattern,
    pub count: u32,
    pub avg_streak: f64,
}

/// Outcome of processing one attempt through the trainer.
#[derive(Debug, Clone, Copy)]
pub struct AttemptOutcome {
    /// True when this attempt solved the problem for the first time.
    pub first_solve: bool,
    /// Total distinct problems solved after this attempt.
    pub total_solved: usize,
}
