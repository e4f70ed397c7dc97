// src/constants.rs

// --- Spaced Repetition (SM-2) Parameters ---
pub const EASE_FACTOR_MIN: f64 = 1.3;
pub const EASE_FACTOR_DEFAULT: f64 = 2.5;

pub const INTERVAL_FIRST_PASS: i64 = 1; // Days
pub const INTERVAL_SECOND_PASS: i64 = 6; // Days

pub const QUALITY_MAX: u8 = 5;
pub const QUALITY_PASS_THRESHOLD: u8 = 3; // quality >= 3 counts as a successful recall

// --- Scoring Scale ---
pub const SCORE_MAX: f64 = 4.0; // attempt scores and rolling averages live in [0, 4]

// --- Urgency Weights ---
pub const URGENCY_WEAKNESS_WEIGHT: f64 = 25.0; // per point of average score below SCORE_MAX
pub const URGENCY_UNPRACTICED: f64 = 50.0; // flat score for a never-attempted pattern
pub const URGENCY_MISTAKE_WEIGHT: f64 = 15.0; // per tracked mistake in the pattern
pub const URGENCY_UNSOLVED_WEIGHT: f64 = 20.0; // scaled by the unsolved fraction of attempts

pub const STALE_DAYS_LONG: i64 = 14;
pub const STALE_DAYS_MEDIUM: i64 = 7;
pub const STALE_DAYS_SHORT: i64 = 3;
pub const URGENCY_STALE_LONG: f64 = 30.0;
pub const URGENCY_STALE_MEDIUM: f64 = 20.0;
pub const URGENCY_STALE_SHORT: f64 = 10.0;

// --- Difficulty Targeting ---
pub const TARGET_HARD_MIN_AVG: f64 = 3.5; // average score required to be served Hard
pub const TARGET_MEDIUM_MIN_AVG: f64 = 2.0; // average score required to be served Medium
pub const LOW_SCORE_AVG: f64 = 2.5; // below this a pattern is called out for low scores

// --- Readiness Weights ---
pub const READINESS_SOLVED_WEIGHT: f64 = 40.0; // fraction of catalog solved
pub const READINESS_COVERAGE_WEIGHT: f64 = 30.0; // fraction of patterns attempted
pub const READINESS_QUALITY_WEIGHT: f64 = 30.0; // mean average score over attempted patterns

// --- Interview Readiness Weights ---
pub const INTERVIEW_STRONG_WEIGHT: f64 = 40.0;
pub const INTERVIEW_QUALITY_WEIGHT: f64 = 35.0;
pub const INTERVIEW_VOLUME_WEIGHT: f64 = 25.0;
