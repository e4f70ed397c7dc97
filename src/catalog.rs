// src/catalog.rs

use crate::error::{Error, Result};
use crate::models::{Pattern, ProblemInfo};
use std::collections::HashMap;

/// Read-only lookup table mapping problem ids to metadata and patterns to
/// their problems. The engine never mutates it; iteration order is the
/// order of the source data, which keeps date-seeded selection stable.
pub struct ProblemCatalog {
    problems: Vec<ProblemInfo>,
    by_id: HashMap<i64, usize>,
    by_pattern: HashMap<Pattern, Vec<usize>>,
}

impl ProblemCatalog {
    /// The catalog shipped with the crate.
    pub fn bundled() -> Self {
        // Note: This relies on the file strictly existing in src/data/
        let data = include_str!("data/problems.json");
        Self::from_json(data).expect("Error parsing bundled problems JSON")
    }

    /// Build a catalog from a host-supplied JSON array. Unknown patterns or
    /// difficulties and duplicate ids are rejected here, at the boundary.
    pub fn from_json(data: &str) -> Result<Self> {
        let problems: Vec<ProblemInfo> = serde_json::from_str(data)?;
        Self::from_problems(problems)
    }

    pub fn from_problems(problems: Vec<ProblemInfo>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(problems.len());
        let mut by_pattern: HashMap<Pattern, Vec<usize>> = HashMap::new();

        for (idx, problem) in problems.iter().enumerate() {
            if by_id.insert(problem.id, idx).is_some() {
                return Err(Error::Validation(format!(
                    "duplicate problem id in catalog: {}",
                    problem.id
                )));
            }
            by_pattern.entry(problem.pattern).or_default().push(idx);
        }

        Ok(Self {
            problems,
            by_id,
            by_pattern,
        })
    }

    pub fn get(&self, id: i64) -> Option<&ProblemInfo> {
        self.by_id.get(&id).map(|&idx| &self.problems[idx])
    }

    /// Problems tagged with a pattern, in catalog order.
    pub fn by_pattern(&self, pattern: Pattern) -> Vec<&ProblemInfo> {
        self.by_pattern
            .get(&pattern)
            .map(|indices| indices.iter().map(|&idx| &self.problems[idx]).collect())
            .unwrap_or_default()
    }

    pub fn problems(&self) -> &[ProblemInfo] {
        &self.problems
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}
