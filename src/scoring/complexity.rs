//! Heuristic complexity scoring.
//!
//! The scorer is a pure, deterministic function of (title, description,
//! required skills) producing a score in [0,1], backed by a memo cache.
//! It never fails: malformed or empty inputs degrade to documented
//! defaults.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use crate::clog_trace;
use crate::scoring::keywords::{
    count_hits, COMPLEX_KEYWORDS, CRITICAL_KEYWORDS, MODERATE_KEYWORDS, SIMPLE_KEYWORDS,
};

/// Default text score when no keywords hit.
const DEFAULT_TEXT_SCORE: f64 = 0.3;
/// Default skill score for an unclassified skill.
const DEFAULT_SKILL_SCORE: f64 = 0.4;
/// Skill score when no skills are required.
const NO_SKILLS_SCORE: f64 = 0.2;

/// Memoizing complexity scorer.
///
/// Each engine owns its own scorer instance; there is no process-wide
/// singleton, so tests and per-tenant engines never share cache state.
/// The cache is unbounded for the process lifetime, an accepted tradeoff
/// for a bounded input vocabulary.
pub struct ComplexityScorer {
    cache: Mutex<HashMap<u64, f64>>,
}

impl ComplexityScorer {
    /// Create a new scorer with an empty cache.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Score a work item.
    ///
    /// Final score = title 0.2 + description 0.5 + skills 0.3, clamped to
    /// [0,1]. Results are memoized by a hash of (title, description,
    /// sorted skills); identical inputs always return identical scores.
    pub fn score(&self, title: &str, description: &str, required_skills: &[String]) -> f64 {
        let key = Self::cache_key(title, description, required_skills);

        if let Some(&cached) = self.cache.lock().unwrap().get(&key) {
            clog_trace!("ComplexityScorer cache hit key={}", key);
            return cached;
        }

        let title_score = Self::text_score(title);
        let description_score = Self::text_score(description);
        let skills_score = Self::skills_score(required_skills);

        let score = (title_score * 0.2 + description_score * 0.5 + skills_score * 0.3)
            .clamp(0.0, 1.0);

        self.cache.lock().unwrap().insert(key, score);
        score
    }

    /// Number of memoized entries, for cache-behavior tests.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Score free text by keyword density.
    ///
    /// Counts hits per bucket; zero hits yield the default 0.3. Otherwise
    /// the score is the hit-weighted mean (0.1/0.3/0.7/0.9) plus a length
    /// bonus of min(len/500, 1)·0.2, capped at 1.0.
    fn text_score(text: &str) -> f64 {
        let text = text.to_lowercase();

        let simple = count_hits(&text, SIMPLE_KEYWORDS);
        let moderate = count_hits(&text, MODERATE_KEYWORDS);
        let complex = count_hits(&text, COMPLEX_KEYWORDS);
        let critical = count_hits(&text, CRITICAL_KEYWORDS);

        let total = simple + moderate + complex + critical;
        if total == 0 {
            return DEFAULT_TEXT_SCORE;
        }

        let weighted = (simple as f64 * 0.1
            + moderate as f64 * 0.3
            + complex as f64 * 0.7
            + critical as f64 * 0.9)
            / total as f64;
        let length_bonus = (text.len() as f64 / 500.0).min(1.0) * 0.2;

        (weighted + length_bonus).min(1.0)
    }

    /// Score the required-skill list.
    ///
    /// Each skill is classified by substring membership in the keyword
    /// buckets (critical 0.9, complex 0.7, simple 0.1, otherwise 0.4);
    /// the mean gains a count bonus of min(n/5, 1)·0.1, capped at 1.0.
    /// An empty skill list scores 0.2.
    fn skills_score(skills: &[String]) -> f64 {
        if skills.is_empty() {
            return NO_SKILLS_SCORE;
        }

        let sum: f64 = skills.iter().map(|s| Self::classify_skill(s)).sum();
        let average = sum / skills.len() as f64;
        let count_bonus = (skills.len() as f64 / 5.0).min(1.0) * 0.1;

        (average + count_bonus).min(1.0)
    }

    // Precedence: critical, then complex, then simple. A skill matching
    // several buckets takes the most severe.
    fn classify_skill(skill: &str) -> f64 {
        let skill = skill.to_lowercase();
        if CRITICAL_KEYWORDS.iter().any(|k| skill.contains(k)) {
            0.9
        } else if COMPLEX_KEYWORDS.iter().any(|k| skill.contains(k)) {
            0.7
        } else if SIMPLE_KEYWORDS.iter().any(|k| skill.contains(k)) {
            0.1
        } else {
            DEFAULT_SKILL_SCORE
        }
    }

    fn cache_key(title: &str, description: &str, required_skills: &[String]) -> u64 {
        let mut sorted: Vec<String> = required_skills
            .iter()
            .map(|s| s.to_lowercase())
            .collect();
        sorted.sort();

        let mut hasher = DefaultHasher::new();
        title.hash(&mut hasher);
        description.hash(&mut hasher);
        sorted.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for ComplexityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComplexityScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplexityScorer")
            .field("cached", &self.cache_len())
            .finish()
    }
}
