use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use crate::errors::{Result, SearchError};
use crate::metrics::SearchMetrics;

/// Compiled case-insensitive patterns, shared by every [`WordMatcher`].
///
/// Entries are never evicted, so a process that builds many searchers with
/// distinct words keeps every pattern alive until it exits.
static PATTERN_CACHE: Lazy<DashMap<String, Arc<Regex>>> = Lazy::new(DashMap::new);

/// Strategy for locating one word
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Case-sensitive literal scan
    Literal(String),
    /// Case-insensitive scan through an escaped regex
    Regex(Arc<Regex>),
    /// The empty word, which matches nothing
    Never,
}

impl MatchStrategy {
    /// Byte offsets of every non-overlapping occurrence, left to right
    pub fn find_offsets(&self, text: &str) -> Vec<usize> {
        match self {
            MatchStrategy::Literal(word) => text.match_indices(word.as_str()).map(|(i, _)| i).collect(),
            MatchStrategy::Regex(regex) => regex.find_iter(text).map(|m| m.start()).collect(),
            MatchStrategy::Never => Vec::new(),
        }
    }
}

/// Holds one match strategy per word, in word-list order
#[derive(Debug, Clone)]
pub struct WordMatcher {
    words: Vec<String>,
    strategies: Vec<MatchStrategy>,
}

impl WordMatcher {
    /// Creates a case-sensitive matcher for the given words
    pub fn new(words: Vec<String>) -> Self {
        let strategies = words.iter().map(|w| Self::literal(w)).collect();
        Self { words, strategies }
    }

    /// Creates a matcher, compiling case-insensitive patterns when requested
    pub fn with_options(
        words: Vec<String>,
        case_insensitive: bool,
        metrics: &SearchMetrics,
    ) -> Result<Self> {
        if !case_insensitive {
            return Ok(Self::new(words));
        }

        let mut strategies = Vec::with_capacity(words.len());
        for word in &words {
            let strategy = if word.is_empty() {
                MatchStrategy::Never
            } else {
                MatchStrategy::Regex(Self::compile_case_insensitive(word, metrics)?)
            };
            strategies.push(strategy);
        }

        Ok(Self { words, strategies })
    }

    fn literal(word: &str) -> MatchStrategy {
        if word.is_empty() {
            MatchStrategy::Never
        } else {
            MatchStrategy::Literal(word.to_string())
        }
    }

    fn compile_case_insensitive(word: &str, metrics: &SearchMetrics) -> Result<Arc<Regex>> {
        let pattern = format!("(?i){}", regex::escape(word));

        if let Some(entry) = PATTERN_CACHE.get(&pattern) {
            metrics.record_cache_operation(true);
            return Ok(entry.clone());
        }

        let regex = Regex::new(&pattern)
            .map(Arc::new)
            .map_err(|e| SearchError::invalid_pattern(format!("{}: {}", word, e)))?;
        metrics.record_cache_operation(false);
        PATTERN_CACHE.insert(pattern, regex.clone());
        Ok(regex)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Finds the offsets of the word at `word_index` in `text`
    pub fn find_offsets(&self, word_index: usize, text: &str) -> Vec<usize> {
        self.strategies
            .get(word_index)
            .map(|s| s.find_offsets(text))
            .unwrap_or_default()
    }
}
