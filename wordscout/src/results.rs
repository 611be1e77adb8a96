//! Search result types.
//!
//! # Rust Ownership vs .NET References
//!
//! A .NET worker that fills a shared `List<SearchResult>` needs a lock or a
//! `ConcurrentBag`:
//! ```csharp
//! var results = new ConcurrentBag<SearchResult>();
//! Parallel.ForEach(words, word => results.Add(Search(word)));
//! // Insertion order is lost
//! ```
//!
//! Each task here produces an owned `SearchResult` and moves it into its own
//! handle. Nothing is shared mutably, so no lock is needed, and the join puts
//! every value back at its input position:
//! ```rust,ignore
//! let results: Vec<SearchResult> = join_all(handles)?;
//! ```
use serde::Serialize;

use crate::errors::SearchError;

/// All occurrences of one word in one block body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// The word that was searched for
    pub word: String,
    /// Title of the block that was searched
    pub title: String,
    /// Byte offsets of each non-overlapping match, relative to the body
    pub offsets: Vec<usize>,
}

impl SearchResult {
    pub fn new(word: impl Into<String>, title: impl Into<String>, offsets: Vec<usize>) -> Self {
        Self {
            word: word.into(),
            title: title.into(),
            offsets,
        }
    }

    /// The "no match" value for a word
    pub fn empty(word: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(word, title, Vec::new())
    }

    /// Number of occurrences found
    pub fn count(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_match(&self) -> bool {
        !self.offsets.is_empty()
    }
}

/// Outcome of searching a single block
#[derive(Debug)]
pub struct BlockResult {
    /// Position of the block in the corpus
    pub index: usize,
    /// Parsed title, `None` if the block had no recognizable title
    pub title: Option<String>,
    /// One entry per word, or the failure attached to this block
    pub outcome: Result<Vec<SearchResult>, SearchError>,
}

impl BlockResult {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Total matches across all words in this block
    pub fn total_matches(&self) -> usize {
        match &self.outcome {
            Ok(results) => results.iter().map(SearchResult::count).sum(),
            Err(_) => 0,
        }
    }
}

/// Represents the complete results of a corpus search
#[derive(Debug, Default)]
pub struct CorpusResult {
    /// Results per block, in corpus order
    pub block_results: Vec<BlockResult>,
    /// Total number of matches found
    pub total_matches: usize,
    /// Total number of blocks searched
    pub blocks_searched: usize,
    /// Number of blocks with at least one match
    pub blocks_with_matches: usize,
    /// Number of blocks whose search failed
    pub blocks_failed: usize,
}

impl CorpusResult {
    /// Creates a new empty corpus result
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a block result and updates the totals
    pub fn add_block_result(&mut self, block_result: BlockResult) {
        self.blocks_searched += 1;
        match &block_result.outcome {
            Ok(_) => {
                let matches = block_result.total_matches();
                if matches > 0 {
                    self.total_matches += matches;
                    self.blocks_with_matches += 1;
                }
            }
            Err(_) => self.blocks_failed += 1,
        }
        self.block_results.push(block_result);
    }
}
