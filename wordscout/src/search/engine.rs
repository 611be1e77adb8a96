use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::matcher::WordMatcher;
use super::task::{join_nested, join_nested_settled, TaskHandle};
use super::title::{split_block, split_title, Block};
use crate::config::{JoinPolicy, SearchConfig};
use crate::errors::{Result, SearchError};
use crate::metrics::SearchMetrics;
use crate::results::{BlockResult, CorpusResult, SearchResult};

/// Handle to one block's word handles
pub type BlockHandle = TaskHandle<Vec<TaskHandle<SearchResult>>>;

/// Everything a block task needs to fan out its word tasks
#[derive(Debug, Clone)]
struct WordDispatcher {
    pool: Arc<ThreadPool>,
    matcher: Arc<WordMatcher>,
    metrics: SearchMetrics,
}

impl WordDispatcher {
    fn dispatch(&self, block: Arc<Block>) -> Vec<TaskHandle<SearchResult>> {
        self.metrics.record_word_tasks(self.matcher.len() as u64);

        (0..self.matcher.len())
            .map(|word_index| {
                let matcher = Arc::clone(&self.matcher);
                let block = Arc::clone(&block);
                TaskHandle::spawn_tracked(&self.pool, &self.metrics, move || {
                    let word = &matcher.words()[word_index];
                    trace!("Searching block {} for {:?}", block.index, word);
                    let offsets = matcher.find_offsets(word_index, &block.body);
                    Ok(SearchResult::new(word.as_str(), block.title.as_str(), offsets))
                })
            })
            .collect()
    }
}

/// Searches a corpus of titled blocks for a fixed list of words
#[derive(Debug)]
pub struct Searcher {
    dispatcher: WordDispatcher,
    title_delimiter: Arc<str>,
    join_policy: JoinPolicy,
}

impl Searcher {
    /// Builds the worker pool and compiles the word list
    pub fn new(config: &SearchConfig) -> Result<Self> {
        if config.title_delimiter.is_empty() {
            return Err(SearchError::config_error("Title delimiter must not be empty"));
        }

        let metrics = SearchMetrics::new();
        let matcher =
            WordMatcher::with_options(config.words.clone(), config.case_insensitive, &metrics)?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.thread_count.get())
            .thread_name(|i| format!("wordscout-worker-{}", i))
            .build()?;

        debug!(
            "Created searcher: {} words, {} threads, {:?}",
            matcher.len(),
            config.thread_count,
            config.join_policy
        );

        Ok(Self {
            dispatcher: WordDispatcher {
                pool: Arc::new(pool),
                matcher: Arc::new(matcher),
                metrics,
            },
            title_delimiter: Arc::from(config.title_delimiter.as_str()),
            join_policy: config.join_policy,
        })
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.dispatcher.metrics
    }

    pub fn words(&self) -> &[String] {
        self.dispatcher.matcher.words()
    }

    pub fn join_policy(&self) -> JoinPolicy {
        self.join_policy
    }

    /// Starts one task per block.
    ///
    /// Handle `i` belongs to block `i`. A block task splits off the title and
    /// resolves to that block's word handles, or fails with
    /// [`SearchError::MalformedInput`] without touching its siblings.
    pub fn dispatch_blocks<S: AsRef<str>>(&self, blocks: &[S]) -> Vec<BlockHandle> {
        debug!("Dispatching {} blocks", blocks.len());

        blocks
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                self.dispatcher.metrics.record_block_dispatch();
                let raw = raw.as_ref().to_string();
                let delimiter = Arc::clone(&self.title_delimiter);
                let dispatcher = self.dispatcher.clone();
                TaskHandle::spawn_tracked(&self.dispatcher.pool, &self.dispatcher.metrics, move || {
                    let block = split_block(index, &raw, &delimiter)?;
                    Ok(dispatcher.dispatch(Arc::new(block)))
                })
            })
            .collect()
    }

    /// Starts one task per word for an already parsed block, in word-list order
    pub fn dispatch_words(&self, block: Block) -> Vec<TaskHandle<SearchResult>> {
        self.dispatcher.dispatch(Arc::new(block))
    }

    /// Searches every block for every word, failing on the first error
    pub fn search<S: AsRef<str>>(&self, blocks: &[S]) -> Result<Vec<Vec<SearchResult>>> {
        info!(
            "Starting search for {} words across {} blocks",
            self.words().len(),
            blocks.len()
        );

        let results = join_nested(self.dispatch_blocks(blocks));
        self.metrics().log_stats();
        results
    }

    /// Searches every block for every word, reporting each block separately
    pub fn search_settled<S: AsRef<str>>(&self, blocks: &[S]) -> Vec<Result<Vec<SearchResult>>> {
        info!(
            "Starting settled search for {} words across {} blocks",
            self.words().len(),
            blocks.len()
        );

        let results = join_nested_settled(self.dispatch_blocks(blocks));
        self.metrics().log_stats();
        results
    }

    /// Searches the corpus under the configured join policy and aggregates totals
    pub fn search_corpus<S: AsRef<str>>(&self, blocks: &[S]) -> Result<CorpusResult> {
        let outcomes = match self.join_policy {
            JoinPolicy::FailFast => self.search(blocks)?.into_iter().map(Ok).collect(),
            JoinPolicy::CollectAll => self.search_settled(blocks),
        };

        let mut result = CorpusResult::new();
        for (index, (raw, outcome)) in blocks.iter().zip(outcomes).enumerate() {
            let title = split_title(index, raw.as_ref(), &self.title_delimiter)
                .ok()
                .map(|(title, _)| title.to_string());
            result.add_block_result(BlockResult {
                index,
                title,
                outcome,
            });
        }

        info!(
            "Search complete. Found {} matches in {} blocks ({} failed)",
            result.total_matches, result.blocks_with_matches, result.blocks_failed
        );

        Ok(result)
    }
}

/// Searches `blocks` for `words` with the default configuration.
///
/// Titles end at the first `:`. Fails as a whole if any block fails.
pub fn search<W, S>(words: &[W], blocks: &[S]) -> Result<Vec<Vec<SearchResult>>>
where
    W: AsRef<str>,
    S: AsRef<str>,
{
    let config = SearchConfig::with_words(words.iter().map(|w| w.as_ref()));
    Searcher::new(&config)?.search(blocks)
}
