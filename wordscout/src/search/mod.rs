//! Concurrent word search over an in-memory corpus, demonstrating Rust's parallel
//! processing capabilities compared to .NET's Task Parallel Library (TPL).
//!
//! # .NET vs Rust Parallel Processing
//!
//! In .NET, a two-level fan-out over blocks and words might read:
//! ```csharp
//! var tasks = blocks.Select(block => Task.Run(() =>
//!     words.Select(word => Task.Run(() => Search(word, block))).ToList()));
//! var nested = await Task.WhenAll(tasks);
//! ```
//!
//! Here a [`Searcher`] owns a bounded rayon pool. Each block becomes one queued
//! job, each of those queues one job per word, and [`join_nested`] flattens the
//! handles back into a `Vec<Vec<SearchResult>>`:
//! ```rust,ignore
//! let searcher = Searcher::new(&SearchConfig::with_words(["cat", "dog"]))?;
//! let results = searcher.search(&["T1:cat sat on a cat mat", "T2:dog ran"])?;
//! assert_eq!(results[0][0].count(), 2);
//! ```
//!
//! # Work Stealing Thread Pool
//!
//! .NET schedules `Task.Run` work on the shared ThreadPool. The jobs here are
//! queued on a dedicated `rayon::ThreadPool` sized by
//! `SearchConfig::thread_count`, so the number of OS threads stays fixed no
//! matter how many blocks and words are searched. Jobs never block on one
//! another; only the caller blocks, once, in the join.
//!
//! # Error Handling
//!
//! A block without a title fails its own handle. Whether that fails the whole
//! search depends on the join: [`Searcher::search`] is fail-fast,
//! [`Searcher::search_settled`] reports every block's outcome.
pub mod engine;
pub mod matcher;
pub mod task;
pub mod title;

pub use engine::{search, BlockHandle, Searcher};
pub use matcher::WordMatcher;
pub use task::{join_all, join_nested, join_nested_settled, join_settled, TaskHandle, TaskState};
pub use title::{split_block, split_title, Block};
