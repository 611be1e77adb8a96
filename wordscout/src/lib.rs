pub mod config;
pub mod errors;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{CliOverrides, JoinPolicy, SearchConfig};
pub use errors::{Result, SearchError};
pub use results::{BlockResult, CorpusResult, SearchResult};
pub use search::{search, Searcher};
