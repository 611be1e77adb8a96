use crate::errors::{Result, SearchError};

/// A corpus block split into its title and searchable body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position of the block in the corpus
    pub index: usize,
    pub title: String,
    pub body: String,
}

/// Splits a raw block at the first occurrence of `delimiter`.
///
/// The title is everything before the delimiter and the body is everything
/// after it. A block without the delimiter, or with an empty title, has no
/// recognizable title and is rejected.
pub fn split_block(index: usize, raw: &str, delimiter: &str) -> Result<Block> {
    let (title, body) = split_title(index, raw, delimiter)?;
    Ok(Block {
        index,
        title: title.to_string(),
        body: body.to_string(),
    })
}

/// Borrowing form of [`split_block`], returning `(title, body)`
pub fn split_title<'a>(index: usize, raw: &'a str, delimiter: &str) -> Result<(&'a str, &'a str)> {
    if delimiter.is_empty() {
        return Err(SearchError::config_error("Title delimiter must not be empty"));
    }

    let (title, body) = raw.split_once(delimiter).ok_or_else(|| {
        SearchError::malformed_input(index, format!("missing title delimiter {:?}", delimiter))
    })?;

    if title.is_empty() {
        return Err(SearchError::malformed_input(index, "empty title"));
    }

    Ok((title, body))
}
