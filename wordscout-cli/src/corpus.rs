use std::fs;
use std::path::Path;
use wordscout::Result;

/// Reads a corpus file and splits it into raw blocks
pub fn load_blocks(path: &Path, separator: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(split_corpus(&text, separator))
}

/// Splits corpus text on lines consisting solely of `separator`.
///
/// Blank blocks are dropped and trailing newlines are trimmed from each block.
pub fn split_corpus(text: &str, separator: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim_end() == separator {
            push_block(&mut blocks, &mut current);
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_block(&mut blocks, &mut current);

    blocks
}

fn push_block(blocks: &mut Vec<String>, current: &mut String) {
    let block = current.trim_end_matches('\n');
    if !block.trim().is_empty() {
        blocks.push(block.to_string());
    }
    current.clear();
}

/// Turns `\n` and `\t` escapes typed on the command line into real characters
pub fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_corpus() {
        let text = "T1:cat sat\non a mat\n@\nT2:dog ran\n";
        let blocks = split_corpus(text, "@");
        assert_eq!(blocks, vec!["T1:cat sat\non a mat", "T2:dog ran"]);
    }

    #[test]
    fn test_split_corpus_skips_blank_blocks() {
        let text = "@\n\n@\nT1:x\n@\n@\n";
        assert_eq!(split_corpus(text, "@"), vec!["T1:x"]);
    }

    #[test]
    fn test_separator_must_fill_the_line() {
        let text = "T1:mail me @ home\n@\nT2:y";
        assert_eq!(
            split_corpus(text, "@"),
            vec!["T1:mail me @ home", "T2:y"]
        );
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("\\n"), "\n");
        assert_eq!(unescape(":"), ":");
    }
}
