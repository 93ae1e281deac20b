//! tokenize command - Split free text into keywords

use anyhow::Result;

use crate::core::keywords;
use crate::ui::output;

/// Print the keywords found in `text`, one per line.
pub fn tokenize(text: &str) -> Result<()> {
    let list = keywords::tokenize(text);
    if !list.is_empty() {
        println!("{}", output::format_list(list.as_slice(), ""));
    }
    Ok(())
}
