pub mod adf;
pub mod tokens;
mod to_adf;

pub use adf::{adf_to_markdown, render_document};

use crate::adf::Document;
use crate::options::MarkdownToAdfOptions;
use tokens::Token;

/// Converts Markdown text to an ADF document.
///
/// Conversion never fails: constructs without an ADF counterpart are
/// dropped and logged at trace level.
pub fn markdown_to_adf(markdown: &str, options: &MarkdownToAdfOptions) -> Document {
    let tokens = tokens::tokenize(markdown);
    tracing::debug!("Tokenized {} byte(s) into {} token(s)", markdown.len(), tokens.len());
    tokens_to_adf(&tokens, options)
}

/// Converts an already tokenized stream, for callers bringing their own
/// tokenizer.
pub fn tokens_to_adf(tokens: &[Token], options: &MarkdownToAdfOptions) -> Document {
    let content = to_adf::convert_blocks(tokens, options, 0);
    tracing::debug!("Converted token stream into {} block node(s)", content.len());
    Document::new(content)
}
