mod blocks;
mod inline;
mod marks;

use serde_json::Value;

use crate::adf::Document;
use crate::error::Result;
use crate::options::AdfToMarkdownOptions;

/// Serializes a raw ADF value to Markdown.
///
/// Fails with [`Error::MalformedDocument`](crate::Error::MalformedDocument)
/// when the root is not a version-1 `doc`. Unknown nodes and marks below
/// the root are skipped.
pub fn adf_to_markdown(adf: &Value, options: &AdfToMarkdownOptions) -> Result<String> {
    let doc = Document::try_from(adf)?;
    render_document(&doc, options)
}

pub fn render_document(doc: &Document, options: &AdfToMarkdownOptions) -> Result<String> {
    doc.check_root()?;

    let blocks: Vec<String> = doc
        .content
        .iter()
        .filter_map(|node| blocks::convert_block_node(node, options, 0))
        .collect();

    tracing::debug!(
        "Rendered {} of {} top-level node(s) to Markdown",
        blocks.len(),
        doc.content.len()
    );

    Ok(blocks.join("\n\n"))
}
