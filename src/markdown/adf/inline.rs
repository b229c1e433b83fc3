use super::marks::apply_marks;
use crate::adf::Node;
use crate::options::AdfToMarkdownOptions;

pub fn convert_inline_nodes(nodes: &[Node], options: &AdfToMarkdownOptions) -> String {
    nodes
        .iter()
        .map(|node| convert_inline_node(node, options))
        .collect()
}

fn convert_inline_node(node: &Node, options: &AdfToMarkdownOptions) -> String {
    match node.kind.as_str() {
        "text" => apply_marks(node.text_str(), node.marks()),
        "hardBreak" => "  \n".into(),
        "mention" => convert_mention(node, options),
        "emoji" => convert_emoji(node),
        "inlineCard" => convert_inline_card(node),
        "mediaSingle" => convert_media_single(node).unwrap_or_default(),
        other => {
            tracing::trace!("Skipping unsupported inline node: {}", other);
            String::new()
        }
    }
}

fn convert_mention(node: &Node, options: &AdfToMarkdownOptions) -> String {
    let id = node.attr_str("id").unwrap_or("");
    options.mentions.format(id, node.attr_str("text"))
}

fn convert_emoji(node: &Node) -> String {
    node.attr_str("text")
        .filter(|t| !t.is_empty())
        .or(node.attr_str("shortName"))
        .unwrap_or("")
        .to_string()
}

fn convert_inline_card(node: &Node) -> String {
    match node.attr_str("url").filter(|u| !u.is_empty()) {
        Some(url) => format!("[{}]({})", url, url),
        None => String::new(),
    }
}

/// External images render as `![alt](url)`; uploaded files have no URL to link.
pub(super) fn convert_media_single(node: &Node) -> Option<String> {
    let media = node.children().first().filter(|m| m.is("media"))?;

    let url = media.attr_str("url").unwrap_or("");
    if media.attr_str("type") != Some("external") || url.is_empty() {
        tracing::trace!("Skipping non-external media");
        return None;
    }

    let alt = media.attr_str("alt").unwrap_or("");
    Some(format!("![{}]({})", alt, url))
}
