use super::inline::{convert_inline_nodes, convert_media_single};
use crate::adf::Node;
use crate::options::AdfToMarkdownOptions;

const MAX_DEPTH: usize = 50;
const MAX_COLSPAN: u64 = 100;

/// List indentation, and how many block containers deep the walk is.
#[derive(Debug, Clone, Copy)]
struct Level {
    indent: usize,
    nesting: usize,
}

impl Level {
    fn deeper(self) -> Self {
        Self {
            indent: self.indent + 1,
            nesting: self.nesting + 1,
        }
    }

    fn same_indent(self) -> Self {
        Self {
            indent: self.indent,
            nesting: self.nesting + 1,
        }
    }

    fn unindented(self) -> Self {
        Self {
            indent: 0,
            nesting: self.nesting + 1,
        }
    }

    fn prefix(self) -> String {
        "  ".repeat(self.indent)
    }
}

pub fn convert_block_node(
    node: &Node,
    options: &AdfToMarkdownOptions,
    depth: usize,
) -> Option<String> {
    let level = Level {
        indent: depth,
        nesting: depth,
    };
    render_block(node, options, level)
}

fn render_block(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> Option<String> {
    if level.nesting > MAX_DEPTH {
        return Some("[Content truncated: max depth exceeded]".into());
    }

    match node.kind.as_str() {
        "paragraph" => Some(convert_inline_nodes(node.children(), options)),
        "heading" => Some(convert_heading(node, options)),
        "bulletList" => Some(convert_bullet_list(node, options, level)),
        "orderedList" => Some(convert_ordered_list(node, options, level)),
        "taskList" => Some(convert_task_list(node, options, level)),
        "codeBlock" => Some(convert_code_block(node)),
        "blockquote" => Some(convert_blockquote(node, options, level)),
        "rule" => Some("---".into()),
        "panel" => Some(convert_panel(node, options, level)),
        "expand" => Some(convert_expand(node, options, level)),
        "table" => convert_table(node, options),
        "mediaSingle" => convert_media_single(node),
        "blockCard" => convert_block_card(node),
        unknown => {
            tracing::trace!("Skipping unsupported block node: {}", unknown);
            None
        }
    }
}

fn convert_children(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> Vec<String> {
    node.children()
        .iter()
        .filter_map(|child| render_block(child, options, level))
        .collect()
}

fn convert_heading(node: &Node, options: &AdfToMarkdownOptions) -> String {
    let level = node.attr_u64("level").unwrap_or(1).clamp(1, 6) as usize;
    let text = convert_inline_nodes(node.children(), options);
    format!("{} {}", "#".repeat(level), text)
}

fn convert_code_block(node: &Node) -> String {
    let language = node.attr_str("language").unwrap_or("");
    let code: String = node.children().iter().map(Node::text_str).collect();
    format!("```{}\n{}\n```", language, code)
}

fn convert_blockquote(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    convert_children(node, options, level.deeper())
        .iter()
        .map(|text| prefix_lines(text, "> "))
        .collect::<Vec<_>>()
        .join("\n>\n")
}

fn prefix_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_bullet_list(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    let indent = level.prefix();
    node.children()
        .iter()
        .map(|item| format!("{}- {}", indent, convert_list_item(item, options, level)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_ordered_list(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    let indent = level.prefix();
    let start = node.attr_u64("order").unwrap_or(1);
    node.children()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let number = start.saturating_add(i as u64);
            let body = convert_list_item(item, options, level);
            format!("{}{}. {}", indent, number, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_task_list(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    let indent = level.prefix();
    node.children()
        .iter()
        .map(|item| {
            let checkbox = if item.attr_str("state") == Some("DONE") {
                "[x]"
            } else {
                "[ ]"
            };
            let body = convert_list_item(item, options, level);
            format!("{}- {} {}", indent, checkbox, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders a list or task item's body; nested lists go one level deeper
/// after a blank line.
fn convert_list_item(item: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    let mut parts: Vec<String> = Vec::new();

    for child in item.children() {
        match child.kind.as_str() {
            "paragraph" => parts.push(convert_inline_nodes(child.children(), options)),
            "bulletList" | "orderedList" => {
                if let Some(list) = render_block(child, options, level.deeper()) {
                    parts.push(format!("\n{}", list));
                }
            }
            _ => {
                if let Some(text) = render_block(child, options, level.same_indent())
                    && !text.is_empty()
                {
                    parts.push(text);
                }
            }
        }
    }

    parts.join("\n")
}

fn convert_panel(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    let panel_type = node.attr_str("panelType").unwrap_or("info").to_uppercase();
    let body = convert_children(node, options, level.unindented()).join("\n");
    format!("> **{}:**\n{}", panel_type, prefix_lines(&body, "> "))
}

fn convert_expand(node: &Node, options: &AdfToMarkdownOptions, level: Level) -> String {
    let title = node.attr_str("title").unwrap_or("Details");
    let body = convert_children(node, options, level.unindented()).join("\n\n");
    format!("<details>\n<summary>{}</summary>\n\n{}\n</details>", title, body)
}

fn convert_table(node: &Node, options: &AdfToMarkdownOptions) -> Option<String> {
    let rows = node.children();
    if rows.is_empty() {
        return None;
    }

    let mut result: Vec<String> = Vec::new();
    let mut has_header = false;
    let mut first_row_width = 0;

    for (i, row) in rows.iter().enumerate() {
        let mut row_cells: Vec<String> = Vec::new();

        for cell in row.children() {
            let colspan = cell.attr_u64("colspan").unwrap_or(1).clamp(1, MAX_COLSPAN) as usize;
            row_cells.push(convert_cell_content(cell, options));
            row_cells.extend(std::iter::repeat_n(String::new(), colspan - 1));
        }

        if i == 0 {
            first_row_width = row_cells.len();
        }

        result.push(format!("| {} |", row_cells.join(" | ")));

        let is_header_row = row.children().iter().any(|c| c.is("tableHeader"));
        if is_header_row && !has_header {
            has_header = true;
            result.push(separator(row_cells.len()));
        }
    }

    if !has_header {
        result.insert(1, separator(first_row_width));
    }

    Some(result.join("\n"))
}

fn separator(width: usize) -> String {
    format!("| {} |", vec!["---"; width].join(" | "))
}

fn convert_cell_content(cell: &Node, options: &AdfToMarkdownOptions) -> String {
    let inline: Vec<Node> = cell
        .children()
        .iter()
        .flat_map(|block| block.children().iter().cloned())
        .collect();

    convert_inline_nodes(&inline, options).replace('|', "\\|")
}

fn convert_block_card(node: &Node) -> Option<String> {
    let url = node.attr_str("url").filter(|u| !u.is_empty())?;
    Some(format!("[{}]({})", url, url))
}
