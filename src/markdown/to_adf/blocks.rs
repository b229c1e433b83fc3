use serde_json::json;

use super::inline::convert_inline_tokens;
use super::tasks::{self, ListItem};
use crate::adf::{Node, types};
use crate::markdown::tokens::{Nesting, Token, TokenKind};
use crate::options::MarkdownToAdfOptions;

const MAX_DEPTH: usize = 50;

/// Converts a run of block tokens into block nodes.
pub(crate) fn convert_blocks(
    tokens: &[Token],
    options: &MarkdownToAdfOptions,
    depth: usize,
) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = tokens;

    while !rest.is_empty() {
        let (span, tail) = split_block(rest);
        if let Some(node) = convert_block(span, options, depth) {
            nodes.push(node);
        }
        rest = tail;
    }

    nodes
}

/// Splits off the leading block: an open token through its matching close,
/// or a single token for anything else.
fn split_block(tokens: &[Token]) -> (&[Token], &[Token]) {
    let Some(first) = tokens.first() else {
        return (tokens, tokens);
    };

    if first.nesting != Nesting::Open || first.kind == TokenKind::Other {
        return tokens.split_at(1);
    }

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != first.kind {
            continue;
        }
        match token.nesting {
            Nesting::Open => depth += 1,
            Nesting::Close => {
                depth -= 1;
                if depth == 0 {
                    return tokens.split_at(i + 1);
                }
            }
            Nesting::Leaf => {}
        }
    }

    (tokens, &[])
}

/// Tokens strictly between a span's open and close.
fn inner(span: &[Token]) -> &[Token] {
    match span {
        [open, body @ .., close]
            if open.nesting == Nesting::Open
                && close.nesting == Nesting::Close
                && close.kind == open.kind =>
        {
            body
        }
        [_, body @ ..] => body,
        [] => span,
    }
}

fn inline_children(span: &[Token]) -> &[Token] {
    inner(span)
        .iter()
        .find(|t| t.kind == TokenKind::Inline)
        .map(|t| t.children.as_slice())
        .unwrap_or_default()
}

fn convert_block(span: &[Token], options: &MarkdownToAdfOptions, depth: usize) -> Option<Node> {
    let first = span.first()?;

    if depth > MAX_DEPTH {
        tracing::trace!("Skipping {:?} beyond max nesting depth", first.kind);
        return None;
    }

    match (first.kind, first.nesting) {
        (TokenKind::Paragraph, Nesting::Open) => Some(convert_paragraph(span, options)),
        (TokenKind::Heading, Nesting::Open) => Some(convert_heading(span, options)),
        (TokenKind::Fence | TokenKind::CodeBlock, _) => Some(convert_code_block(first)),
        (TokenKind::Blockquote, Nesting::Open) => Some(
            Node::new(types::BLOCKQUOTE)
                .with_content(convert_blocks(inner(span), options, depth + 1)),
        ),
        (TokenKind::BulletList, Nesting::Open) => Some(convert_bullet_list(span, options, depth)),
        (TokenKind::OrderedList, Nesting::Open) => {
            Some(convert_ordered_list(span, options, depth))
        }
        (TokenKind::Table, Nesting::Open) => Some(convert_table(span, options)),
        (TokenKind::Rule, _) => Some(Node::new(types::RULE)),
        (kind, nesting) => {
            tracing::trace!("Skipping {:?} {:?} token", kind, nesting);
            None
        }
    }
}

fn convert_paragraph(span: &[Token], options: &MarkdownToAdfOptions) -> Node {
    let content = convert_inline_tokens(inline_children(span), options);
    Node::new(types::PARAGRAPH).with_optional_content(content)
}

fn convert_heading(span: &[Token], options: &MarkdownToAdfOptions) -> Node {
    let level = heading_level(&span[0].tag);
    let content = convert_inline_tokens(inline_children(span), options);
    Node::new(types::HEADING)
        .with_attrs(json!({"level": level}))
        .with_optional_content(content)
}

/// `h1`..`h6` to a level; anything else is level 1.
fn heading_level(tag: &str) -> u64 {
    tag.strip_prefix('h')
        .and_then(|n| n.parse::<u64>().ok())
        .filter(|n| (1..=6).contains(n))
        .unwrap_or(1)
}

fn convert_code_block(token: &Token) -> Node {
    let mut node = Node::new(types::CODE_BLOCK);

    if let Some(language) = token.info.split_whitespace().next() {
        node = node.with_attrs(json!({"language": language}));
    }

    if token.content.is_empty() {
        return node;
    }

    let text = token.content.strip_suffix('\n').unwrap_or(token.content.as_str());
    node.with_content(vec![Node::text(text, &[])])
}

fn convert_list_items(
    span: &[Token],
    options: &MarkdownToAdfOptions,
    depth: usize,
) -> Vec<ListItem> {
    let mut items = Vec::new();
    let mut rest = inner(span);

    while !rest.is_empty() {
        let (item, tail) = split_block(rest);
        rest = tail;

        match item.first() {
            Some(token) if token.kind == TokenKind::ListItem && token.nesting == Nesting::Open => {
                items.push(convert_list_item(item, options, depth));
            }
            Some(token) => tracing::trace!("Skipping {:?} token inside list", token.kind),
            None => {}
        }
    }

    items
}

/// Converts one item's blocks, detecting a leading checkbox marker.
fn convert_list_item(span: &[Token], options: &MarkdownToAdfOptions, depth: usize) -> ListItem {
    let mut content = convert_blocks(inner(span), options, depth + 1);
    let mut task = None;

    if let Some(first) = content.first_mut()
        && first.is(types::PARAGRAPH)
        && let Some((state, cleaned)) = tasks::strip_checkbox(first)
    {
        task = Some(state);
        *first = cleaned;
    }

    ListItem { content, task }
}

fn convert_bullet_list(span: &[Token], options: &MarkdownToAdfOptions, depth: usize) -> Node {
    tasks::build_bullet_list(convert_list_items(span, options, depth))
}

fn convert_ordered_list(span: &[Token], options: &MarkdownToAdfOptions, depth: usize) -> Node {
    let start = span[0]
        .attr("start")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(1);

    let items = convert_list_items(span, options, depth)
        .into_iter()
        .map(|item| {
            if item.task.is_some() {
                tracing::trace!("Ignoring checkbox marker in ordered list item");
            }
            Node::new(types::LIST_ITEM).with_content(item.content)
        })
        .collect();

    let list = Node::new(types::ORDERED_LIST);
    let list = if start != 1 {
        list.with_attrs(json!({"order": start}))
    } else {
        list
    };
    list.with_content(items)
}

fn convert_table(span: &[Token], options: &MarkdownToAdfOptions) -> Node {
    let body = inner(span);
    let mut rows = Vec::new();
    let mut in_head = false;

    for (i, token) in body.iter().enumerate() {
        match (token.kind, token.nesting) {
            (TokenKind::TableHead, Nesting::Open) => in_head = true,
            (TokenKind::TableHead, Nesting::Close) => in_head = false,
            (TokenKind::TableRow, Nesting::Open) => {
                let (row, _) = split_block(&body[i..]);
                rows.push(convert_table_row(row, in_head, options));
            }
            _ => {}
        }
    }

    Node::new(types::TABLE).with_content(rows)
}

fn convert_table_row(span: &[Token], in_head: bool, options: &MarkdownToAdfOptions) -> Node {
    let body = inner(span);
    let cells: Vec<(&[Token], bool)> = body
        .iter()
        .enumerate()
        .filter(|(_, t)| {
            t.nesting == Nesting::Open
                && matches!(t.kind, TokenKind::TableHeaderCell | TokenKind::TableDataCell)
        })
        .map(|(i, t)| {
            let (cell, _) = split_block(&body[i..]);
            (cell, t.kind == TokenKind::TableHeaderCell)
        })
        .collect();

    let header_row = in_head || cells.iter().any(|(_, is_th)| *is_th);
    let cell_type = if header_row {
        types::TABLE_HEADER
    } else {
        types::TABLE_CELL
    };

    let content = cells
        .into_iter()
        .map(|(cell, _)| {
            let inline = convert_inline_tokens(inline_children(cell), options);
            Node::new(cell_type)
                .with_content(vec![Node::new(types::PARAGRAPH).with_optional_content(inline)])
        })
        .collect();

    Node::new(types::TABLE_ROW).with_content(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::tokens::tokenize;

    fn convert(markdown: &str) -> Vec<Node> {
        convert_blocks(&tokenize(markdown), &MarkdownToAdfOptions::default(), 0)
    }

    fn to_json(nodes: &[Node]) -> serde_json::Value {
        serde_json::to_value(nodes).unwrap()
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=6u64 {
            let markdown = format!("{} Heading {}", "#".repeat(level as usize), level);
            let nodes = convert(&markdown);
            assert_eq!(nodes[0].attr_u64("level"), Some(level));
            assert_eq!(nodes[0].children()[0].text_str(), format!("Heading {}", level));
        }
    }

    #[test]
    fn test_heading_level_fallback() {
        assert_eq!(heading_level("h7"), 1);
        assert_eq!(heading_level("p"), 1);
        assert_eq!(heading_level("h4"), 4);
    }

    #[test]
    fn test_empty_heading_has_no_content() {
        let nodes = convert("#");
        assert_eq!(to_json(&nodes), json!([{"type": "heading", "attrs": {"level": 1}}]));
    }

    #[test]
    fn test_code_block_language_and_trailing_newline() {
        let nodes = convert("```python extra\nprint('hi')\n```");
        assert_eq!(
            to_json(&nodes),
            json!([{
                "type": "codeBlock",
                "attrs": {"language": "python"},
                "content": [{"type": "text", "text": "print('hi')"}]
            }])
        );
    }

    #[test]
    fn test_code_block_without_language_or_content() {
        let nodes = convert("```\n```");
        assert_eq!(to_json(&nodes), json!([{"type": "codeBlock"}]));
    }

    #[test]
    fn test_indented_code_block() {
        let nodes = convert("    let x = 1;");
        assert_eq!(nodes[0].kind, types::CODE_BLOCK);
        assert_eq!(nodes[0].children()[0].text_str(), "let x = 1;");
    }

    #[test]
    fn test_nested_blockquotes() {
        let nodes = convert("> outer\n>\n> > inner");
        assert_eq!(
            to_json(&nodes),
            json!([{
                "type": "blockquote",
                "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "outer"}]},
                    {"type": "blockquote", "content": [
                        {"type": "paragraph", "content": [{"type": "text", "text": "inner"}]}
                    ]}
                ]
            }])
        );
    }

    #[test]
    fn test_ordered_list_order_attr() {
        let nodes = convert("1. a\n2. b");
        assert!(nodes[0].attrs.is_none());

        let nodes = convert("5. a\n6. b");
        assert_eq!(nodes[0].attr_u64("order"), Some(5));
        assert_eq!(nodes[0].children().len(), 2);
    }

    #[test]
    fn test_ordered_list_keeps_list_items() {
        let nodes = convert("1. [x] done");
        assert_eq!(nodes[0].children()[0].kind, types::LIST_ITEM);
        assert_eq!(nodes[0].children()[0].children()[0].children()[0].text_str(), "done");
    }

    #[test]
    fn test_nested_bullet_list() {
        let nodes = convert("- parent\n  - child");
        let item = &nodes[0].children()[0];
        assert_eq!(item.children()[0].kind, types::PARAGRAPH);
        assert_eq!(item.children()[1].kind, types::BULLET_LIST);
    }

    #[test]
    fn test_table_header_and_body_rows() {
        let nodes = convert("| A | B |\n|---|---|\n| 1 |   |");
        assert_eq!(
            to_json(&nodes),
            json!([{
                "type": "table",
                "content": [
                    {"type": "tableRow", "content": [
                        {"type": "tableHeader", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "A"}]}]},
                        {"type": "tableHeader", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "B"}]}]}
                    ]},
                    {"type": "tableRow", "content": [
                        {"type": "tableCell", "content": [{"type": "paragraph", "content": [{"type": "text", "text": "1"}]}]},
                        {"type": "tableCell", "content": [{"type": "paragraph"}]}
                    ]}
                ]
            }])
        );
    }

    #[test]
    fn test_header_cell_token_marks_row_as_header() {
        let tokens = vec![
            Token::open(TokenKind::Table, "table"),
            Token::open(TokenKind::TableRow, "tr"),
            Token::open(TokenKind::TableDataCell, "td"),
            Token::leaf(TokenKind::Inline, ""),
            Token::close(TokenKind::TableDataCell, "td"),
            Token::open(TokenKind::TableHeaderCell, "th"),
            Token::leaf(TokenKind::Inline, ""),
            Token::close(TokenKind::TableHeaderCell, "th"),
            Token::close(TokenKind::TableRow, "tr"),
            Token::close(TokenKind::Table, "table"),
        ];
        let nodes = convert_blocks(&tokens, &MarkdownToAdfOptions::default(), 0);
        let row = &nodes[0].children()[0];
        assert!(row.children().iter().all(|c| c.is(types::TABLE_HEADER)));
    }

    #[test]
    fn test_rule() {
        assert_eq!(to_json(&convert("---")), json!([{"type": "rule"}]));
    }

    #[test]
    fn test_unknown_tokens_are_skipped() {
        let tokens = vec![
            Token::open(TokenKind::Other, "aside"),
            Token::open(TokenKind::Paragraph, "p"),
            Token::leaf(TokenKind::Inline, "")
                .with_children(vec![Token::leaf(TokenKind::Text, "").with_content("kept")]),
            Token::close(TokenKind::Paragraph, "p"),
            Token::close(TokenKind::Other, "aside"),
            Token::close(TokenKind::Paragraph, "p"),
        ];
        let nodes = convert_blocks(&tokens, &MarkdownToAdfOptions::default(), 0);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children()[0].text_str(), "kept");
    }

    #[test]
    fn test_unclosed_block_consumes_rest() {
        let tokens = vec![
            Token::open(TokenKind::Blockquote, "blockquote"),
            Token::leaf(TokenKind::Rule, "hr"),
        ];
        let nodes = convert_blocks(&tokens, &MarkdownToAdfOptions::default(), 0);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].children()[0].kind, types::RULE);
    }

    #[test]
    fn test_deep_nesting_is_bounded() {
        let markdown = ">".repeat(200) + " deep";
        let nodes = convert(&markdown);
        assert_eq!(nodes.len(), 1);
    }
}
