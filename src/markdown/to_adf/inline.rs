use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::adf::{Mark, Node, types};
use crate::emoji;
use crate::markdown::tokens::{Nesting, Token, TokenKind};
use crate::options::MarkdownToAdfOptions;
use crate::smart_links::LinkKind;

static MENTION_OR_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+|:[A-Za-z0-9_+-]+:").unwrap());

/// Currently open marks, innermost last.
#[derive(Default)]
struct MarkStack(Vec<Mark>);

impl MarkStack {
    fn push(&mut self, mark: Mark) {
        self.0.push(mark);
    }

    /// Removes the first open mark of this type, wherever it sits.
    fn remove(&mut self, kind: &str) {
        if let Some(index) = self.0.iter().position(|m| m.is(kind)) {
            self.0.remove(index);
        }
    }

    fn text(&self, text: &str) -> Node {
        Node::text(text, &self.0)
    }
}

/// Converts one block's inline children into inline nodes.
pub(crate) fn convert_inline_tokens(
    children: &[Token],
    options: &MarkdownToAdfOptions,
) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut marks = MarkStack::default();
    let mut i = 0;

    while i < children.len() {
        let token = &children[i];
        i += 1;

        match (token.kind, token.nesting) {
            (TokenKind::Text, _) => {
                if !token.content.is_empty() {
                    split_text(&token.content, &marks, options, &mut nodes);
                }
            }
            (TokenKind::CodeInline, _) => {
                nodes.push(Node::text(&token.content, &[Mark::new(types::CODE)]));
            }
            (TokenKind::SoftBreak, _) => nodes.push(Node::text(" ", &[])),
            (TokenKind::HardBreak, _) => nodes.push(Node::new(types::HARD_BREAK)),
            (TokenKind::Strong, Nesting::Open) => marks.push(Mark::new(types::STRONG)),
            (TokenKind::Strong, Nesting::Close) => marks.remove(types::STRONG),
            (TokenKind::Em, Nesting::Open) => marks.push(Mark::new(types::EM)),
            (TokenKind::Em, Nesting::Close) => marks.remove(types::EM),
            (TokenKind::Strike, Nesting::Open) => marks.push(Mark::new(types::STRIKE)),
            (TokenKind::Strike, Nesting::Close) => marks.remove(types::STRIKE),
            (TokenKind::Link, Nesting::Open) => {
                let href = token.attr("href").unwrap_or("");

                let kind = if options.enable_smart_links {
                    options.smart_links.classify(href)
                } else {
                    LinkKind::Link
                };

                match kind {
                    LinkKind::Inline | LinkKind::Block => {
                        while i < children.len() && !is_link_close(&children[i]) {
                            i += 1;
                        }
                        i += 1;
                        nodes.push(Node::new(types::INLINE_CARD).with_attrs(json!({"url": href})));
                    }
                    LinkKind::Link => marks.push(Mark::link(href, token.attr("title"))),
                }
            }
            (TokenKind::Link, Nesting::Close) => marks.remove(types::LINK),
            (TokenKind::Image, _) => nodes.push(convert_image(token)),
            (kind, nesting) => tracing::trace!("Skipping inline {:?} {:?} token", kind, nesting),
        }
    }

    nodes
}

fn is_link_close(token: &Token) -> bool {
    token.kind == TokenKind::Link && token.nesting == Nesting::Close
}

/// Splits a text run into text, mention and emoji nodes.
fn split_text(
    text: &str,
    marks: &MarkStack,
    options: &MarkdownToAdfOptions,
    nodes: &mut Vec<Node>,
) {
    let mut last = 0;

    for m in MENTION_OR_EMOJI.find_iter(text) {
        if m.start() > last {
            nodes.push(marks.text(&text[last..m.start()]));
        }
        last = m.end();

        let matched = m.as_str();
        if let Some(username) = matched.strip_prefix('@') {
            match options.mentions.resolve(username) {
                Some(info) => {
                    let text = if info.text.is_empty() {
                        matched.to_string()
                    } else {
                        info.text
                    };
                    nodes.push(
                        Node::new(types::MENTION).with_attrs(json!({"id": info.id, "text": text})),
                    );
                }
                None => nodes.push(marks.text(matched)),
            }
        } else if emoji::is_known(matched) {
            let glyph = emoji::glyph_for(matched).unwrap_or(matched);
            nodes.push(
                Node::new(types::EMOJI).with_attrs(json!({"shortName": matched, "text": glyph})),
            );
        } else {
            nodes.push(marks.text(matched));
        }
    }

    if last < text.len() {
        nodes.push(marks.text(&text[last..]));
    }
}

fn convert_image(token: &Token) -> Node {
    let mut attrs = Map::new();
    attrs.insert("type".into(), Value::from("external"));
    attrs.insert("url".into(), Value::from(token.attr("src").unwrap_or("")));

    let alt = token
        .attr("alt")
        .filter(|a| !a.is_empty())
        .unwrap_or(token.content.as_str());
    if !alt.is_empty() {
        attrs.insert("alt".into(), Value::from(alt));
    }

    Node::new(types::MEDIA_SINGLE)
        .with_attrs(json!({"layout": "center"}))
        .with_content(vec![Node::new(types::MEDIA).with_attrs(Value::Object(attrs))])
}
