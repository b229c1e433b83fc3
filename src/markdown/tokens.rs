//! Flat Markdown token stream.
//!
//! Block structure is expressed with open/close tokens; the inline content
//! of a paragraph, heading or table cell travels as the `children` of a
//! single [`TokenKind::Inline`] token. [`tokenize`] builds this stream from
//! pulldown-cmark events, and any other tokenizer can feed the converter
//! through [`crate::markdown::tokens_to_adf`].

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableDataCell,
    /// Fenced code; the info string is in `info`.
    Fence,
    /// Indented code.
    CodeBlock,
    Rule,
    Inline,
    Text,
    CodeInline,
    SoftBreak,
    HardBreak,
    Strong,
    Em,
    Strike,
    Link,
    Image,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub nesting: Nesting,
    /// Source tag such as `h2`, `ul` or `strong`.
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub info: String,
    pub content: String,
    pub children: Vec<Token>,
}

impl Token {
    pub fn new(kind: TokenKind, nesting: Nesting, tag: &str) -> Self {
        Self {
            kind,
            nesting,
            tag: tag.to_string(),
            attrs: Vec::new(),
            info: String::new(),
            content: String::new(),
            children: Vec::new(),
        }
    }

    pub fn open(kind: TokenKind, tag: &str) -> Self {
        Self::new(kind, Nesting::Open, tag)
    }

    pub fn close(kind: TokenKind, tag: &str) -> Self {
        Self::new(kind, Nesting::Close, tag)
    }

    pub fn leaf(kind: TokenKind, tag: &str) -> Self {
        Self::new(kind, Nesting::Leaf, tag)
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Token>) -> Self {
        self.children = children;
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Tokenizes Markdown with tables and strikethrough enabled.
///
/// Task-list syntax is left as literal text; checkbox detection happens
/// during conversion.
pub fn tokenize(markdown: &str) -> Vec<Token> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut builder = StreamBuilder::default();
    for event in Parser::new_ext(markdown, options) {
        builder.event(event);
    }
    builder.finish()
}

/// What to do when the matching `End` event arrives.
enum Frame {
    Block(TokenKind, &'static str),
    InlineContainer(TokenKind, &'static str),
    Mark(TokenKind, &'static str),
    Code(Token),
    Image(Token),
    Html(String),
    TableHead,
    Table,
    Other { inline: bool },
    /// Formatting nested inside an image's alt text.
    Skip,
}

#[derive(Default)]
struct StreamBuilder {
    tokens: Vec<Token>,
    inline: Option<Vec<Token>>,
    implicit_paragraph: bool,
    frames: Vec<Frame>,
    in_table_head: bool,
    table_body_open: bool,
}

impl StreamBuilder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(alt) = self.image_alt() {
                    alt.push_str(&code);
                } else {
                    let token =
                        Token::leaf(TokenKind::CodeInline, "code").with_content(code.as_ref());
                    self.push_inline(token);
                }
            }
            Event::Html(html) => match self.frames.last_mut() {
                Some(Frame::Html(buffer)) => buffer.push_str(&html),
                _ => self.text(&html),
            },
            Event::InlineHtml(html) => self.text(&html),
            Event::SoftBreak => self.push_inline(Token::leaf(TokenKind::SoftBreak, "br")),
            Event::HardBreak => self.push_inline(Token::leaf(TokenKind::HardBreak, "br")),
            Event::Rule => {
                self.close_implicit_paragraph();
                self.tokens.push(Token::leaf(TokenKind::Rule, "hr"));
            }
            other => {
                tracing::trace!("Unmapped Markdown event: {:?}", other);
                self.push_inline(Token::leaf(TokenKind::Other, ""));
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        if self.image_alt().is_some() {
            self.frames.push(Frame::Skip);
            return;
        }

        match tag {
            Tag::Paragraph => self.open_inline_container(TokenKind::Paragraph, "p"),
            Tag::Heading { level, .. } => {
                self.open_inline_container(TokenKind::Heading, heading_tag(level))
            }
            Tag::BlockQuote(_) => self.open_block(TokenKind::Blockquote, "blockquote"),
            Tag::CodeBlock(kind) => {
                self.close_implicit_paragraph();
                let token = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let mut token = Token::leaf(TokenKind::Fence, "code");
                        token.info = info.to_string();
                        token
                    }
                    CodeBlockKind::Indented => Token::leaf(TokenKind::CodeBlock, "code"),
                };
                self.frames.push(Frame::Code(token));
            }
            Tag::HtmlBlock => {
                self.close_implicit_paragraph();
                self.frames.push(Frame::Html(String::new()));
            }
            Tag::List(Some(start)) => {
                self.close_implicit_paragraph();
                let token = Token::open(TokenKind::OrderedList, "ol")
                    .with_attr("start", start.to_string());
                self.tokens.push(token);
                self.frames.push(Frame::Block(TokenKind::OrderedList, "ol"));
            }
            Tag::List(None) => self.open_block(TokenKind::BulletList, "ul"),
            Tag::Item => self.open_block(TokenKind::ListItem, "li"),
            Tag::Table(_) => {
                self.close_implicit_paragraph();
                self.tokens.push(Token::open(TokenKind::Table, "table"));
                self.frames.push(Frame::Table);
            }
            Tag::TableHead => {
                self.tokens.push(Token::open(TokenKind::TableHead, "thead"));
                self.tokens.push(Token::open(TokenKind::TableRow, "tr"));
                self.in_table_head = true;
                self.frames.push(Frame::TableHead);
            }
            Tag::TableRow => {
                if !self.table_body_open {
                    self.tokens.push(Token::open(TokenKind::TableBody, "tbody"));
                    self.table_body_open = true;
                }
                self.open_block(TokenKind::TableRow, "tr");
            }
            Tag::TableCell => {
                if self.in_table_head {
                    self.open_inline_container(TokenKind::TableHeaderCell, "th");
                } else {
                    self.open_inline_container(TokenKind::TableDataCell, "td");
                }
            }
            Tag::Emphasis => self.open_mark(Token::open(TokenKind::Em, "em")),
            Tag::Strong => self.open_mark(Token::open(TokenKind::Strong, "strong")),
            Tag::Strikethrough => self.open_mark(Token::open(TokenKind::Strike, "s")),
            Tag::Link { dest_url, title, .. } => {
                let mut token =
                    Token::open(TokenKind::Link, "a").with_attr("href", dest_url.as_ref());
                if !title.is_empty() {
                    token = token.with_attr("title", title.as_ref());
                }
                self.open_mark(token);
            }
            Tag::Image { dest_url, title, .. } => {
                let mut token =
                    Token::leaf(TokenKind::Image, "img").with_attr("src", dest_url.as_ref());
                if !title.is_empty() {
                    token = token.with_attr("title", title.as_ref());
                }
                self.frames.push(Frame::Image(token));
            }
            other => {
                tracing::trace!("Unmapped Markdown tag: {:?}", other);
                let inline = self.inline.is_some();
                if inline {
                    self.push_inline(Token::open(TokenKind::Other, ""));
                } else {
                    self.tokens.push(Token::open(TokenKind::Other, ""));
                }
                self.frames.push(Frame::Other { inline });
            }
        }
    }

    fn end(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };

        match frame {
            Frame::Block(kind, tag) => self.close_block(kind, tag),
            Frame::InlineContainer(kind, tag) => {
                self.flush_inline();
                self.tokens.push(Token::close(kind, tag));
            }
            Frame::Mark(kind, tag) => self.push_inline(Token::close(kind, tag)),
            Frame::Code(token) => self.tokens.push(token),
            Frame::Image(token) => {
                let alt = token.content.clone();
                self.push_inline(token.with_attr("alt", alt));
            }
            Frame::Html(html) => self.html_paragraph(&html),
            Frame::TableHead => {
                self.tokens.push(Token::close(TokenKind::TableRow, "tr"));
                self.tokens.push(Token::close(TokenKind::TableHead, "thead"));
                self.in_table_head = false;
            }
            Frame::Table => {
                if self.table_body_open {
                    self.tokens.push(Token::close(TokenKind::TableBody, "tbody"));
                    self.table_body_open = false;
                }
                self.tokens.push(Token::close(TokenKind::Table, "table"));
            }
            Frame::Other { inline: true } => self.push_inline(Token::close(TokenKind::Other, "")),
            Frame::Other { inline: false } => self.close_block(TokenKind::Other, ""),
            Frame::Skip => {}
        }
    }

    fn text(&mut self, text: &str) {
        match self.frames.last_mut() {
            Some(Frame::Code(token)) => return token.content.push_str(text),
            Some(Frame::Html(buffer)) => return buffer.push_str(text),
            _ => {}
        }
        if let Some(alt) = self.image_alt() {
            alt.push_str(text);
            return;
        }

        let children = self.inline_children();
        match children.last_mut() {
            Some(last) if last.kind == TokenKind::Text => last.content.push_str(text),
            _ => children.push(Token::leaf(TokenKind::Text, "").with_content(text)),
        }
    }

    /// Alt text buffer of the innermost open image, if any.
    fn image_alt(&mut self) -> Option<&mut String> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Image(token) => Some(&mut token.content),
            _ => None,
        })
    }

    fn open_block(&mut self, kind: TokenKind, tag: &'static str) {
        self.close_implicit_paragraph();
        self.tokens.push(Token::open(kind, tag));
        self.frames.push(Frame::Block(kind, tag));
    }

    fn close_block(&mut self, kind: TokenKind, tag: &str) {
        self.close_implicit_paragraph();
        self.tokens.push(Token::close(kind, tag));
    }

    fn open_inline_container(&mut self, kind: TokenKind, tag: &'static str) {
        self.close_implicit_paragraph();
        self.tokens.push(Token::open(kind, tag));
        self.inline = Some(Vec::new());
        self.frames.push(Frame::InlineContainer(kind, tag));
    }

    fn open_mark(&mut self, token: Token) {
        let (kind, tag) = match token.kind {
            TokenKind::Strong => (TokenKind::Strong, "strong"),
            TokenKind::Em => (TokenKind::Em, "em"),
            TokenKind::Strike => (TokenKind::Strike, "s"),
            _ => (TokenKind::Link, "a"),
        };
        self.push_inline(token);
        self.frames.push(Frame::Mark(kind, tag));
    }

    fn push_inline(&mut self, token: Token) {
        self.inline_children().push(token);
    }

    /// The open inline buffer; inline content outside a paragraph (tight
    /// list items) gets a synthetic one.
    fn inline_children(&mut self) -> &mut Vec<Token> {
        if self.inline.is_none() {
            self.tokens.push(Token::open(TokenKind::Paragraph, "p"));
            self.implicit_paragraph = true;
        }
        self.inline.get_or_insert_with(Vec::new)
    }

    fn flush_inline(&mut self) {
        if let Some(children) = self.inline.take() {
            self.tokens
                .push(Token::leaf(TokenKind::Inline, "").with_children(children));
        }
    }

    fn close_implicit_paragraph(&mut self) {
        if self.implicit_paragraph {
            self.flush_inline();
            self.tokens.push(Token::close(TokenKind::Paragraph, "p"));
            self.implicit_paragraph = false;
        }
    }

    fn html_paragraph(&mut self, html: &str) {
        let mut children = Vec::new();
        for (i, line) in html.trim_end_matches('\n').lines().enumerate() {
            if i > 0 {
                children.push(Token::leaf(TokenKind::SoftBreak, "br"));
            }
            children.push(Token::leaf(TokenKind::Text, "").with_content(line));
        }
        if children.is_empty() {
            return;
        }

        self.tokens.push(Token::open(TokenKind::Paragraph, "p"));
        self.tokens
            .push(Token::leaf(TokenKind::Inline, "").with_children(children));
        self.tokens.push(Token::close(TokenKind::Paragraph, "p"));
    }

    fn finish(mut self) -> Vec<Token> {
        self.close_implicit_paragraph();
        self.tokens
    }
}

fn heading_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
