//! Structural and semantic validation of raw ADF values.
//!
//! Validation runs in two phases. The shape phase checks that every value
//! has the fields its position allows, reporting JSON-pointer paths. If the
//! shape is sound, the semantic phase walks the tree threading block/inline
//! context and checks vocabulary membership and required attributes,
//! reporting paths such as `content[2].content[0]`. All violations are
//! collected; nothing short-circuits.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use serde_json::{Map, Value};

use super::{ADF_VERSION, DOC, types};
use crate::error::{Error, Result};

const BLOCK_NODE_TYPES: &[&str] = &[
    "paragraph",
    "heading",
    "codeBlock",
    "blockquote",
    "bulletList",
    "orderedList",
    "listItem",
    "taskList",
    "taskItem",
    "table",
    "tableRow",
    "tableHeader",
    "tableCell",
    "mediaSingle",
    "media",
    "rule",
    "panel",
    "expand",
    "blockCard",
    // Reserved: accepted by the validator, not produced by the converters.
    "embedCard",
    "decisionList",
    "decisionItem",
    "layoutSection",
    "layoutColumn",
];

const INLINE_NODE_TYPES: &[&str] = &[
    "text",
    "hardBreak",
    "mention",
    "emoji",
    "inlineCard",
    "date",
    "status",
    "placeholder",
    "inlineExtension",
];

const MARK_TYPES: &[&str] = &[
    "strong",
    "em",
    "code",
    "strike",
    "underline",
    "link",
    "subsup",
    "textColor",
    "backgroundColor",
    "annotation",
];

/// Node types whose children are inline content.
const INLINE_CONTAINERS: &[&str] = &[
    types::PARAGRAPH,
    types::HEADING,
    types::TABLE_HEADER,
    types::TABLE_CELL,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

struct Schema {
    block_nodes: HashSet<&'static str>,
    inline_nodes: HashSet<&'static str>,
    marks: HashSet<&'static str>,
}

static SCHEMA: LazyLock<Schema> = LazyLock::new(|| Schema {
    block_nodes: BLOCK_NODE_TYPES.iter().copied().collect(),
    inline_nodes: INLINE_NODE_TYPES.iter().copied().collect(),
    marks: MARK_TYPES.iter().copied().collect(),
});

#[derive(Default)]
struct Errors(Vec<ValidationError>);

impl Errors {
    fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validates a raw ADF document and reports every violation found.
pub fn validate(doc: &Value) -> ValidationReport {
    let schema = &*SCHEMA;
    let mut errors = Errors::default();

    schema.check_document_shape(doc, &mut errors);
    if errors.0.is_empty() {
        schema.check_document_semantics(doc, &mut errors);
    }

    if !errors.0.is_empty() {
        tracing::debug!("ADF validation found {} violation(s)", errors.0.len());
    }

    ValidationReport {
        valid: errors.0.is_empty(),
        errors: errors.0,
    }
}

/// Fails with [`Error::SchemaViolation`] carrying every violation when the
/// document is invalid.
pub fn assert_valid(doc: &Value) -> Result<()> {
    let report = validate(doc);
    if report.valid {
        Ok(())
    } else {
        Err(Error::SchemaViolation {
            errors: report.errors,
        })
    }
}

pub fn is_valid_block_node(kind: &str) -> bool {
    SCHEMA.block_nodes.contains(kind)
}

pub fn is_valid_inline_node(kind: &str) -> bool {
    SCHEMA.inline_nodes.contains(kind)
}

pub fn is_valid_mark(kind: &str) -> bool {
    SCHEMA.marks.contains(kind)
}

impl Schema {
    fn check_document_shape(&self, doc: &Value, errors: &mut Errors) {
        let Some(obj) = doc.as_object() else {
            errors.push("", "must be object");
            return;
        };

        for required in ["version", "type", "content"] {
            if !obj.contains_key(required) {
                errors.push("", format!("must have required property '{}'", required));
            }
        }

        if let Some(version) = obj.get("version")
            && version.as_u64() != Some(ADF_VERSION)
        {
            errors.push("/version", format!("must be equal to constant {}", ADF_VERSION));
        }

        if let Some(kind) = obj.get("type")
            && kind.as_str() != Some(DOC)
        {
            errors.push("/type", format!("must be equal to constant \"{}\"", DOC));
        }

        if let Some(content) = obj.get("content") {
            match content.as_array() {
                Some(nodes) => {
                    for (i, node) in nodes.iter().enumerate() {
                        self.check_node_shape(node, &format!("/content/{}", i), errors);
                    }
                }
                None => errors.push("/content", "must be array"),
            }
        }
    }

    fn check_node_shape(&self, node: &Value, path: &str, errors: &mut Errors) {
        let Some(obj) = node.as_object() else {
            errors.push(path, "must be object");
            return;
        };

        let kind = match obj.get("type") {
            Some(Value::String(kind)) => Some(kind.as_str()),
            Some(_) => {
                errors.push(format!("{}/type", path), "must be string");
                None
            }
            None => {
                errors.push(path, "must have required property 'type'");
                None
            }
        };
        let foreign_to_kind = kind.is_some_and(|k| k != types::TEXT);

        for (key, value) in obj {
            match key.as_str() {
                "type" => {}
                "attrs" => {
                    if !value.is_object() {
                        errors.push(format!("{}/attrs", path), "must be object");
                    }
                }
                "content" => match value.as_array() {
                    Some(children) => {
                        for (i, child) in children.iter().enumerate() {
                            let child_path = format!("{}/content/{}", path, i);
                            self.check_node_shape(child, &child_path, errors);
                        }
                    }
                    None => errors.push(format!("{}/content", path), "must be array"),
                },
                "marks" => {
                    if foreign_to_kind {
                        errors.push(
                            format!("{}/marks", path),
                            "marks are only allowed on text nodes",
                        );
                    }
                    match value.as_array() {
                        Some(marks) => {
                            for (i, mark) in marks.iter().enumerate() {
                                check_mark_shape(mark, &format!("{}/marks/{}", path, i), errors);
                            }
                        }
                        None => errors.push(format!("{}/marks", path), "must be array"),
                    }
                }
                "text" => {
                    if foreign_to_kind {
                        errors.push(format!("{}/text", path), "text is only allowed on text nodes");
                    }
                    if !value.is_string() {
                        errors.push(format!("{}/text", path), "must be string");
                    }
                }
                other => errors.push(
                    path,
                    format!("must NOT have additional property '{}'", other),
                ),
            }
        }
    }

    fn check_document_semantics(&self, doc: &Value, errors: &mut Errors) {
        let Some(content) = doc.get("content").and_then(|c| c.as_array()) else {
            return;
        };

        for (i, node) in content.iter().enumerate() {
            self.check_node(node, &format!("content[{}]", i), true, errors);
        }
    }

    fn check_node(&self, node: &Value, path: &str, block_context: bool, errors: &mut Errors) {
        let kind = node.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let attrs = node.get("attrs").and_then(|a| a.as_object());

        let allowed = self.inline_nodes.contains(kind)
            || (block_context && self.block_nodes.contains(kind));
        if !allowed {
            if self.block_nodes.contains(kind) {
                errors.push(
                    path,
                    format!("Block node \"{}\" is not allowed in inline content", kind),
                );
            } else {
                errors.push(path, format!("Unknown node type \"{}\"", kind));
            }
        }

        if kind == types::TEXT
            && let Some(marks) = node.get("marks").and_then(|m| m.as_array())
        {
            for (i, mark) in marks.iter().enumerate() {
                self.check_mark(mark, &format!("{}.marks[{}]", path, i), errors);
            }
        }

        match kind {
            types::HEADING => {
                let level = attrs.and_then(|a| a.get("level"));
                if !level
                    .and_then(|l| l.as_u64())
                    .is_some_and(|l| (1..=6).contains(&l))
                {
                    errors.push(
                        path,
                        format!(
                            "Heading must have level attribute between 1 and 6, got {}",
                            level.map_or_else(|| "none".to_string(), ToString::to_string)
                        ),
                    );
                }
            }
            types::TASK_ITEM => {
                if !has_attr(attrs, "localId") {
                    errors.push(path, "taskItem must have localId attribute");
                }
                let state = attrs.and_then(|a| a.get("state")).and_then(|s| s.as_str());
                if !matches!(state, Some("TODO" | "DONE")) {
                    errors.push(path, "taskItem must have state attribute (TODO or DONE)");
                }
            }
            types::MENTION => {
                if !has_attr(attrs, "id") {
                    errors.push(path, "mention must have id attribute");
                }
            }
            types::EMOJI => {
                if !has_attr(attrs, "shortName") {
                    errors.push(path, "emoji must have shortName attribute");
                }
            }
            types::INLINE_CARD | types::BLOCK_CARD => {
                if !has_attr(attrs, "url") {
                    errors.push(path, format!("{} must have url attribute", kind));
                }
            }
            _ => {}
        }

        if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
            let children_block = !INLINE_CONTAINERS.contains(&kind);
            for (i, child) in children.iter().enumerate() {
                let child_path = format!("{}.content[{}]", path, i);
                self.check_node(child, &child_path, children_block, errors);
            }
        }
    }

    fn check_mark(&self, mark: &Value, path: &str, errors: &mut Errors) {
        let kind = mark.get("type").and_then(|t| t.as_str()).unwrap_or("");
        let attrs = mark.get("attrs").and_then(|a| a.as_object());

        if !self.marks.contains(kind) {
            errors.push(path, format!("Unknown mark type \"{}\"", kind));
            return;
        }

        match kind {
            types::LINK => {
                if !has_attr(attrs, "href") {
                    errors.push(path, "link mark must have href attribute");
                }
            }
            types::SUBSUP => {
                let sub_type = attrs.and_then(|a| a.get("type")).and_then(|t| t.as_str());
                if !matches!(sub_type, Some("sub" | "sup")) {
                    errors.push(path, "subsup mark must have type attribute (sub or sup)");
                }
            }
            _ => {}
        }
    }
}

fn check_mark_shape(mark: &Value, path: &str, errors: &mut Errors) {
    let Some(obj) = mark.as_object() else {
        errors.push(path, "must be object");
        return;
    };

    match obj.get("type") {
        Some(Value::String(_)) => {}
        Some(_) => errors.push(format!("{}/type", path), "must be string"),
        None => errors.push(path, "must have required property 'type'"),
    }

    if let Some(attrs) = obj.get("attrs")
        && !attrs.is_object()
    {
        errors.push(format!("{}/attrs", path), "must be object");
    }
}

/// Present and non-empty: `null`, `""` and `false` do not count.
fn has_attr(attrs: Option<&Map<String, Value>>, name: &str) -> bool {
    match attrs.and_then(|a| a.get(name)) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}
