//! Promotion of checkbox bullet lists to task lists.
//!
//! Items are converted first; the list-level decision is made afterwards
//! from the collected flags, so no node is mutated after construction.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;
use uuid::Uuid;

use crate::adf::{Node, types};

static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[( |x|X)\](?:\s+|$)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Todo,
    Done,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Todo => "TODO",
            TaskState::Done => "DONE",
        }
    }
}

/// A converted list item and the checkbox state found on it, if any.
pub(crate) struct ListItem {
    pub content: Vec<Node>,
    pub task: Option<TaskState>,
}

/// Reads a leading `[ ]`/`[x]` marker off a paragraph's first text run and
/// returns the paragraph without it.
pub(crate) fn strip_checkbox(paragraph: &Node) -> Option<(TaskState, Node)> {
    let first = paragraph.children().first()?;
    if !first.is(types::TEXT) {
        return None;
    }

    let text = first.text_str();
    let caps = CHECKBOX.captures(text)?;
    let state = if &caps[1] == " " {
        TaskState::Todo
    } else {
        TaskState::Done
    };
    let rest = &text[caps[0].len()..];

    let mut content = paragraph.children().to_vec();
    if rest.is_empty() {
        content.remove(0);
    } else {
        content[0] = Node {
            text: Some(rest.to_string()),
            ..first.clone()
        };
    }

    let cleaned = Node {
        content: None,
        ..paragraph.clone()
    }
    .with_optional_content(content);

    Some((state, cleaned))
}

/// A bullet list, or a task list when any item carried a checkbox.
pub(crate) fn build_bullet_list(items: Vec<ListItem>) -> Node {
    if !items.iter().any(|item| item.task.is_some()) {
        let content = items
            .into_iter()
            .map(|item| Node::new(types::LIST_ITEM).with_content(item.content))
            .collect();
        return Node::new(types::BULLET_LIST).with_content(content);
    }

    tracing::debug!("Promoting bullet list with {} item(s) to task list", items.len());

    let content = items
        .into_iter()
        .map(|item| {
            let state = item.task.unwrap_or(TaskState::Todo);
            Node::new(types::TASK_ITEM)
                .with_attrs(json!({"localId": local_id(), "state": state.as_str()}))
                .with_content(item.content)
        })
        .collect();

    Node::new(types::TASK_LIST)
        .with_attrs(json!({"localId": local_id()}))
        .with_content(content)
}

fn local_id() -> String {
    Uuid::new_v4().to_string()
}
