//! Mention resolution (Markdown → ADF) and formatting (ADF → Markdown).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

static LINKED_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\[([^\]]+)\]\(([^)]+)\)").unwrap());

static SIMPLE_MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)").unwrap());

/// A resolved mention: the account id and the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionInfo {
    pub id: String,
    pub text: String,
}

pub type ResolveFn = Arc<dyn Fn(&str) -> Option<MentionInfo> + Send + Sync>;
pub type FormatFn = Arc<dyn Fn(&str, Option<&str>) -> String + Send + Sync>;

#[derive(Clone, Default)]
pub enum MentionResolver {
    /// The username is the id.
    #[default]
    Username,
    /// Lowercased username → account id; unknown users stay plain text.
    Directory(HashMap<String, String>),
    Custom(ResolveFn),
}

impl MentionResolver {
    /// Builds a directory resolver, normalizing keys to lowercase.
    pub fn directory<K, V>(users: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::Directory(
            users
                .into_iter()
                .map(|(name, id)| (name.as_ref().to_lowercase(), id.into()))
                .collect(),
        )
    }

    pub fn custom(f: impl Fn(&str) -> Option<MentionInfo> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn resolve(&self, username: &str) -> Option<MentionInfo> {
        match self {
            Self::Username => Some(MentionInfo {
                id: username.to_string(),
                text: format!("@{}", username),
            }),
            Self::Directory(users) => users.get(&username.to_lowercase()).map(|id| MentionInfo {
                id: id.clone(),
                text: format!("@{}", username),
            }),
            Self::Custom(f) => f(username),
        }
    }
}

impl fmt::Debug for MentionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("Username"),
            Self::Directory(users) => f.debug_tuple("Directory").field(&users.len()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Clone, Default)]
pub enum MentionFormatter {
    /// `@text`, or `@id` without text.
    #[default]
    Simple,
    /// `@[text](id)`, which [`parse_mention`] reads back.
    Linked,
    /// The stored text as-is, or `@unknown`.
    Display,
    Custom(FormatFn),
}

impl MentionFormatter {
    pub fn custom(f: impl Fn(&str, Option<&str>) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn format(&self, id: &str, text: Option<&str>) -> String {
        let text = text.filter(|t| !t.is_empty());
        match self {
            Self::Simple => match text {
                Some(t) if t.starts_with('@') => t.to_string(),
                Some(t) => format!("@{}", t),
                None => format!("@{}", id),
            },
            Self::Linked => format!("@[{}]({})", text.unwrap_or(id), id),
            Self::Display => text.unwrap_or("@unknown").to_string(),
            Self::Custom(f) => f(id, text),
        }
    }
}

impl fmt::Debug for MentionFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => f.write_str("Simple"),
            Self::Linked => f.write_str("Linked"),
            Self::Display => f.write_str("Display"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMention {
    Linked { display_name: String, id: String },
    Username(String),
}

/// Reads `@[Display Name](id)` or `@username` out of a string.
pub fn parse_mention(s: &str) -> Option<ParsedMention> {
    if let Some(caps) = LINKED_MENTION.captures(s) {
        return Some(ParsedMention::Linked {
            display_name: caps[1].to_string(),
            id: caps[2].to_string(),
        });
    }

    SIMPLE_MENTION
        .captures(s)
        .map(|caps| ParsedMention::Username(caps[1].to_string()))
}
