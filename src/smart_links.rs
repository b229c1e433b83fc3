//! Smart-link classification.
//!
//! Decides whether a URL becomes an inline card, a block card, or stays a
//! plain link mark.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use url::Url;

static ISSUE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://[\w.-]+\.atlassian\.net/browse/[A-Z]+-\d+").unwrap()
});

static WIKI_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://[\w.-]+\.atlassian\.net/wiki/").unwrap()
});

static BOARD_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://[\w.-]+\.atlassian\.net/jira/").unwrap()
});

static ISSUE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/browse/([A-Z]+-\d+)").unwrap());

const ATLASSIAN_HOST_SUFFIXES: &[&str] = &[".atlassian.net", ".atlassian.com", ".jira.com"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Inline,
    Block,
    Link,
}

/// The built-in policy: issue and board URLs are inline, wiki pages are block.
pub fn classify(url: &str) -> LinkKind {
    if ISSUE_URL.is_match(url) {
        LinkKind::Inline
    } else if WIKI_URL.is_match(url) {
        LinkKind::Block
    } else if BOARD_URL.is_match(url) {
        LinkKind::Inline
    } else {
        LinkKind::Link
    }
}

pub type ClassifyFn = Arc<dyn Fn(&str) -> LinkKind + Send + Sync>;

#[derive(Clone, Default)]
pub enum SmartLinkPolicy {
    #[default]
    Builtin,
    Domains(DomainRules),
    /// Every Atlassian URL becomes an inline card.
    AtlassianInline,
    /// Every Atlassian URL becomes a block card.
    AtlassianBlock,
    Disabled,
    Custom(ClassifyFn),
}

impl SmartLinkPolicy {
    pub fn custom(f: impl Fn(&str) -> LinkKind + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn classify(&self, url: &str) -> LinkKind {
        match self {
            Self::Builtin => classify(url),
            Self::Domains(rules) => rules.classify(url),
            Self::AtlassianInline if is_atlassian_url(url) => LinkKind::Inline,
            Self::AtlassianBlock if is_atlassian_url(url) => LinkKind::Block,
            Self::AtlassianInline | Self::AtlassianBlock | Self::Disabled => LinkKind::Link,
            Self::Custom(f) => f(url),
        }
    }
}

impl fmt::Debug for SmartLinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => f.write_str("Builtin"),
            Self::Domains(rules) => f.debug_tuple("Domains").field(rules).finish(),
            Self::AtlassianInline => f.write_str("AtlassianInline"),
            Self::AtlassianBlock => f.write_str("AtlassianBlock"),
            Self::Disabled => f.write_str("Disabled"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Domain allow-lists checked before the built-in policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRules {
    pub inline_domains: Vec<String>,
    pub block_domains: Vec<String>,
    /// Fall back to the built-in policy for Atlassian URLs.
    pub fallback: bool,
}

impl Default for DomainRules {
    fn default() -> Self {
        Self {
            inline_domains: Vec::new(),
            block_domains: Vec::new(),
            fallback: true,
        }
    }
}

impl DomainRules {
    pub fn classify(&self, url: &str) -> LinkKind {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return LinkKind::Link;
        };

        let matches = |domains: &[String]| {
            domains
                .iter()
                .any(|d| host.contains(&d.to_lowercase()))
        };

        if matches(&self.inline_domains) {
            LinkKind::Inline
        } else if matches(&self.block_domains) {
            LinkKind::Block
        } else if self.fallback && is_atlassian_url(url) {
            classify(url)
        } else {
            LinkKind::Link
        }
    }
}

pub fn is_atlassian_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .is_some_and(|host| {
            ATLASSIAN_HOST_SUFFIXES
                .iter()
                .any(|suffix| host.ends_with(suffix))
        })
}

/// `PROJ-123` from a `/browse/PROJ-123` URL.
pub fn extract_issue_key(url: &str) -> Option<String> {
    ISSUE_KEY
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    pub space_key: Option<String>,
    pub page_id: Option<String>,
}

/// Space key and page id from a `/wiki/spaces/{space}/pages/{id}` URL.
pub fn extract_page_info(url: &str) -> Option<PageInfo> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed.path().split('/').collect();

    let after = |name: &str| {
        segments
            .iter()
            .position(|s| *s == name)
            .and_then(|i| segments.get(i + 1))
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let info = PageInfo {
        space_key: after("spaces"),
        page_id: after("pages"),
    };

    (info.space_key.is_some() || info.page_id.is_some()).then_some(info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_builtin() {
        assert_eq!(
            classify("https://acme.atlassian.net/browse/PROJ-123"),
            LinkKind::Inline
        );
        assert_eq!(
            classify("https://acme.atlassian.net/wiki/spaces/DOC/pages/123"),
            LinkKind::Block
        );
        assert_eq!(
            classify("https://acme.atlassian.net/jira/software/projects/PROJ/boards/1"),
            LinkKind::Inline
        );
        assert_eq!(classify("https://example.com"), LinkKind::Link);
    }

    #[test]
    fn test_classify_malformed_is_link() {
        assert_eq!(classify("not a url"), LinkKind::Link);
        assert_eq!(classify(""), LinkKind::Link);
        assert_eq!(
            classify("https://acme.atlassian.net/browse/proj-1"),
            LinkKind::Link
        );
    }

    #[test]
    fn test_domain_rules() {
        let rules = DomainRules {
            inline_domains: vec!["github.com".into()],
            block_domains: vec!["Docs.Example.org".into()],
            fallback: true,
        };
        assert_eq!(
            rules.classify("https://github.com/org/repo/issues/1"),
            LinkKind::Inline
        );
        assert_eq!(
            rules.classify("https://docs.example.org/guide"),
            LinkKind::Block
        );
        assert_eq!(
            rules.classify("https://acme.atlassian.net/browse/ABC-1"),
            LinkKind::Inline
        );
        assert_eq!(rules.classify("https://example.net"), LinkKind::Link);
        assert_eq!(rules.classify("::garbage::"), LinkKind::Link);
    }

    #[test]
    fn test_domain_rules_without_fallback() {
        let rules = DomainRules {
            fallback: false,
            ..DomainRules::default()
        };
        assert_eq!(
            rules.classify("https://acme.atlassian.net/browse/ABC-1"),
            LinkKind::Link
        );
    }

    #[test]
    fn test_policies() {
        let issue = "https://acme.atlassian.net/browse/ABC-1";
        let wiki = "https://acme.atlassian.net/wiki/x";
        let other = "https://example.com";

        assert_eq!(SmartLinkPolicy::default().classify(wiki), LinkKind::Block);
        assert_eq!(SmartLinkPolicy::AtlassianInline.classify(wiki), LinkKind::Inline);
        assert_eq!(SmartLinkPolicy::AtlassianBlock.classify(issue), LinkKind::Block);
        assert_eq!(SmartLinkPolicy::AtlassianBlock.classify(other), LinkKind::Link);
        assert_eq!(SmartLinkPolicy::Disabled.classify(issue), LinkKind::Link);

        let custom = SmartLinkPolicy::custom(|url| {
            if url.ends_with(".pdf") {
                LinkKind::Block
            } else {
                LinkKind::Link
            }
        });
        assert_eq!(custom.classify("https://x.io/a.pdf"), LinkKind::Block);
        assert_eq!(custom.classify(issue), LinkKind::Link);
        assert_eq!(format!("{:?}", custom), "Custom(..)");
    }

    #[test]
    fn test_is_atlassian_url() {
        assert!(is_atlassian_url("https://acme.atlassian.net/browse/A-1"));
        assert!(is_atlassian_url("https://id.atlassian.com/login"));
        assert!(is_atlassian_url("https://legacy.jira.com/"));
        assert!(!is_atlassian_url("https://atlassian.net.evil.com/"));
        assert!(!is_atlassian_url("nope"));
    }

    #[test]
    fn test_extract_issue_key() {
        assert_eq!(
            extract_issue_key("https://acme.atlassian.net/browse/PROJ-42"),
            Some("PROJ-42".to_string())
        );
        assert_eq!(extract_issue_key("https://example.com"), None);
    }

    #[test]
    fn test_extract_page_info() {
        let url = "https://acme.atlassian.net/wiki/spaces/DOC/pages/123/Title";
        let info = extract_page_info(url).unwrap();
        assert_eq!(info.space_key.as_deref(), Some("DOC"));
        assert_eq!(info.page_id.as_deref(), Some("123"));

        assert_eq!(extract_page_info("https://example.com/a/b"), None);
        assert_eq!(extract_page_info("not a url"), None);
    }
}
