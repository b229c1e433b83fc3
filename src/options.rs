use crate::mentions::{MentionFormatter, MentionResolver};
use crate::smart_links::SmartLinkPolicy;

#[derive(Debug, Clone)]
pub struct MarkdownToAdfOptions {
    /// When false, every link stays a `link` mark regardless of policy.
    pub enable_smart_links: bool,
    pub smart_links: SmartLinkPolicy,
    pub mentions: MentionResolver,
}

impl Default for MarkdownToAdfOptions {
    fn default() -> Self {
        Self {
            enable_smart_links: true,
            smart_links: SmartLinkPolicy::default(),
            mentions: MentionResolver::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdfToMarkdownOptions {
    pub mentions: MentionFormatter,
}
