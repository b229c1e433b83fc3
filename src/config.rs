use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::mentions::{MentionFormatter, MentionResolver};
use crate::options::{AdfToMarkdownOptions, MarkdownToAdfOptions};
use crate::smart_links::{DomainRules, SmartLinkPolicy};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub markdown: MarkdownConfig,

    #[serde(default)]
    pub smart_links: SmartLinksConfig,

    #[serde(default)]
    pub mentions: MentionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Convert recognized links to cards.
    #[serde(default = "default_true")]
    pub smart_links: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { smart_links: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartLinksConfig {
    /// Unset means `domains` when any domain is listed, else `builtin`.
    pub mode: Option<SmartLinkMode>,

    #[serde(default)]
    pub inline_domains: Vec<String>,

    #[serde(default)]
    pub block_domains: Vec<String>,

    #[serde(default = "default_true")]
    pub fallback: bool,
}

impl Default for SmartLinksConfig {
    fn default() -> Self {
        Self {
            mode: None,
            inline_domains: Vec::new(),
            block_domains: Vec::new(),
            fallback: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MentionsConfig {
    #[serde(default)]
    pub format: MentionFormat,

    /// Username to account id.
    #[serde(default)]
    pub users: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmartLinkMode {
    Builtin,
    Domains,
    AtlassianInline,
    AtlassianBlock,
    Disabled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MentionFormat {
    #[default]
    Simple,
    Linked,
    Display,
}

impl FromStr for MentionFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "linked" => Ok(Self::Linked),
            "display" => Ok(Self::Display),
            other => anyhow::bail!(
                "Unknown mention format '{}' (expected simple, linked or display)",
                other
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default: ConfigProfile,

    #[serde(flatten)]
    profiles: HashMap<String, ConfigProfile>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct ConfigProfile {
    #[serde(default)]
    markdown: MarkdownProfile,

    #[serde(default)]
    smart_links: SmartLinksProfile,

    #[serde(default)]
    mentions: MentionsProfile,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct MarkdownProfile {
    smart_links: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct SmartLinksProfile {
    mode: Option<SmartLinkMode>,
    inline_domains: Option<Vec<String>>,
    block_domains: Option<Vec<String>>,
    fallback: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct MentionsProfile {
    format: Option<MentionFormat>,
    #[serde(default)]
    users: BTreeMap<String, String>,
}

impl Config {
    /// Loads global, project, custom file and environment layers, later
    /// layers overriding earlier ones.
    pub fn load(config_path: Option<&PathBuf>, profile: Option<&String>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            tracing::debug!("Loading global config: {:?}", global_path);
            let profile_config = Self::load_from_file(&global_path, profile)?;
            config.merge(profile_config);
        }

        // 2. Load project config
        if let Some(project_path) = Self::project_config_path() {
            tracing::debug!("Loading project config: {:?}", project_path);
            let profile_config = Self::load_from_file(&project_path, profile)?;
            config.merge(profile_config);
        }

        // 3. Load custom config file
        if let Some(path) = config_path {
            tracing::debug!("Loading custom config: {:?}", path);
            let profile_config = Self::load_from_file(path, profile)?;
            config.merge(profile_config);
        }

        // 4. Environment variables override
        config.apply_env()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads a single file over the defaults, without the other layers.
    pub fn from_file(path: &Path, profile: Option<&String>) -> Result<Self> {
        let mut config = Self::default();
        config.merge(Self::load_from_file(path, profile)?);
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("ADF_SMART_LINKS") {
            self.markdown.smart_links = val.trim().parse().context("Invalid ADF_SMART_LINKS")?;
        }

        if let Ok(val) = std::env::var("ADF_INLINE_DOMAINS") {
            self.smart_links.inline_domains = split_list(&val);
        }

        if let Ok(val) = std::env::var("ADF_BLOCK_DOMAINS") {
            self.smart_links.block_domains = split_list(&val);
        }

        if let Ok(val) = std::env::var("ADF_SMART_LINK_FALLBACK") {
            self.smart_links.fallback = val
                .trim()
                .parse()
                .context("Invalid ADF_SMART_LINK_FALLBACK")?;
        }

        if let Ok(val) = std::env::var("ADF_MENTION_FORMAT") {
            self.mentions.format = val.parse().context("Invalid ADF_MENTION_FORMAT")?;
        }

        Ok(())
    }

    fn load_from_file(path: &Path, profile: Option<&String>) -> Result<ConfigProfile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config_file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        if let Some(profile_name) = profile {
            config_file
                .profiles
                .get(profile_name)
                .cloned()
                .ok_or_else(|| {
                    anyhow::anyhow!("Profile '{}' not found in {:?}", profile_name, path)
                })
        } else {
            Ok(config_file.default)
        }
    }

    fn merge(&mut self, other: ConfigProfile) {
        if let Some(enabled) = other.markdown.smart_links {
            self.markdown.smart_links = enabled;
        }

        if other.smart_links.mode.is_some() {
            self.smart_links.mode = other.smart_links.mode;
        }
        if let Some(domains) = other.smart_links.inline_domains {
            self.smart_links.inline_domains = domains;
        }
        if let Some(domains) = other.smart_links.block_domains {
            self.smart_links.block_domains = domains;
        }
        if let Some(fallback) = other.smart_links.fallback {
            self.smart_links.fallback = fallback;
        }

        if let Some(format) = other.mentions.format {
            self.mentions.format = format;
        }
        self.mentions.users.extend(other.mentions.users);
    }

    pub fn validate(&self) -> Result<()> {
        let domains = self
            .smart_links
            .inline_domains
            .iter()
            .chain(&self.smart_links.block_domains);

        for domain in domains {
            if domain.trim().is_empty() {
                anyhow::bail!("Smart link domains must not be empty");
            }
            if domain.contains("://") {
                anyhow::bail!(
                    "Invalid smart link domain '{}': use a host name without a scheme",
                    domain
                );
            }
        }

        if self.smart_links.mode == Some(SmartLinkMode::Domains)
            && self.smart_links.inline_domains.is_empty()
            && self.smart_links.block_domains.is_empty()
        {
            tracing::warn!("Smart link mode 'domains' is set but no domains are configured");
        }

        Ok(())
    }

    pub fn smart_link_policy(&self) -> SmartLinkPolicy {
        let links = &self.smart_links;
        let has_domains = !links.inline_domains.is_empty() || !links.block_domains.is_empty();
        let mode = links.mode.unwrap_or(if has_domains {
            SmartLinkMode::Domains
        } else {
            SmartLinkMode::Builtin
        });

        match mode {
            SmartLinkMode::Builtin => SmartLinkPolicy::Builtin,
            SmartLinkMode::Domains => SmartLinkPolicy::Domains(DomainRules {
                inline_domains: links.inline_domains.clone(),
                block_domains: links.block_domains.clone(),
                fallback: links.fallback,
            }),
            SmartLinkMode::AtlassianInline => SmartLinkPolicy::AtlassianInline,
            SmartLinkMode::AtlassianBlock => SmartLinkPolicy::AtlassianBlock,
            SmartLinkMode::Disabled => SmartLinkPolicy::Disabled,
        }
    }

    pub fn markdown_options(&self) -> MarkdownToAdfOptions {
        let mentions = if self.mentions.users.is_empty() {
            MentionResolver::Username
        } else {
            MentionResolver::directory(&self.mentions.users)
        };

        MarkdownToAdfOptions {
            enable_smart_links: self.markdown.smart_links,
            smart_links: self.smart_link_policy(),
            mentions,
        }
    }

    pub fn adf_options(&self) -> AdfToMarkdownOptions {
        let mentions = match self.mentions.format {
            MentionFormat::Simple => MentionFormatter::Simple,
            MentionFormat::Linked => MentionFormatter::Linked,
            MentionFormat::Display => MentionFormatter::Display,
        };
        AdfToMarkdownOptions { mentions }
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config/adf-convert/config.toml"))
    }

    pub fn project_config_path() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        let mut dir = current.as_path();

        loop {
            let candidate = dir.join(".adf-convert.toml");
            if candidate.exists() {
                return Some(candidate);
            }

            dir = dir.parent()?;
        }
    }

    pub fn init_config(global: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().context("Failed to determine global config path")?
        } else {
            PathBuf::from(".adf-convert.toml")
        };

        if path.exists() {
            anyhow::bail!("Config file already exists: {:?}", path);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let template = r#"[default.markdown]
smart_links = true

[default.smart_links]
# mode = "builtin" # builtin | domains | atlassian-inline | atlassian-block | disabled
inline_domains = []
block_domains = []
fallback = true

[default.mentions]
format = "simple" # simple | linked | display

# [default.mentions.users]
# jdoe = "5b10ac8d82e05b22cc7d4ef5"

# Additional profiles
# [work.smart_links]
# inline_domains = ["jira.example.com"]
# block_domains = ["wiki.example.com"]
"#;

        fs::write(&path, template)?;
        Ok(path)
    }
}

fn split_list(val: &str) -> Vec<String> {
    val.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().to_string())
        .collect()
}

#[cfg(test)]
#[allow(clippy::field_reassign_with_default)]
mod tests {
    use super::*;
    use crate::smart_links::LinkKind;

    fn parse_profile(toml_text: &str, profile: Option<&str>) -> ConfigProfile {
        let file: ConfigFile = toml::from_str(toml_text).unwrap();
        match profile {
            Some(name) => file.profiles.get(name).cloned().unwrap(),
            None => file.default,
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.markdown.smart_links);
        assert!(matches!(config.smart_link_policy(), SmartLinkPolicy::Builtin));
        assert!(matches!(config.adf_options().mentions, MentionFormatter::Simple));
        assert!(matches!(config.markdown_options().mentions, MentionResolver::Username));
    }

    #[test]
    fn test_merge_default_profile() {
        let mut config = Config::default();
        config.merge(parse_profile(
            r#"
            [default.markdown]
            smart_links = false

            [default.smart_links]
            inline_domains = ["jira.example.com"]
            fallback = false

            [default.mentions]
            format = "linked"

            [default.mentions.users]
            JDoe = "acc-1"
            "#,
            None,
        ));

        assert!(!config.markdown.smart_links);
        assert!(!config.smart_links.fallback);
        assert_eq!(config.mentions.format, MentionFormat::Linked);

        let options = config.markdown_options();
        assert!(!options.enable_smart_links);
        assert_eq!(
            options.smart_links.classify("https://jira.example.com/browse/X-1"),
            LinkKind::Inline
        );
        assert_eq!(options.mentions.resolve("jdoe").unwrap().id, "acc-1");
    }

    #[test]
    fn test_later_layer_overrides_only_set_fields() {
        let mut config = Config::default();
        config.merge(parse_profile(
            r#"
            [default.smart_links]
            block_domains = ["wiki.example.com"]
            [default.mentions]
            format = "display"
            "#,
            None,
        ));
        config.merge(parse_profile(
            r#"
            [default.smart_links]
            mode = "atlassian-block"
            "#,
            None,
        ));

        assert_eq!(config.smart_links.block_domains, vec!["wiki.example.com"]);
        assert_eq!(config.mentions.format, MentionFormat::Display);
        assert!(matches!(config.smart_link_policy(), SmartLinkPolicy::AtlassianBlock));
    }

    #[test]
    fn test_named_profile() {
        let profile = parse_profile(
            r#"
            [default.markdown]
            smart_links = true

            [work.markdown]
            smart_links = false
            "#,
            Some("work"),
        );
        assert_eq!(profile.markdown.smart_links, Some(false));
    }

    #[test]
    fn test_invalid_domains_fail() {
        let mut config = Config::default();
        config.smart_links.inline_domains = vec!["https://jira.example.com".into()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.smart_links.block_domains = vec!["  ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mention_format_from_str() {
        assert_eq!("Linked".parse::<MentionFormat>().unwrap(), MentionFormat::Linked);
        assert_eq!(" display ".parse::<MentionFormat>().unwrap(), MentionFormat::Display);
        assert!("fancy".parse::<MentionFormat>().is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a.com, b.com,,"), vec!["a.com", "b.com"]);
        assert!(split_list("").is_empty());
    }
}
