//! Bidirectional conversion between Markdown and the Atlassian Document
//! Format (ADF), plus structural validation of ADF documents.
//!
//! ```
//! use adf_convert::{AdfToMarkdownOptions, MarkdownToAdfOptions};
//!
//! let doc = adf_convert::markdown_to_adf("# Title", &MarkdownToAdfOptions::default());
//! let text = adf_convert::render_document(&doc, &AdfToMarkdownOptions::default()).unwrap();
//! assert_eq!(text, "# Title");
//! ```

pub mod adf;
pub mod config;
pub mod emoji;
pub mod error;
pub mod markdown;
pub mod mentions;
pub mod options;
pub mod smart_links;

pub use adf::validate::{ValidationError, ValidationReport, assert_valid, validate};
pub use adf::{Document, Mark, Node};
pub use config::Config;
pub use error::{Error, Result};
pub use markdown::{adf_to_markdown, markdown_to_adf, render_document, tokens_to_adf};
pub use options::{AdfToMarkdownOptions, MarkdownToAdfOptions};
