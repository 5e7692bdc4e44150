//! Core domain types for docsearch: content records in, section records out.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocSearchError, Result};

// ---------------------------------------------------------------------------
// VersionName
// ---------------------------------------------------------------------------

/// A content version identifier as reported by the docs subsystem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionName(pub String);

impl VersionName {
    /// The unversioned/latest docs version.
    pub const CURRENT: &'static str = "current";

    pub fn current() -> Self {
        Self(Self::CURRENT.to_string())
    }

    pub fn is_current(&self) -> bool {
        self.0 == Self::CURRENT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for VersionName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Content records (input)
// ---------------------------------------------------------------------------

/// Metadata and source location of a single doc, blog post, or page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Document title. Static pages may not have one.
    #[serde(default)]
    pub title: String,
    /// Public URL path; becomes the `path` of every derived section.
    pub permalink: String,
    /// File locator, possibly prefixed with the `@site` placeholder.
    pub source: String,
}

/// The content category a record was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Blog post.
    Article,
    /// Standalone page.
    Page,
    /// Versioned documentation page.
    Doc,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Page => "page",
            Self::Doc => "doc",
        }
    }
}

/// A content record tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedRecord {
    pub category: ContentCategory,
    pub record: ContentRecord,
}

/// Everything that contributes to one version's corpus, grouped by category.
///
/// Each list keeps source registration order, then per-source record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionContent {
    pub articles: Vec<ContentRecord>,
    pub pages: Vec<ContentRecord>,
    pub docs: Vec<ContentRecord>,
}

impl VersionContent {
    /// Total number of records across all categories.
    pub fn len(&self) -> usize {
        self.articles.len() + self.pages.len() + self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten into tagged records: articles, then pages, then docs.
    pub fn into_records(self) -> Vec<CategorizedRecord> {
        let tag = |category: ContentCategory| {
            move |record: ContentRecord| CategorizedRecord { category, record }
        };

        self.articles
            .into_iter()
            .map(tag(ContentCategory::Article))
            .chain(self.pages.into_iter().map(tag(ContentCategory::Page)))
            .chain(self.docs.into_iter().map(tag(ContentCategory::Doc)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SiteContent (host framework boundary)
// ---------------------------------------------------------------------------

/// One registered docs plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsSource {
    pub id: String,
    #[serde(default)]
    pub versions: Vec<DocsVersion>,
}

/// A loaded docs version and its documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsVersion {
    pub name: VersionName,
    #[serde(default)]
    pub docs: Vec<ContentRecord>,
}

/// One registered blog plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogSource {
    pub id: String,
    #[serde(default)]
    pub posts: Vec<ContentRecord>,
}

/// One registered pages plugin instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesSource {
    pub id: String,
    #[serde(default)]
    pub pages: Vec<ContentRecord>,
}

/// All content loaded by the host framework, as handed to the build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteContent {
    #[serde(default)]
    pub docs: Vec<DocsSource>,
    #[serde(default)]
    pub blog: Vec<BlogSource>,
    #[serde(default)]
    pub pages: Vec<PagesSource>,
}

impl SiteContent {
    /// Parse and validate a content manifest.
    pub fn from_json(json: &str) -> Result<Self> {
        let content: Self = serde_json::from_str(json)
            .map_err(|e| DocSearchError::parse(format!("invalid content manifest: {e}")))?;
        content.validate()?;
        Ok(content)
    }

    /// Read, parse and validate a content manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| DocSearchError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Check the boundary invariants every downstream stage relies on.
    pub fn validate(&self) -> Result<()> {
        if self.docs.is_empty() {
            return Err(DocSearchError::validation(
                "no docs plugin content was loaded",
            ));
        }

        let mut seen = HashSet::new();
        for source in &self.docs {
            if !seen.insert(source.id.as_str()) {
                return Err(DocSearchError::validation(format!(
                    "duplicate docs plugin id '{}'",
                    source.id
                )));
            }
        }

        let docs = self
            .docs
            .iter()
            .flat_map(|s| s.versions.iter().flat_map(|v| v.docs.iter()));
        let posts = self.blog.iter().flat_map(|s| s.posts.iter());
        let pages = self.pages.iter().flat_map(|s| s.pages.iter());

        for record in docs.chain(posts).chain(pages) {
            if record.permalink.trim().is_empty() {
                return Err(DocSearchError::validation(format!(
                    "content record '{}' has an empty permalink",
                    record.source
                )));
            }
            if record.source.trim().is_empty() {
                return Err(DocSearchError::validation(format!(
                    "content record '{}' has an empty source",
                    record.permalink
                )));
            }
        }

        Ok(())
    }

    /// Docs plugin ids in registration order.
    pub fn plugin_ids(&self) -> Vec<String> {
        self.docs.iter().map(|s| s.id.clone()).collect()
    }

    /// Versions known to the first registered docs plugin.
    pub fn versions(&self) -> Vec<VersionName> {
        self.docs
            .first()
            .map(|s| s.versions.iter().map(|v| v.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Collect the records contributing to `version`.
    ///
    /// Blog posts and pages are looked up under each docs plugin id and are
    /// unversioned, so they appear in every version's content.
    pub fn content_for(&self, version: &VersionName) -> VersionContent {
        let mut content = VersionContent::default();

        for docs_source in &self.docs {
            let id = docs_source.id.as_str();

            if let Some(blog) = self.blog.iter().find(|b| b.id == id) {
                content.articles.extend(blog.posts.iter().cloned());
            }
            if let Some(pages) = self.pages.iter().find(|p| p.id == id) {
                content.pages.extend(pages.pages.iter().cloned());
            }
            if let Some(loaded) = docs_source.versions.iter().find(|v| &v.name == version) {
                content.docs.extend(loaded.docs.iter().cloned());
            }
        }

        content
    }
}

// ---------------------------------------------------------------------------
// SectionRecord (output)
// ---------------------------------------------------------------------------

/// One heading-delimited chunk of a document; the unit stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    /// Heading text (empty if the heading has no text).
    pub title: String,
    /// Text of the sibling elements up to the next heading, newline-terminated.
    pub content: String,
    /// Title of the owning document.
    pub section: String,
    /// Permalink of the owning document. Not unique per section.
    pub path: String,
    /// Classification slot. Always empty.
    pub category: String,
}

// ---------------------------------------------------------------------------
// Runtime-facing payload
// ---------------------------------------------------------------------------

/// Query-time credentials of a remote index for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub v: VersionName,
    pub endpoint: String,
    pub api_key: String,
}

/// Search analytics settings forwarded to the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "apiKey", alias = "api_key")]
    pub api_key: String,
    #[serde(rename = "indexId", alias = "index_id")]
    pub index_id: String,
}

/// Data exposed to the runtime search widget through the global-data channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalData {
    pub plugin_content_docs_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<Endpoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<AnalyticsConfig>,
    /// Compressed local index bytes per version (development builds only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_data: Option<BTreeMap<String, Vec<u8>>>,
}
