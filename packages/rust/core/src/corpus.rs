//! Per-version corpus assembly.
//!
//! Every record of a version is normalized concurrently; the resulting
//! sections are concatenated in category order (articles, pages, docs) and
//! then in the order the records were submitted. Nothing is de-duplicated.

use std::path::Path;

use futures::future::try_join_all;
use tracing::{debug, instrument};

use docsearch_shared::{Result, SectionRecord, VersionContent};

use crate::normalizer;

/// Build the flat section list for one version.
///
/// The first failing record fails the whole assembly.
#[instrument(skip_all, fields(records = content.len()))]
pub async fn assemble(site_dir: &Path, content: VersionContent) -> Result<Vec<SectionRecord>> {
    let records = content.into_records();

    let tasks = records.iter().map(|tagged| {
        debug!(category = tagged.category.as_str(), permalink = %tagged.record.permalink, "queued");
        normalizer::normalize(site_dir, &tagged.record)
    });

    let per_record = try_join_all(tasks).await?;
    let corpus: Vec<SectionRecord> = per_record.into_iter().flatten().collect();

    debug!(sections = corpus.len(), "corpus assembled");
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use docsearch_shared::{ContentRecord, DocSearchError};

    fn temp_site() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ds-corpus-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write(site: &Path, name: &str, body: &str) -> ContentRecord {
        std::fs::write(site.join(name), body).unwrap();
        ContentRecord {
            title: name.trim_end_matches(".md").to_string(),
            permalink: format!("/{}", name.trim_end_matches(".md")),
            source: format!("@site/{name}"),
        }
    }

    #[tokio::test]
    async fn articles_then_pages_then_docs() {
        let site = temp_site();
        let content = VersionContent {
            docs: vec![write(&site, "doc.md", "# D1\n\nd\n")],
            pages: vec![write(&site, "page.md", "# P1\n\np\n")],
            articles: vec![
                write(&site, "post-a.md", "# A1\n\na\n\n## A2\n\naa\n"),
                write(&site, "post-b.md", "# B1\n\nb\n"),
            ],
        };

        let corpus = assemble(&site, content).await.unwrap();
        let titles: Vec<&str> = corpus.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["A1", "A2", "B1", "P1", "D1"]);
        assert!(corpus.iter().all(|s| s.category.is_empty()));

        let _ = std::fs::remove_dir_all(&site);
    }

    #[tokio::test]
    async fn duplicate_records_are_kept() {
        let site = temp_site();
        let record = write(&site, "doc.md", "# Same\n\nx\n");
        let content = VersionContent {
            docs: vec![record.clone(), record],
            ..Default::default()
        };

        let corpus = assemble(&site, content).await.unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0], corpus[1]);

        let _ = std::fs::remove_dir_all(&site);
    }

    #[tokio::test]
    async fn empty_content_gives_empty_corpus() {
        let site = temp_site();
        let corpus = assemble(&site, VersionContent::default()).await.unwrap();
        assert!(corpus.is_empty());
        let _ = std::fs::remove_dir_all(&site);
    }

    #[tokio::test]
    async fn one_missing_source_fails_assembly() {
        let site = temp_site();
        let content = VersionContent {
            docs: vec![
                write(&site, "ok.md", "# Ok\n\nfine\n"),
                ContentRecord {
                    title: "Missing".into(),
                    permalink: "/missing".into(),
                    source: "@site/missing.md".into(),
                },
            ],
            ..Default::default()
        };

        let err = assemble(&site, content).await.unwrap_err();
        assert!(matches!(err, DocSearchError::Io { .. }));

        let _ = std::fs::remove_dir_all(&site);
    }
}
