//! Content record → section records.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use docsearch_shared::{ContentRecord, DocSearchError, Result, SectionRecord};

/// Placeholder the host framework uses for the site root in source locators.
pub const SITE_DIR_PLACEHOLDER: &str = "@site";

/// Resolve a record's source locator to a file path.
///
/// `@site/...` is rewritten against `site_dir`; other relative paths are joined
/// onto it; absolute paths are used as-is.
pub fn resolve_source(site_dir: &Path, source: &str) -> PathBuf {
    if let Some(rest) = source.strip_prefix(SITE_DIR_PLACEHOLDER) {
        if rest.is_empty() || rest.starts_with(['/', '\\']) {
            return site_dir.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    site_dir.join(source)
}

/// Read one content file and split it into section records.
///
/// A missing or unreadable source is an error; there is no partial result.
#[instrument(skip_all, fields(permalink = %record.permalink))]
pub async fn normalize(site_dir: &Path, record: &ContentRecord) -> Result<Vec<SectionRecord>> {
    let path = resolve_source(site_dir, &record.source);

    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| DocSearchError::io(&path, e))?;

    let sections: Vec<SectionRecord> =
        docsearch_markdown::sections_from_markdown(&text, &record.permalink, &record.title)
            .into_iter()
            .map(SectionRecord::from)
            .collect();

    debug!(path = %path.display(), sections = sections.len(), "normalized");
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_site() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ds-normalizer-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(dir.join("docs")).unwrap();
        dir
    }

    #[test]
    fn resolve_site_placeholder() {
        let site = Path::new("/srv/site");
        assert_eq!(
            resolve_source(site, "@site/docs/intro.md"),
            PathBuf::from("/srv/site/docs/intro.md")
        );
        assert_eq!(
            resolve_source(site, "docs/intro.md"),
            PathBuf::from("/srv/site/docs/intro.md")
        );
        assert_eq!(
            resolve_source(site, "/abs/intro.md"),
            PathBuf::from("/abs/intro.md")
        );
        // only a whole `@site` segment is a placeholder
        assert_eq!(
            resolve_source(site, "@sitemap/x.md"),
            PathBuf::from("/srv/site/@sitemap/x.md")
        );
    }

    #[tokio::test]
    async fn normalize_reads_and_splits() {
        let site = temp_site();
        std::fs::write(
            site.join("docs/intro.md"),
            "---\nsidebar_position: 1\n---\n# Intro\n\nHello.\n\n## Next steps\n\nRead more.\n",
        )
        .unwrap();

        let record = ContentRecord {
            title: "Introduction".into(),
            permalink: "/docs/intro".into(),
            source: "@site/docs/intro.md".into(),
        };
        let sections = normalize(&site, &record).await.unwrap();

        assert_eq!(
            sections,
            vec![
                SectionRecord {
                    title: "Intro".into(),
                    content: "Hello.\n".into(),
                    section: "Introduction".into(),
                    path: "/docs/intro".into(),
                    category: String::new(),
                },
                SectionRecord {
                    title: "Next steps".into(),
                    content: "Read more.\n".into(),
                    section: "Introduction".into(),
                    path: "/docs/intro".into(),
                    category: String::new(),
                },
            ]
        );

        let _ = std::fs::remove_dir_all(&site);
    }

    #[tokio::test]
    async fn missing_source_is_io_error() {
        let site = temp_site();
        let record = ContentRecord {
            title: "Gone".into(),
            permalink: "/docs/gone".into(),
            source: "@site/docs/gone.md".into(),
        };

        let err = normalize(&site, &record).await.unwrap_err();
        match err {
            DocSearchError::Io { path, .. } => assert!(path.ends_with("docs/gone.md")),
            other => panic!("expected Io, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&site);
    }

    #[tokio::test]
    async fn non_utf8_source_is_io_error() {
        let site = temp_site();
        std::fs::write(site.join("docs/bin.md"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
        let record = ContentRecord {
            title: "Bin".into(),
            permalink: "/docs/bin".into(),
            source: "@site/docs/bin.md".into(),
        };

        assert!(matches!(
            normalize(&site, &record).await,
            Err(DocSearchError::Io { .. })
        ));

        let _ = std::fs::remove_dir_all(&site);
    }
}
