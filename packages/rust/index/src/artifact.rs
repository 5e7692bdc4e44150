//! Compressed index artifacts on disk.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use docsearch_shared::{DocSearchError, Result, VersionName};

use crate::search_index::SearchIndex;

/// File name prefix of every index artifact.
pub const ARTIFACT_PREFIX: &str = "orama-search-index-";

/// File name suffix of every index artifact.
pub const ARTIFACT_SUFFIX: &str = ".json.gz";

/// Size and checksum of a written artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub size_bytes: usize,
    /// SHA-256 of the compressed bytes, lowercase hex.
    pub sha256: String,
}

/// `<out_dir>/orama-search-index-<version>.json.gz`
pub fn index_path(out_dir: &Path, version: &VersionName) -> PathBuf {
    out_dir.join(format!("{ARTIFACT_PREFIX}{version}{ARTIFACT_SUFFIX}"))
}

/// Gzip-compress bytes.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 4), Compression::default());
    encoder
        .write_all(bytes)
        .and_then(|_| encoder.finish())
        .map_err(|e| DocSearchError::Serialization(format!("gzip compression failed: {e}")))
}

/// Decompress gzip bytes.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes)
        .read_to_end(&mut out)
        .map_err(|e| DocSearchError::Serialization(format!("gzip decompression failed: {e}")))?;
    Ok(out)
}

/// Bundle and compress an index into artifact bytes.
pub fn encode_index(index: &SearchIndex) -> Result<Vec<u8>> {
    compress(&index.to_json()?)
}

/// Decompress and parse artifact bytes.
pub fn decode_index(bytes: &[u8]) -> Result<SearchIndex> {
    SearchIndex::from_json(&decompress(bytes)?)
}

/// Write artifact bytes atomically (temp file in the same directory, then rename).
#[instrument(skip(bytes), fields(path = %path.display(), size = bytes.len()))]
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<ArtifactMeta> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| DocSearchError::io(dir, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DocSearchError::validation(format!("not a file path: {}", path.display())))?
        .to_string_lossy();
    let temp = dir.join(format!(".{file_name}.tmp"));

    std::fs::write(&temp, bytes).map_err(|e| DocSearchError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| DocSearchError::io(path, e))?;

    let sha256 = format!("{:x}", Sha256::digest(bytes));
    debug!(%sha256, "wrote artifact");

    Ok(ArtifactMeta {
        path: path.to_path_buf(),
        size_bytes: bytes.len(),
        sha256,
    })
}

/// Read and decode an artifact file.
pub fn read_artifact(path: &Path) -> Result<SearchIndex> {
    let bytes = std::fs::read(path).map_err(|e| DocSearchError::io(path, e))?;
    decode_index(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsearch_shared::SectionRecord;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ds-artifact-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_index() -> SearchIndex {
        let mut index = SearchIndex::new().unwrap();
        index
            .insert_multiple([SectionRecord {
                title: "Intro".into(),
                content: "Welcome to the docs.\n".into(),
                section: "Introduction".into(),
                path: "/docs/intro".into(),
                category: String::new(),
            }])
            .unwrap();
        index
    }

    #[test]
    fn index_path_format() {
        let out = Path::new("/site/build");
        assert_eq!(
            index_path(out, &VersionName::current()),
            PathBuf::from("/site/build/orama-search-index-current.json.gz")
        );
        assert_eq!(
            index_path(out, &"2.1.0".into()),
            PathBuf::from("/site/build/orama-search-index-2.1.0.json.gz")
        );
    }

    #[test]
    fn compress_roundtrip_is_identical() {
        let json = sample_index().to_json().unwrap();
        let compressed = compress(&json).unwrap();
        assert_ne!(compressed, json);
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);
        assert_eq!(decompress(&compressed).unwrap(), json);
    }

    #[test]
    fn decompress_rejects_garbage() {
        assert!(decompress(b"not gzip").is_err());
    }

    #[test]
    fn write_read_artifact() {
        let dir = temp_dir();
        let path = index_path(&dir.join("staging"), &VersionName::current());
        let bytes = encode_index(&sample_index()).unwrap();

        let meta = write_artifact(&path, &bytes).unwrap();
        assert_eq!(meta.size_bytes, bytes.len());
        assert_eq!(meta.sha256.len(), 64);
        assert!(!path.with_file_name(".orama-search-index-current.json.gz.tmp").exists());

        let index = read_artifact(&path).unwrap();
        assert_eq!(index.search("welcome", 5).unwrap()[0].document.path, "/docs/intro");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
