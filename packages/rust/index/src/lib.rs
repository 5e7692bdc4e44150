//! Local full-text index and its on-disk artifact.
//!
//! The index is a tantivy index built from [`SectionRecord`]s against a fixed
//! docs schema. Its committed files are bundled into JSON, gzip-compressed and
//! written to `orama-search-index-<version>.json.gz`.
//!
//! [`SectionRecord`]: docsearch_shared::SectionRecord

pub mod artifact;
mod schema;
mod search_index;

pub use artifact::{
    ARTIFACT_PREFIX, ARTIFACT_SUFFIX, ArtifactMeta, compress, decode_index, decompress,
    encode_index, index_path, read_artifact, write_artifact,
};
pub use schema::{DocsFields, docs_schema};
pub use search_index::{FORMAT_NAME, FORMAT_VERSION, Hit, IndexBundle, SearchIndex};
