//! Tantivy-backed full-text index over section records.
//!
//! The index lives in memory while it is built. Its saved form is an
//! [`IndexBundle`]: every file of the committed index keyed by name, plus a
//! format header, serialized as JSON.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::directory::error::OpenReadError;
use tantivy::directory::{Directory, RamDirectory};
use tantivy::merge_policy::NoMergePolicy;
use tantivy::query::{QueryParser, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::{DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::debug;

use docsearch_shared::{DocSearchError, Result, SectionRecord};

use crate::schema::{DocsFields, docs_schema};

/// Format marker written into every saved index.
pub const FORMAT_NAME: &str = "docsearch-tantivy";

/// Saved index layout version.
pub const FORMAT_VERSION: u32 = 1;

/// Writer memory budget; a single indexing thread keeps one segment per commit.
const WRITER_HEAP_BYTES: usize = 50_000_000;

const META_FILE: &str = "meta.json";

/// A search match.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// BM25 relevance.
    pub score: f32,
    pub document: SectionRecord,
}

/// Saved form of a [`SearchIndex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexBundle {
    pub format: String,
    pub format_version: u32,
    pub doc_count: u64,
    /// Index files by name (`meta.json` and per-segment files).
    pub files: BTreeMap<String, Vec<u8>>,
}

/// Full-text index with the docs schema.
pub struct SearchIndex {
    index: Index,
    fields: DocsFields,
    reader: IndexReader,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("documents", &self.len())
            .finish()
    }
}

fn engine_error(context: &str) -> impl FnOnce(tantivy::TantivyError) -> DocSearchError + '_ {
    move |e| DocSearchError::index(format!("{context}: {e}"))
}

impl SearchIndex {
    /// Create an empty in-memory index with the docs schema.
    pub fn new() -> Result<Self> {
        let (schema, _) = docs_schema();
        Self::from_index(Index::create_in_ram(schema))
    }

    fn from_index(index: Index) -> Result<Self> {
        let fields = DocsFields::from_schema(&index.schema())?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(engine_error("failed to create reader"))?;

        Ok(Self {
            index,
            fields,
            reader,
        })
    }

    pub fn len(&self) -> usize {
        self.reader.searcher().num_docs() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add records in order and commit them in one batch. Returns the number added.
    pub fn insert_multiple(
        &mut self,
        records: impl IntoIterator<Item = SectionRecord>,
    ) -> Result<usize> {
        let mut writer: IndexWriter = self
            .index
            .writer_with_num_threads(1, WRITER_HEAP_BYTES)
            .map_err(engine_error("failed to create writer"))?;
        writer.set_merge_policy(Box::new(NoMergePolicy));

        let mut added = 0;
        for record in records {
            writer
                .add_document(self.fields.to_document(&record))
                .map_err(engine_error("failed to add document"))?;
            added += 1;
        }

        writer.commit().map_err(engine_error("failed to commit"))?;
        writer
            .wait_merging_threads()
            .map_err(engine_error("failed to close writer"))?;
        self.reader
            .reload()
            .map_err(engine_error("failed to reload reader"))?;

        debug!(inserted = added, total = self.len(), "documents indexed");
        Ok(added)
    }

    /// Every stored document, in segment then insertion order.
    pub fn documents(&self) -> Result<Vec<SectionRecord>> {
        let searcher = self.reader.searcher();
        let mut records = Vec::with_capacity(self.len());

        for (ord, segment) in searcher.segment_readers().iter().enumerate() {
            for doc_id in segment.doc_ids_alive() {
                let doc: TantivyDocument = searcher
                    .doc(DocAddress::new(ord as u32, doc_id))
                    .map_err(engine_error("failed to read document"))?;
                records.push(self.fields.to_record(&doc));
            }
        }

        Ok(records)
    }

    /// Find documents matching every term of `query` in any text field,
    /// best match first.
    ///
    /// Query syntax errors are tolerated: the parsable part of the query is used.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<Hit>> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut parser = QueryParser::for_index(&self.index, self.fields.text_fields());
        parser.set_conjunction_by_default();
        let (parsed, errors) = parser.parse_query_lenient(query);
        if !errors.is_empty() {
            debug!(query, errors = errors.len(), "query partially parsed");
        }

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&*parsed, &TopDocs::with_limit(limit))
            .map_err(engine_error("search failed"))?;

        top_docs
            .into_iter()
            .map(|(score, address)| {
                let doc: TantivyDocument = searcher
                    .doc(address)
                    .map_err(engine_error("failed to read document"))?;
                Ok(Hit {
                    score,
                    document: self.fields.to_record(&doc),
                })
            })
            .collect()
    }

    /// Documents whose `category` is exactly `value`.
    pub fn filter_category(&self, value: &str) -> Result<Vec<SectionRecord>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let query = TermQuery::new(
            Term::from_field_text(self.fields.category, value),
            IndexRecordOption::Basic,
        );
        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(self.len()))
            .map_err(engine_error("category filter failed"))?;

        top_docs
            .into_iter()
            .map(|(_, address)| {
                let doc: TantivyDocument = searcher
                    .doc(address)
                    .map_err(engine_error("failed to read document"))?;
                Ok(self.fields.to_record(&doc))
            })
            .collect()
    }

    /// Collect the committed index files into a bundle.
    pub fn to_bundle(&self) -> Result<IndexBundle> {
        let directory = self.index.directory();
        let metas = self
            .index
            .searchable_segment_metas()
            .map_err(engine_error("failed to list segments"))?;

        let mut names: Vec<String> = metas
            .iter()
            .flat_map(|meta| meta.list_files())
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        names.push(META_FILE.to_string());

        let mut files = BTreeMap::new();
        for name in names {
            match directory.atomic_read(Path::new(&name)) {
                Ok(bytes) => {
                    files.insert(name, bytes);
                }
                // components a segment never wrote
                Err(OpenReadError::FileDoesNotExist(_)) => {}
                Err(e) => {
                    return Err(DocSearchError::index(format!("failed to read {name}: {e}")));
                }
            }
        }

        Ok(IndexBundle {
            format: FORMAT_NAME.to_string(),
            format_version: FORMAT_VERSION,
            doc_count: self.len() as u64,
            files,
        })
    }

    /// Open an index from its bundle, checking the header and document count.
    pub fn from_bundle(bundle: IndexBundle) -> Result<Self> {
        if bundle.format != FORMAT_NAME {
            return Err(DocSearchError::parse(format!(
                "unknown index format '{}'",
                bundle.format
            )));
        }
        if bundle.format_version != FORMAT_VERSION {
            return Err(DocSearchError::parse(format!(
                "unsupported index format version {} (expected {FORMAT_VERSION})",
                bundle.format_version
            )));
        }
        if !bundle.files.contains_key(META_FILE) {
            return Err(DocSearchError::parse("index bundle has no meta.json"));
        }

        let directory = RamDirectory::create();
        for (name, bytes) in &bundle.files {
            directory
                .atomic_write(Path::new(name), bytes)
                .map_err(|e| DocSearchError::index(format!("failed to stage {name}: {e}")))?;
        }

        let index = Index::open(directory).map_err(engine_error("failed to open index"))?;
        let loaded = Self::from_index(index)?;

        if loaded.len() as u64 != bundle.doc_count {
            return Err(DocSearchError::parse(format!(
                "index declares {} documents but contains {}",
                bundle.doc_count,
                loaded.len()
            )));
        }

        Ok(loaded)
    }

    /// Serialize the bundle to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_bundle()?)
            .map_err(|e| DocSearchError::Serialization(format!("index to JSON: {e}")))
    }

    /// Parse JSON bytes produced by [`SearchIndex::to_json`].
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let bundle: IndexBundle = serde_json::from_slice(bytes)
            .map_err(|e| DocSearchError::parse(format!("invalid index JSON: {e}")))?;
        Self::from_bundle(bundle)
    }
}
