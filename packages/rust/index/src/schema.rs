//! The fixed document schema of the search index.

use tantivy::schema::{Field, STORED, STRING, Schema, TEXT, Value};
use tantivy::{TantivyDocument, doc};

use docsearch_shared::{DocSearchError, Result, SectionRecord};

pub const TITLE: &str = "title";
pub const CONTENT: &str = "content";
pub const SECTION: &str = "section";
pub const PATH: &str = "path";
pub const CATEGORY: &str = "category";

/// Field handles of the docs schema.
#[derive(Debug, Clone, Copy)]
pub struct DocsFields {
    pub title: Field,
    pub content: Field,
    pub section: Field,
    pub path: Field,
    pub category: Field,
}

/// The docs schema: `title`, `content`, `section` and `path` as full text,
/// `category` as an exact-match facet. Every field is stored.
pub fn docs_schema() -> (Schema, DocsFields) {
    let mut builder = Schema::builder();

    let fields = DocsFields {
        title: builder.add_text_field(TITLE, TEXT | STORED),
        content: builder.add_text_field(CONTENT, TEXT | STORED),
        section: builder.add_text_field(SECTION, TEXT | STORED),
        path: builder.add_text_field(PATH, TEXT | STORED),
        category: builder.add_text_field(CATEGORY, STRING | STORED),
    };

    (builder.build(), fields)
}

impl DocsFields {
    /// Look up the docs fields in a schema read back from an artifact.
    pub fn from_schema(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| DocSearchError::index(format!("index schema has no '{name}' field")))
        };

        Ok(Self {
            title: field(TITLE)?,
            content: field(CONTENT)?,
            section: field(SECTION)?,
            path: field(PATH)?,
            category: field(CATEGORY)?,
        })
    }

    /// Fields searched by free-text queries.
    pub fn text_fields(&self) -> Vec<Field> {
        vec![self.title, self.content, self.section, self.path]
    }

    pub(crate) fn to_document(&self, record: &SectionRecord) -> TantivyDocument {
        doc!(
            self.title => record.title.as_str(),
            self.content => record.content.as_str(),
            self.section => record.section.as_str(),
            self.path => record.path.as_str(),
            self.category => record.category.as_str()
        )
    }

    pub(crate) fn to_record(&self, doc: &TantivyDocument) -> SectionRecord {
        let text = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        SectionRecord {
            title: text(self.title),
            content: text(self.content),
            section: text(self.section),
            path: text(self.path),
            category: text(self.category),
        }
    }
}
