//! Heading-delimited section extraction from rendered HTML.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use docsearch_shared::SectionRecord;

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("valid selector"));

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// One heading and the content that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Title of the owning document.
    pub original_title: String,
    /// Trimmed heading text.
    pub title: String,
    /// Lowercase heading tag, `h1` to `h6`.
    pub header: String,
    /// Trimmed text of each following sibling element, each newline-terminated.
    pub content: String,
    /// Permalink of the owning document.
    pub path: String,
}

impl From<Section> for SectionRecord {
    fn from(s: Section) -> Self {
        SectionRecord {
            title: s.title,
            content: s.content,
            section: s.original_title,
            path: s.path,
            category: String::new(),
        }
    }
}

/// Split rendered HTML into one [`Section`] per heading, in document order.
///
/// Content accumulation stops at the next sibling heading of any level.
/// Markup with no headings yields no sections.
pub fn extract_sections(html: &str, path: &str, original_title: &str) -> Vec<Section> {
    let doc = Html::parse_fragment(html);

    doc.select(&HEADING_SEL)
        .map(|heading| Section {
            original_title: original_title.to_string(),
            title: element_text(&heading),
            header: heading.value().name().to_ascii_lowercase(),
            content: section_content(&heading),
            path: path.to_string(),
        })
        .collect()
}

fn section_content(heading: &ElementRef) -> String {
    let mut content = String::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        if is_heading(&sibling) {
            break;
        }
        content.push_str(&element_text(&sibling));
        content.push('\n');
    }

    content
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn is_heading(el: &ElementRef) -> bool {
    let name = el.value().name();
    HEADING_TAGS.iter().any(|tag| name.eq_ignore_ascii_case(tag))
}
